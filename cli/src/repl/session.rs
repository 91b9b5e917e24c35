//! The operator's current selection.

/// Selected instance, held by identifier only.
///
/// The registry replaces its instances wholesale on every refresh, so the
/// dispatcher re-resolves this id each time it needs the instance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Session {
    selected: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
