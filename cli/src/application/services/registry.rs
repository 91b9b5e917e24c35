//! Instance Registry: the last-fetched inventory and interactive selection.

use anyhow::Result;

use crate::application::ports::{Console, InstanceProvider, LineSource};
use crate::domain::{Instance, SelectionError};

/// Known instances as of the last successful refresh.
///
/// The held set is only ever replaced wholesale. Callers keep identifiers,
/// not references, across refreshes.
pub struct InstanceRegistry<P: InstanceProvider> {
    provider: P,
    instances: Vec<Instance>,
}

impl<P: InstanceProvider> InstanceRegistry<P> {
    /// Create a registry with no instances and no fetch performed.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            instances: Vec::new(),
        }
    }

    /// Create a registry and perform the initial fetch.
    pub async fn connect(provider: P) -> Self {
        let mut registry = Self::new(provider);
        registry.refresh().await;
        registry
    }

    /// Fetch the full instance list and replace the held set.
    ///
    /// On provider failure the error is logged and the previous set is kept.
    /// Returns whether the set was replaced.
    pub async fn refresh(&mut self) -> bool {
        match self.provider.describe().await {
            Ok(instances) => {
                tracing::debug!(count = instances.len(), "instance list refreshed");
                self.instances = instances;
                true
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "failed to describe instances");
                false
            }
        }
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Print the numbered instance list.
    pub fn print(&self, console: &impl Console) {
        for (index, instance) in self.instances.iter().enumerate() {
            console.line(&format!(
                "{index:>10} : {} {} [{}]",
                console.accent(instance.display_label()),
                instance.id,
                instance.state
            ));
        }
    }

    /// Let the operator pick an instance.
    ///
    /// Returns `None` without prompting when there are no instances, and the
    /// sole instance without prompting when `auto_if_single` is set and there
    /// is exactly one. Otherwise re-prompts until a valid index is entered.
    /// End of input while prompting also yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from `input` fails.
    pub async fn select_interactive(
        &self,
        auto_if_single: bool,
        input: &mut impl LineSource,
        console: &impl Console,
    ) -> Result<Option<&Instance>> {
        if self.instances.is_empty() {
            return Ok(None);
        }
        if auto_if_single && self.instances.len() == 1 {
            return Ok(self.instances.first());
        }

        loop {
            console.line("Select instance:");
            self.print(console);
            console.inline("> Number: ");

            let Some(answer) = input.read_line().await? else {
                return Ok(None);
            };
            match validate_index(&answer, self.instances.len()) {
                Ok(index) => return Ok(self.instances.get(index)),
                Err(e) => console.error(&e.to_string()),
            }
        }
    }
}

/// Parse an operator-entered index and check `0 <= i < len`.
///
/// # Errors
///
/// Returns [`SelectionError::NotANumber`] for non-integer input and
/// [`SelectionError::OutOfRange`] when `0 > i || i >= len`.
pub fn validate_index(raw: &str, len: usize) -> Result<usize, SelectionError> {
    let raw = raw.trim();
    let i: i64 = raw
        .parse()
        .map_err(|_| SelectionError::NotANumber(raw.to_string()))?;
    // Negative values fail the conversion.
    let index = usize::try_from(i).map_err(|_| SelectionError::OutOfRange)?;
    if index >= len {
        return Err(SelectionError::OutOfRange);
    }
    Ok(index)
}
