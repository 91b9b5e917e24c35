//! State-Transition Waiter: request a start/stop and poll until it lands.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use anyhow::{Context, Result};

use super::registry::InstanceRegistry;
use crate::application::ports::{Console, InstanceProvider};
use crate::domain::{InstanceError, LifecycleState};

/// Delay between inventory refreshes while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A requested lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
}

impl Transition {
    /// State that completes the transition.
    #[must_use]
    pub fn target(self) -> LifecycleState {
        match self {
            Self::Start => LifecycleState::Running,
            Self::Stop => LifecycleState::Stopped,
        }
    }

    fn progress_verb(self) -> &'static str {
        match self {
            Self::Start => "Starting",
            Self::Stop => "Stopping",
        }
    }
}

/// How a transition finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The instance was already in the target state; nothing was requested.
    AlreadyThere,
    /// The target state was observed after `polls` refreshes.
    Reached { polls: u32 },
}

/// Drive instance `id` to the state implied by `transition`.
///
/// Issues the request once, then every [`POLL_INTERVAL`] prints a progress
/// marker, refreshes the registry and re-resolves the instance by id, until
/// the target code is observed. There is no timeout.
///
/// # Errors
///
/// Returns [`InstanceError::NotFound`] if `id` is unknown,
/// [`InstanceError::Vanished`] if it drops out of the inventory while
/// waiting, or the provider error if the request itself fails.
pub async fn drive<P: InstanceProvider>(
    registry: &mut InstanceRegistry<P>,
    id: &str,
    transition: Transition,
    console: &impl Console,
) -> Result<TransitionOutcome> {
    let target = transition.target();
    let current = registry
        .find_by_id(id)
        .ok_or_else(|| InstanceError::NotFound(id.to_string()))?;
    if current.is_in(target) {
        return Ok(TransitionOutcome::AlreadyThere);
    }

    match transition {
        Transition::Start => registry.provider().start(id).await,
        Transition::Stop => registry.provider().stop(id).await,
    }
    .with_context(|| format!("requesting {} of {id}", transition.target()))?;
    tracing::info!(instance_id = id, target = %target, "transition requested");

    console.inline(&format!("{} instance: {id}...", transition.progress_verb()));

    let mut polls = 0u32;
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        console.inline(".");
        registry.refresh().await;
        polls += 1;

        let instance = registry
            .find_by_id(id)
            .ok_or_else(|| InstanceError::Vanished(id.to_string()))?;
        tracing::debug!(instance_id = id, code = instance.state.code(), polls, "polled");
        if instance.is_in(target) {
            break;
        }
    }

    console.line("Done.");
    Ok(TransitionOutcome::Reached { polls })
}
