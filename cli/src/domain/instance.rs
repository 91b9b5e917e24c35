//! Instance model and lifecycle states as reported by the provider.

use std::fmt;

/// Lifecycle state of an instance.
///
/// Codes follow the EC2 convention. Only the low byte is meaningful; the
/// provider reserves the high byte for internal use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    /// A code this tool does not know about.
    Unknown(u16),
}

impl LifecycleState {
    pub const PENDING: u16 = 0;
    pub const RUNNING: u16 = 16;
    pub const SHUTTING_DOWN: u16 = 32;
    pub const TERMINATED: u16 = 48;
    pub const STOPPING: u16 = 64;
    pub const STOPPED: u16 = 80;

    /// Maps a provider state code, ignoring the high byte.
    #[must_use]
    pub fn from_code(code: u16) -> Self {
        match code & 0xff {
            Self::PENDING => Self::Pending,
            Self::RUNNING => Self::Running,
            Self::SHUTTING_DOWN => Self::ShuttingDown,
            Self::TERMINATED => Self::Terminated,
            Self::STOPPING => Self::Stopping,
            Self::STOPPED => Self::Stopped,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::Pending => Self::PENDING,
            Self::Running => Self::RUNNING,
            Self::ShuttingDown => Self::SHUTTING_DOWN,
            Self::Terminated => Self::TERMINATED,
            Self::Stopping => Self::STOPPING,
            Self::Stopped => Self::STOPPED,
            Self::Unknown(code) => code,
        }
    }

    /// Provider-style name, e.g. `shutting-down`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A remote compute instance as of the last registry refresh.
///
/// Instances are snapshots: the registry replaces them wholesale on refresh
/// and never patches individual fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Stable provider identifier, e.g. `i-0abc123`.
    pub id: String,
    /// Human-assigned name, if any.
    pub label: Option<String>,
    pub state: LifecycleState,
    /// Public DNS name; only present while running.
    pub public_dns: Option<String>,
    /// Public IPv4 address; only present while running.
    pub public_ip: Option<String>,
}

impl Instance {
    /// Label to show to the user, falling back to `-` when unnamed.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }

    /// Host to open a remote shell against: DNS name first, then IP.
    #[must_use]
    pub fn ssh_host(&self) -> Option<&str> {
        self.public_dns.as_deref().or(self.public_ip.as_deref())
    }

    #[must_use]
    pub fn is_in(&self, state: LifecycleState) -> bool {
        self.state.code() == state.code()
    }
}

/// Turns provider placeholders (`""`) into `None`.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
