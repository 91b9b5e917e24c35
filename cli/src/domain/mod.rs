//! Domain layer: pure types, parsing, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::repl`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod instance;
pub mod vpn;

pub use command::{Command, CommandQueue};
pub use config::Settings;
pub use error::{ConfigError, InstanceError, RemoteError, SelectionError};
pub use instance::{Instance, LifecycleState};
