//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::repl`, or `crate::output`.

pub mod ports;
pub mod services;

pub use ports::{
    CommandRunner, Console, InstanceProvider, LineSource, NetworkManager, ProfileWriter,
    RemoteShell,
};
