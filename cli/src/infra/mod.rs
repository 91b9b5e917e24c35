//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the AWS
//! CLI, SSH, NetworkManager, the filesystem and stdin.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::repl` or `crate::output` are forbidden.

pub mod aws;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod nmcli;
pub mod ssh;
pub mod terminal;
