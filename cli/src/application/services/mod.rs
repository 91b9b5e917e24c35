//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::repl`,
//! or `crate::output`.

pub mod registry;
pub mod transition;
pub mod vpn;
