//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: AWS SDK calls, HTTP, the
//! browser login listener, config files, and terminal prompts.
//!
//! Imports from `crate::domain` and `crate::application` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod auth;
pub mod aws;
pub mod config;
pub mod http;
pub mod prompt;
