//! Command-line memo decoder.
//!
//! Decodes settlement memos from the command line and prints the result as
//! JSON, using limits and registered names from a TOML configuration file.
//!
//! # Modules
//!
//! - [`config`] - Tool configuration with environment variable expansion
//! - [`error`] - Configuration and command error types

pub mod config;
pub mod error;
