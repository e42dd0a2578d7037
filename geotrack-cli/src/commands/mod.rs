//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`bench`] - Time synchronous against pool-backed queries
//! - [`config`] - Configuration management (init, show, path)
//! - [`simulate`] - Populate a server and run one proximity query

pub mod bench;
pub mod common;
pub mod config;
pub mod simulate;
