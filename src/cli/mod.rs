//! # CLI Module
//!
//! Command-line access to discovery and API configuration, driven by a
//! module manifest (see [`crate::manifest`]) instead of a live script host.
//!
//! ## Commands
//!
//! ### `discover`
//!
//! List the controllers discovery finds, plus every module that failed to scan:
//!
//! ```bash
//! webapi-pack discover --manifest modules.yaml
//! webapi-pack discover --manifest modules.yaml --module Acme.Extra --format json
//! ```
//!
//! ### `routes`
//!
//! Show the route table, controllers and formatters the API would start with:
//!
//! ```bash
//! webapi-pack routes --manifest modules.yaml --json-only
//! ```
//!
//! Environment variables from [`RuntimeConfig`](crate::runtime_config::RuntimeConfig)
//! apply to both commands; flags take precedence.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_with_output, Cli, Commands, OutputFormat};
