//! durable-status - Typed status records for durable orchestrations
//!
//! A status query against a durable orchestration backend returns a JSON
//! document describing one instance. This crate turns that document into an
//! immutable, typed record.
//!
//! # Modules
//!
//! - `domain`: Data structures (OrchestrationStatus, RuntimeStatus)
//! - `error`: Parse errors
//! - `config`: Display configuration for the CLI
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Show a status document
//! curl -s "$STATUS_URL" | durable-status show --history
//!
//! # Check that a document parses
//! durable-status validate status.json
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;

// Re-export main types at crate root for convenience
pub use domain::{OrchestrationStatus, OrchestrationStatusBuilder, RuntimeStatus};
pub use error::StatusError;
