//! Domain types for orchestration status records.
//!
//! This module contains the core data structures:
//! - OrchestrationStatus: Queryable state of an instance
//! - RuntimeStatus: Lifecycle phase of an instance
//! - Timestamp parsing for status documents

pub mod runtime_status;
pub mod status;
pub mod timestamp;

// Re-export commonly used types
pub use runtime_status::RuntimeStatus;
pub use status::{OrchestrationStatus, OrchestrationStatusBuilder};
pub use timestamp::parse_timestamp;
