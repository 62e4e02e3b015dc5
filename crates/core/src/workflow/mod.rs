//! Budget file workflow.
//!
//! A four-stage state machine: upload, manager approval, printing and
//! signing, archive. Reject is a terminal side branch from the first stage.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (FileStatus, Transition, WorkflowAction)
//! - `error` - Workflow-specific error types
//! - `service` - Role- and status-checked state transitions

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::{Violation, WorkflowError};
pub use service::WorkflowService;
pub use types::{FileStatus, Transition, WorkflowAction};
