//! Core business logic for the budget approval platform.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state transitions live here.
//!
//! # Modules
//!
//! - `auth` - Roles, the per-request actor, password hashing
//! - `import` - Column mapping and spreadsheet normalization
//! - `workflow` - Four-stage approval state machine
//! - `document` - PDF and signed-scan storage, summary PDF rendering
//! - `dashboard` - Post-finalization edit rules

pub mod auth;
pub mod dashboard;
pub mod document;
pub mod import;
pub mod workflow;
