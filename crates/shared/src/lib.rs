//! Shared configuration, errors, and auth types for the budget approval platform.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration (server, database, jwt, storage, import)
//! - Application-wide error type
//! - JWT claims and the token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
