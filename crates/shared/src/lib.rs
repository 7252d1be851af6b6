//! Shared types, errors, and configuration for Planbook.
//!
//! This crate provides common types used across all other crates:
//! - Amount and currency primitives with fixed two-digit precision
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LogConfig, PlanningConfig};
pub use error::{AppError, AppResult};
