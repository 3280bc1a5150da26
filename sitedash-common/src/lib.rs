//! # sitedash Common Library
//!
//! Shared code for the sitedash dashboard service including:
//! - Error types
//! - Event types (DashEvent enum) and EventBus
//! - Configuration loading
//! - Permissive sheet-row model shared by ingestion and reporting

pub mod config;
pub mod error;
pub mod events;
pub mod rows;

pub use error::{Error, Result};
