//! Shared utilities, configuration, and error handling for Chatline
//!
//! This crate provides common functionality used across the Chatline workspace:
//! - Configuration management following 12-factor principles
//! - The application error type and its HTTP mapping
//! - Request extractors shared by the domain routers

pub mod config;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
