//! Keyhook Core Library
//!
//! This crate provides the foundational pieces shared by every hook:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure (stderr only, stdout belongs to the host)
//! - Tolerant JSONC reading
//! - Layered configuration resolution

pub mod config;
pub mod error;
pub mod jsonc;
pub mod logging;

// Re-export commonly used types
pub use config::{resolve, resolve_with, Config, ConfigLayer, ConfigSources};
pub use error::{AppError, AppResult};
