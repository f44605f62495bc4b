//! # cbv-rs-core
//!
//! Core types for the cbv-rs view layer. This crate has no framework
//! dependencies and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result alias
//! - [`settings`] - Framework settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Text helpers

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{CbvError, CbvResult};
pub use settings::{Settings, SETTINGS};
