//! Configuration loading and management
//!
//! This module provides utilities for loading PA API connection settings
//! from environment variables and files.

pub mod loader;
pub mod types;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
pub use types::PaApiConfig;
