//! Application configuration module.
//!
//! Loads the TOML config file (catalog key and URLs, HTTP timeout) and
//! locates the persisted session file.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, ENV_CATALOG_API_KEY};
pub use paths::{resolve_config_path, resolve_session_path};
