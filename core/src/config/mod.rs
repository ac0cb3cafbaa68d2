//! Configuration management
//!
//! All configuration types are exported from this module.

pub mod store;

pub use store::{
    Config, IdValidation, ResolverBackend, ResolverConfig, ServerConfig, ValidationConfig,
};

use std::path::PathBuf;

/// Find the configuration file in standard locations
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        let path = cwd.join("meetbot.toml");
        if path.exists() {
            return Some(path);
        }
    }

    if let Some(dir) = get_config_dir() {
        let path = dir.join("config.toml");
        if path.exists() {
            return Some(path);
        }
    }

    None
}

/// Get the configuration directory path
pub fn get_config_dir() -> Option<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Some(dir.join("meetbot"));
    }

    dirs::home_dir().map(|home| home.join(".config").join("meetbot"))
}
