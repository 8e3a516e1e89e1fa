//! Configuration module for payback
//!
//! This module handles:
//! - Project-level configuration (payback.toml)
//! - User-level configuration (~/.config/payback/config.toml)
//! - Default model and threshold locations

mod project_config;

pub use project_config::{
    load_config_file, load_project_config, user_config_path, ModelConfig, PaybackConfig,
    CONFIG_FILE_NAME, EXAMPLE_CONFIG,
};
