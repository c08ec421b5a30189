//! Configuration module for geomirror
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. The configuration file is optional; all values have defaults.
//!
//! # Example
//!
//! ```no_run
//! use geomirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("geomirror.toml")).unwrap();
//! println!("Downloads will use {} workers", config.download.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DownloadConfig, HttpConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
