//! Configuration module
//!
//! Widget behavior and logging settings, loaded from a TOML file.

pub mod config;

pub use config::{BehaviorConfig, GridConfig, LoggingConfig};
