//! Configuration management for nodemod

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError, LogFormat, LoggingConfig, RunConfig};
