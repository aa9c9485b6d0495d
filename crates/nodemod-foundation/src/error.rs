//! Error handling for nodemod

use std::path::PathBuf;
use thiserror::Error;

/// Core error type used throughout nodemod
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NodemodError {
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Overlapping edits: [{first_start}, {first_end}) and [{second_start}, {second_end})")]
    OverlappingEdits {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Unknown recipe: {name}")]
    UnknownRecipe { name: String },

    #[error("Package manager error in {}: {message}", .project.display())]
    PackageManager { project: PathBuf, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl NodemodError {
    /// Create a new parse error
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new unknown recipe error
    pub fn unknown_recipe(name: impl Into<String>) -> Self {
        Self::UnknownRecipe { name: name.into() }
    }

    /// Create a new package manager error
    pub fn package_manager(project: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PackageManager {
            project: project.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type NodemodResult<T> = Result<T, NodemodError>;
