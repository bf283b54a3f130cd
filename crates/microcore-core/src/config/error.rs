//! # Microcore Configuration Errors
//!
//! [`ConfigError`] covers reading a kernel configuration file and decoding it
//! in one of the supported formats.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse {format} configuration: {message}")]
    Parse { format: String, message: String },
}
