//! Errors produced by the simulation core.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong inside the simulation core.
#[derive(Debug, Error)]
pub enum Error {
    /// A network was fed an input vector of the wrong length.
    #[error("invalid input: expected {expected} values, got {actual}")]
    InvalidInput {
        /// Input count the network was built with.
        expected: usize,
        /// Length of the vector that was passed in.
        actual: usize,
    },
    /// No brain snapshot exists at the given path.
    #[error("no saved brain at {}", .0.display())]
    MissingFile(PathBuf),
    /// A brain snapshot exists but cannot be decoded into a valid network.
    #[error("corrupt brain snapshot: {0}")]
    CorruptData(String),
    /// Reading or writing a file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A parameter file could not be parsed or written.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used across the simulation core.
pub type Result<T> = std::result::Result<T, Error>;
