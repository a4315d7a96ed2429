//! Error types for the Lumen3D engine
//!
//! This module defines the error types used throughout the engine,
//! including device access, asset loading and resource handles.

use std::fmt;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Graphics device error (compile/link log, incomplete framebuffer, poisoned lock)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (render façade, pipeline, subsystems)
    InitializationFailed(String),

    /// A required asset file does not exist
    AssetNotFound(String),

    /// An asset file exists but its contents cannot be decoded
    InvalidAsset(String),

    /// Operation called in the wrong lifecycle state
    InvalidState(String),

    /// A handle refers to a resource that has been deleted
    StaleHandle(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::AssetNotFound(msg) => write!(f, "Asset not found: {}", msg),
            Error::InvalidAsset(msg) => write!(f, "Invalid asset: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::StaleHandle(msg) => write!(f, "Stale handle: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Error::AssetNotFound(error.to_string()),
            _ => Error::InvalidAsset(error.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
