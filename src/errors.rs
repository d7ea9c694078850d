// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the mesh viewer
//!
//! The depth grid projector itself never fails; these cover the edges around
//! it (sensor control, configuration files and the terminal).

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Sensor-related errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Terminal / filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Snapshot encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Sensor-specific errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SensorError {
    /// No depth sensor connected
    #[error("No depth sensor found")]
    NoDeviceFound,
    /// Streaming could not be started
    #[error("Failed to start streaming: {0}")]
    StartFailed(String),
    /// The sensor has no tilt motor (or it is not reachable)
    #[error("Motor control not available")]
    MotorUnavailable,
    /// Tilt command rejected by the device
    #[error("Tilt failed: {0}")]
    TiltFailed(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}
