//! Error types for the simulation core.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions raised by the core.
///
/// Constraints that reference a missing body are not errors; they are skipped.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid body {id:?}: {reason}")]
    InvalidBody { id: String, reason: String },

    #[error("body {0:?} already registered")]
    DuplicateBody(String),

    #[error("unknown body {0:?}")]
    UnknownBody(String),

    #[error("unsupported force type: {0}")]
    UnsupportedForce(String),

    #[error("no custom force registered as {0:?}")]
    UnknownCustomForce(String),

    #[error("unknown integration method: {0}")]
    UnsupportedMethod(String),

    #[error("at least one body must be provided")]
    EmptyBodyList,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("vectors need 2 or 3 components, got {0}")]
    InvalidVector(usize),

    #[error("cannot divide a vector by zero")]
    DivideByZero,
}

pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while reading a run request from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognised request format: {0}")]
    UnknownFormat(PathBuf),

    #[error(transparent)]
    Invalid(#[from] SimError),
}
