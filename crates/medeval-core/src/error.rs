//! Unified error types for medeval

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all medeval operations
#[derive(Error, Debug)]
pub enum EvalError {
    // Subject system errors
    #[error("Generation failed: {0}")]
    Generation(String),

    // Judge errors
    #[error("Judge transport error: {0}")]
    JudgeTransport(String),

    #[error("Judge payload could not be parsed: {0}")]
    JudgeParse(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    // Corpus errors
    #[error("Corpus file is malformed: {0}")]
    CorpusParse(String),

    // Artifact errors
    #[error("Results file not found: {0}. Run an evaluation first.")]
    MissingResultsFile(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using EvalError
pub type Result<T> = std::result::Result<T, EvalError>;
