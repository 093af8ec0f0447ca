//! Error type definitions for the school-pages application
//!
//! This module defines all error types used throughout the application,
//! providing a hierarchical error system that makes debugging and error
//! handling more straightforward.

use thiserror::Error;

/// Top-level application error type
///
/// Everything that can fail a page request once it is past input validation.
/// It uses `thiserror` to provide automatic error trait implementations and
/// proper error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Artifact cache errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Content generation errors
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Artifact cache specific errors
///
/// `Database` covers backend unavailability and query failures; `Corrupt`
/// covers rows that were read back but could not be decoded. Neither is ever
/// mapped to "entry absent".
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend connection or query failures
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored entry is malformed or unreadable
    #[error("Corrupt cache entry for key '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Content-generation collaborator errors
#[derive(Error, Debug)]
pub enum GenerationError {
    /// HTTP transport failures reaching the generation API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the generation API
    #[error("API error: HTTP {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body that could not be used as a document
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No API key configured for the generation collaborator
    #[error("Missing API key for the generation collaborator")]
    MissingApiKey,
}

/// Color-extraction collaborator errors
///
/// These are absorbed by the generation orchestrator and replaced with the
/// default palette; they exist as a distinct type so the absorption point is
/// explicit and testable.
#[derive(Error, Debug)]
pub enum PaletteError {
    /// HTTP transport failures fetching the asset
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Asset fetch returned a non-success status
    #[error("Asset fetch failed: HTTP {status}")]
    FetchFailed { status: u16 },

    /// Fetched resource is not an image
    #[error("URL does not point to an image (content-type: {content_type})")]
    NotAnImage { content_type: String },

    /// Fetched image exceeds the configured size limit
    #[error("Image too large: {size} bytes (max: {max_size})")]
    TooLarge { size: usize, max_size: usize },

    /// Image bytes could not be decoded
    #[error("Image decode failed: {0}")]
    Decode(String),

    /// Decoded image yielded no classifiable colors
    #[error("No usable colors found in image")]
    EmptyPalette,
}

impl StoreError {
    /// Create a corrupt-entry error
    pub fn corrupt<K: Into<String>, M: Into<String>>(key: K, message: M) -> Self {
        Self::Corrupt {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl GenerationError {
    /// Create an API error from a status code and body
    pub fn api<M: Into<String>>(status: u16, message: M) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
