//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`MarionetteError`] covers every load-time failure:
//! - Asset reading and decoding errors
//! - Malformed or incomplete glTF documents
//! - Invalid character settings
//!
//! Per-frame operations (advancing clocks, evaluating poses, building
//! palettes) never fail; every recoverable condition there resolves to a
//! documented default instead.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, MarionetteError>`.
//!
//! ```rust,ignore
//! use marionette::errors::Result;
//! use marionette::assets::loaders::GltfLoader;
//!
//! fn load(path: &std::path::Path) -> Result<()> {
//!     let asset = GltfLoader::load(path)?;
//!     println!("{} clips", asset.clips.len());
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum MarionetteError {
    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// glTF parsing or loading error.
    #[cfg(feature = "gltf")]
    #[error("glTF error: {0}")]
    GltfError(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Asset Content Errors
    // ========================================================================
    /// The document has no scene to take a node hierarchy from.
    #[error("Asset has no scene: {0}")]
    MissingScene(String),

    /// A buffer referenced by the document could not be resolved.
    #[error("Missing buffer data: {context} (index: {index})")]
    MissingBufferData {
        /// Description of what was being read
        context: String,
        /// The buffer index
        index: usize,
    },

    /// The asset content breaks an invariant (unsorted keys, NaN values, ...).
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// An accessor could not be read.
    #[error("Malformed accessor: {0}")]
    MalformedAccessor(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A settings value is out of its valid range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

#[cfg(feature = "gltf")]
impl From<gltf::Error> for MarionetteError {
    fn from(err: gltf::Error) -> Self {
        MarionetteError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, MarionetteError>`.
pub type Result<T> = std::result::Result<T, MarionetteError>;
