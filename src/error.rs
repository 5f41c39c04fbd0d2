//! Error types for the askdoc library.
//!
//! A single fatal error enum: every failure aborts the whole request and is
//! raised synchronously to the immediate caller. There is no retry policy and
//! no partial-failure recovery — a call either produces an answer (set) or an
//! [`AskDocError`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the askdoc library.
#[derive(Debug, Error)]
pub enum AskDocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The image path does not resolve to an existing local file.
    #[error("Image not found: '{path}'\nCheck the path exists and is readable.")]
    ImageNotFound { path: PathBuf },

    /// The PDF path does not resolve to an existing local file.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    DocumentNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A remote URL was supplied where only local paths are allowed.
    #[error("Unsupported input '{input}': only local file paths are allowed here")]
    UnsupportedInput { input: String },

    /// HTTP URL was syntactically valid but the image download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Image download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Question errors ───────────────────────────────────────────────────
    /// The question batch failed validation before any network call.
    #[error("Invalid question batch: {0}")]
    InvalidQuestionBatch(String),

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Document '{path}' could not be opened: {detail}")]
    CorruptDocument { path: PathBuf, detail: String },

    /// The requested page number exceeds the document's page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// The document has zero renderable pages.
    #[error("Document '{path}' has no renderable pages")]
    EmptyDocument { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── Model errors ──────────────────────────────────────────────────────
    /// No model identifier was supplied.
    #[error(
        "Model must be provided (no default).\n\
         Set ClientConfig::model or pass --model (e.g. llava:7b)."
    )]
    ModelNotConfigured,

    /// The model endpoint returned a transport-level or HTTP error.
    #[error("Model API error: {message}")]
    ApiError { message: String },

    /// The server reply could not be interpreted.
    ///
    /// Raised when the generate response lacks a textual `response` field, or
    /// when a batch reply is not JSON / not an object with an `answers` array.
    #[error("Malformed server response: {detail}")]
    MalformedServerResponse { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
