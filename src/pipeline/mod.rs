//! Pipeline stages between a user-supplied path and a model request.
//!
//! Each submodule implements exactly one transformation step, kept separate
//! so each is independently testable:
//!
//! ```text
//! input ──▶ render ──▶ encode
//! (path)    (pdfium)   (base64)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path (or fetch a legacy URL)
//! 2. [`render`] — rasterise a PDF page to a PNG file; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`encode`] — base64-wrap the image bytes for the request body
pub mod encode;
pub mod input;
pub mod render;
