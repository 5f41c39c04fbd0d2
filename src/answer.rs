//! Document-level entry points.
//!
//! These functions resolve the input (image vs PDF + page) to a concrete
//! image file and dispatch to the model client with either a single question
//! or a question batch. PDF pages are rendered into a private temporary
//! directory whose lifetime is tied to the call: the [`tempfile::TempDir`]
//! guard inside [`ResolvedPage`] deletes it on success, validation failure,
//! and rendering failure alike.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::client::VisionClient;
use crate::config::ClientConfig;
use crate::error::AskDocError;
use crate::pipeline::{input, render};
use crate::question::{AnswerSet, Question};

/// The image a question will be asked about — either the caller's own file
/// or a page rendered into a scoped temporary directory.
#[derive(Debug)]
enum ResolvedPage {
    /// Input was already an image path.
    Image(PathBuf),
    /// Input was a PDF; the selected page was rendered to a temp file.
    /// The `TempDir` is kept alive until the model call completes.
    Rendered { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedPage {
    fn path(&self) -> &Path {
        match self {
            ResolvedPage::Image(p) => p,
            ResolvedPage::Rendered { path, .. } => path,
        }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Resolve `input_str` to a concrete image for page `page` (1-based).
///
/// Non-PDF inputs pass through untouched; existence is checked later by the
/// client when it loads the image. PDF inputs are validated and rendered.
async fn resolve_page(
    input_str: &str,
    page: usize,
    config: &ClientConfig,
) -> Result<ResolvedPage, AskDocError> {
    if input::is_url(input_str) {
        return Err(AskDocError::UnsupportedInput {
            input: input_str.to_string(),
        });
    }

    let path = Path::new(input_str);
    if !is_pdf(path) {
        return Ok(ResolvedPage::Image(path.to_path_buf()));
    }

    // Page validation comes before any file access or rendering.
    if page < 1 {
        return Err(AskDocError::InvalidConfig("page must be >= 1".into()));
    }

    input::require_local_file(path, |path| AskDocError::DocumentNotFound { path })?;

    let temp_dir = TempDir::with_prefix("askdoc_")
        .map_err(|e| AskDocError::Internal(format!("tempdir: {e}")))?;
    debug!("Rendering page {} into {}", page, temp_dir.path().display());

    // A render failure drops `temp_dir` here, removing the directory.
    let rendered = render::render_page(path, temp_dir.path(), page, config.dpi).await?;

    Ok(ResolvedPage::Rendered {
        path: rendered,
        _temp_dir: temp_dir,
    })
}

/// Ask one free-text question about a local image.
///
/// The legacy capability of fetching an `http(s)` image URL is available on
/// this path only.
pub async fn ask_image(
    image: impl AsRef<str>,
    question: &str,
    config: &ClientConfig,
) -> Result<String, AskDocError> {
    let client = VisionClient::new(config.clone())?;
    client.ask(image.as_ref(), question).await
}

/// Ask multiple typed questions about a local image in one model call.
pub async fn ask_image_many(
    image: impl AsRef<str>,
    questions: &[Question],
    config: &ClientConfig,
) -> Result<AnswerSet, AskDocError> {
    let client = VisionClient::new(config.clone())?;
    client.ask_many(image.as_ref(), questions).await
}

/// Ask one free-text question about a local image or a PDF page.
///
/// Inputs ending in `.pdf` are rendered at `config.dpi`; `page` is 1-based
/// and ignored for image inputs. Remote URLs are rejected.
pub async fn ask_document(
    input_str: impl AsRef<str>,
    question: &str,
    page: usize,
    config: &ClientConfig,
) -> Result<String, AskDocError> {
    let client = VisionClient::new(config.clone())?;
    let resolved = resolve_page(input_str.as_ref(), page, config).await?;
    client
        .ask(&resolved.path().to_string_lossy(), question)
        .await
}

/// Ask multiple typed questions about a local image or a PDF page in one
/// model call.
pub async fn ask_document_many(
    input_str: impl AsRef<str>,
    questions: &[Question],
    page: usize,
    config: &ClientConfig,
) -> Result<AnswerSet, AskDocError> {
    let client = VisionClient::new(config.clone())?;
    let resolved = resolve_page(input_str.as_ref(), page, config).await?;
    client
        .ask_many(&resolved.path().to_string_lossy(), questions)
        .await
}

/// Synchronous wrapper around [`ask_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn ask_document_sync(
    input_str: impl AsRef<str>,
    question: &str,
    page: usize,
    config: &ClientConfig,
) -> Result<String, AskDocError> {
    runtime()?.block_on(ask_document(input_str, question, page, config))
}

/// Synchronous wrapper around [`ask_document_many`].
pub fn ask_document_many_sync(
    input_str: impl AsRef<str>,
    questions: &[Question],
    page: usize,
    config: &ClientConfig,
) -> Result<AnswerSet, AskDocError> {
    runtime()?.block_on(ask_document_many(input_str, questions, page, config))
}

fn runtime() -> Result<tokio::runtime::Runtime, AskDocError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AskDocError::Internal(format!("failed to create tokio runtime: {e}")))
}
