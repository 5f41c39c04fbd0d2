//! PDF rasterisation: render pages to PNG files via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! Output files follow the `<basename>_page<N>.png` pattern with 1-based page
//! numbers. PNG is lossless: text crispness matters more than file size when
//! a vision model has to read the page.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

use crate::error::AskDocError;

/// Render every page of a PDF into `out_dir`, ordered by page number.
pub async fn render_pages(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PathBuf>, AskDocError> {
    let path = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();

    tokio::task::spawn_blocking(move || render_blocking(&path, &dir, dpi, None))
        .await
        .map_err(|e| AskDocError::Internal(format!("render task panicked: {e}")))?
}

/// Render a single page (1-based) of a PDF into `out_dir`.
///
/// Fails with [`AskDocError::EmptyDocument`] when the document has no pages
/// and [`AskDocError::PageOutOfRange`] when `page` exceeds the page count.
/// Callers validate `page >= 1` before any rendering happens.
pub async fn render_page(
    pdf_path: &Path,
    out_dir: &Path,
    page: usize,
    dpi: u32,
) -> Result<PathBuf, AskDocError> {
    let path = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();

    let mut rendered =
        tokio::task::spawn_blocking(move || render_blocking(&path, &dir, dpi, Some(page)))
            .await
            .map_err(|e| AskDocError::Internal(format!("render task panicked: {e}")))??;

    rendered
        .pop()
        .ok_or_else(|| AskDocError::Internal("renderer produced no output".into()))
}

/// Blocking implementation shared by [`render_pages`] and [`render_page`].
///
/// `only_page` is 1-based; `None` renders the whole document.
fn render_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
    only_page: Option<usize>,
) -> Result<Vec<PathBuf>, AskDocError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| AskDocError::CorruptDocument {
                path: pdf_path.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    if total_pages == 0 {
        return Err(AskDocError::EmptyDocument {
            path: pdf_path.to_path_buf(),
        });
    }

    let indices: Vec<usize> = match only_page {
        Some(page) => {
            if page > total_pages {
                return Err(AskDocError::PageOutOfRange {
                    page,
                    total: total_pages,
                });
            }
            vec![page - 1]
        }
        None => (0..total_pages).collect(),
    };

    // Scale factor from DPI; PDF user space is 72 dpi.
    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

    let basename = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let mut results = Vec::with_capacity(indices.len());

    for idx in indices {
        let page = pages
            .get(idx as u16)
            .map_err(|e| AskDocError::RenderFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| AskDocError::RenderFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let image: DynamicImage = bitmap.as_image();
        let out_path = out_dir.join(format!("{}_page{}.png", basename, idx + 1));
        image.save(&out_path).map_err(|e| AskDocError::RenderFailed {
            page: idx + 1,
            detail: format!("PNG encode failed: {e}"),
        })?;

        debug!(
            "Rendered page {} -> {} ({}x{} px)",
            idx + 1,
            out_path.display(),
            image.width(),
            image.height()
        );

        results.push(out_path);
    }

    Ok(results)
}
