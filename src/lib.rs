//! Caption-anchored figure extraction from PDF papers.
//!
//! A page is split into captions, body text and visual elements. For every
//! caption the region above it, bounded by the nearest text or previous
//! caption, is searched for images and vector drawings; their union is
//! rendered and written as a PNG.

pub mod classify;
pub mod cli;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod geometry;
pub mod page;
pub mod region;
pub mod text_blocks;

use std::path::{Path, PathBuf};

pub use classify::{CaptionMatcher, RegexCaptionMatcher};
pub use config::ExtractorConfig;
pub use document::{PaperDocument, PdfRenderer};
pub use error::{ExtractError, Result};
pub use extract::{ExtractedFigure, FigureExtractor};
pub use geometry::Rect;
pub use page::{DocumentSource, PageContent, Raster, RawTextBlock};
pub use region::{CaptionDecision, Rejection};

/// Extract figures from the PDF at `pdf_path` into `output_dir` and return
/// the written paths in page order.
pub fn extract_figures_from_pdf(
    pdf_path: &Path,
    output_dir: &Path,
    config: ExtractorConfig,
) -> Result<Vec<PathBuf>> {
    let renderer = PdfRenderer::new()?;
    let document = renderer.open(pdf_path)?;
    FigureExtractor::new(config).extract_document(&document, output_dir)
}
