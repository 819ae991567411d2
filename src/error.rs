use std::io;

use pdf::error::PdfError;
use pdfium_render::prelude::PdfiumError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Primary error type for figure extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),
    #[error("render error: {0}")]
    Render(#[from] PdfiumError),
    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("page {index} out of range (document has {count} pages)")]
    MissingPage { index: usize, count: usize },
    #[error("render of {width}x{height} px clip produced no pixels")]
    EmptyRaster { width: u32, height: u32 },
    #[error("failed to derive filename from {0}")]
    MissingFilename(String),
    #[error("downloaded body for {0} is not a PDF")]
    NotPdf(String),
}
