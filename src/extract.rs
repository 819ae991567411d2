//! Per-page and per-document figure extraction: localization, rendering,
//! naming, and persistence.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::classify::{CaptionMatcher, RegexCaptionMatcher, classify_page};
use crate::config::ExtractorConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::page::{DocumentSource, PageContent, Raster};
use crate::region::{CaptionDecision, locate_figures};

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^\w\-]").unwrap();
}

/// Characters of the caption's first line kept in the filename.
pub const CAPTION_PREFIX_CHARS: usize = 25;

/// A figure that survived every filter, ready to be written.
#[derive(Debug, Clone)]
pub struct ExtractedFigure {
    pub caption: String,
    pub page_index: usize,
    pub bbox: Rect,
    pub raster: Raster,
    pub file_name: String,
}

/// First line of `caption`, truncated and reduced to word characters and
/// hyphens.
pub fn sanitize_caption(caption: &str) -> String {
    let first_line = caption.split('\n').next().unwrap_or("");
    let prefix: String = first_line.chars().take(CAPTION_PREFIX_CHARS).collect();
    UNSAFE_FILENAME_CHARS.replace_all(&prefix, "_").into_owned()
}

/// `{document}_p{page}_{caption prefix}.png`
pub fn figure_file_name(document: &str, page_index: usize, caption: &str) -> String {
    format!("{document}_p{page_index}_{}.png", sanitize_caption(caption))
}

/// Locates, renders and stores caption-anchored figures.
#[derive(Debug, Clone)]
pub struct FigureExtractor<M = RegexCaptionMatcher> {
    config: ExtractorConfig,
    matcher: M,
}

impl FigureExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            matcher: RegexCaptionMatcher,
        }
    }
}

impl Default for FigureExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl<M: CaptionMatcher> FigureExtractor<M> {
    pub fn with_matcher(config: ExtractorConfig, matcher: M) -> Self {
        Self { config, matcher }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Geometry only: one decision per caption, top to bottom.
    pub fn locate<P>(&self, page: &P) -> Vec<CaptionDecision>
    where
        P: PageContent + ?Sized,
    {
        let elements = classify_page(page, &self.matcher, &self.config);
        locate_figures(&elements, &self.config)
    }

    /// Render every accepted region of a page.
    ///
    /// Render failures are logged and skipped; they never abort the page.
    pub fn render_page<P>(&self, page: &P, document: &str, page_index: usize) -> Vec<ExtractedFigure>
    where
        P: PageContent + ?Sized,
    {
        let mut figures = Vec::new();
        for decision in self.locate(page) {
            let caption = decision.caption.first_line();
            let bbox = match decision.outcome {
                Ok(bbox) => bbox,
                Err(rejection) => {
                    log::debug!("p{page_index} {caption:?}: skipped ({rejection:?})");
                    continue;
                }
            };
            let raster = match page.render(bbox, self.config.dpi, false) {
                Ok(raster) => raster,
                Err(err) => {
                    log::warn!("p{page_index} {caption:?}: render failed: {err}");
                    continue;
                }
            };
            if raster.byte_size() < self.config.min_size {
                log::debug!(
                    "p{page_index} {caption:?}: render too small ({} bytes)",
                    raster.byte_size()
                );
                continue;
            }
            figures.push(ExtractedFigure {
                file_name: figure_file_name(document, page_index, &decision.caption.text),
                caption: decision.caption.text,
                page_index,
                bbox,
                raster,
            });
        }
        figures
    }

    /// Render a page and write each figure as PNG into `output_dir`.
    pub fn extract_page<P>(
        &self,
        page: &P,
        document: &str,
        page_index: usize,
        output_dir: &Path,
    ) -> Vec<PathBuf>
    where
        P: PageContent + ?Sized,
    {
        self.render_page(page, document, page_index)
            .into_iter()
            .filter_map(|figure| match write_figure(&figure, output_dir) {
                Ok(path) => Some(path),
                Err(err) => {
                    log::warn!(
                        "p{page_index} {:?}: failed to save {}: {err}",
                        figure.caption.lines().next().unwrap_or(""),
                        figure.file_name
                    );
                    None
                }
            })
            .collect()
    }

    /// Extract figures from every page of `document`.
    ///
    /// Only creating `output_dir` can fail; a page that cannot be parsed is
    /// logged and skipped.
    pub fn extract_document<D>(&self, document: &D, output_dir: &Path) -> Result<Vec<PathBuf>>
    where
        D: DocumentSource,
    {
        fs::create_dir_all(output_dir)?;
        let mut paths = Vec::new();
        for page_index in 0..document.page_count() {
            let page = match document.page(page_index) {
                Ok(page) => page,
                Err(err) => {
                    log::warn!("{} p{page_index}: skipping page: {err}", document.name());
                    continue;
                }
            };
            paths.extend(self.extract_page(&page, document.name(), page_index, output_dir));
        }
        log::info!("{}: extracted {} figures", document.name(), paths.len());
        Ok(paths)
    }
}

fn write_figure(figure: &ExtractedFigure, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(&figure.file_name);
    fs::write(&path, figure.raster.to_png()?)?;
    Ok(path)
}
