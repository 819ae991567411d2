//! Tuning knobs for figure localization and export.

/// Minimum rendered raster size in bytes; smaller renders are treated as blank.
pub const DEFAULT_MIN_SIZE: usize = 50_000;
/// Render resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 150;
/// A caption wider than this fraction of the page is treated as full-width.
pub const DEFAULT_WIDE_CAPTION_RATIO: f32 = 0.6;
/// Horizontal slack added on both sides of a narrow caption.
pub const DEFAULT_LATERAL_TOLERANCE: f32 = 20.0;
/// Gap kept between the nearest obstacle above a caption and the figure.
pub const DEFAULT_CEILING_BUFFER: f32 = 5.0;
/// Captions with more candidate visuals than this are skipped as result grids.
pub const DEFAULT_MAX_CANDIDATES: usize = 2;
/// Minimum width and height of a finalized region, in points.
pub const DEFAULT_MIN_BOX_DIM: f32 = 50.0;
/// Drawings must exceed this extent on both axes to count as visuals.
pub const DEFAULT_DRAWING_MIN_EXTENT: f32 = 20.0;
/// Drawings at least as wide as the page minus this margin are page borders.
pub const DEFAULT_DRAWING_PAGE_MARGIN: f32 = 20.0;

/// Configuration for [`FigureExtractor`](crate::FigureExtractor).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Minimum accepted rendered byte size.
    pub min_size: usize,
    /// Optional extra floor on finalized box width and height.
    ///
    /// `None` leaves only `min_box_dim` in effect. When set, a region is
    /// rejected if either dimension is below `max(min_box_dim, min_dim)`.
    pub min_dim: Option<f32>,
    pub dpi: u32,
    pub wide_caption_ratio: f32,
    pub lateral_tolerance: f32,
    pub ceiling_buffer: f32,
    /// Complexity cutoff: more candidates than this rejects the caption.
    pub max_candidates: usize,
    pub min_box_dim: f32,
    pub drawing_min_extent: f32,
    pub drawing_page_margin: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            min_dim: None,
            dpi: DEFAULT_DPI,
            wide_caption_ratio: DEFAULT_WIDE_CAPTION_RATIO,
            lateral_tolerance: DEFAULT_LATERAL_TOLERANCE,
            ceiling_buffer: DEFAULT_CEILING_BUFFER,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            min_box_dim: DEFAULT_MIN_BOX_DIM,
            drawing_min_extent: DEFAULT_DRAWING_MIN_EXTENT,
            drawing_page_margin: DEFAULT_DRAWING_PAGE_MARGIN,
        }
    }
}

impl ExtractorConfig {
    /// The dimension floor actually applied before rendering.
    pub fn effective_min_dim(&self) -> f32 {
        match self.min_dim {
            Some(min_dim) => self.min_box_dim.max(min_dim),
            None => self.min_box_dim,
        }
    }
}
