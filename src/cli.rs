//! Command-line flags shared by the binaries.

use clap::Args;

use crate::config::{
    DEFAULT_CEILING_BUFFER, DEFAULT_DPI, DEFAULT_LATERAL_TOLERANCE, DEFAULT_MAX_CANDIDATES,
    DEFAULT_MIN_BOX_DIM, DEFAULT_MIN_SIZE, DEFAULT_WIDE_CAPTION_RATIO, ExtractorConfig,
};

/// Extraction tuning flags; each maps onto an [`ExtractorConfig`] field.
#[derive(Debug, Clone, Args)]
pub struct ExtractorArgs {
    /// Minimum rendered raster size in bytes; smaller figures are discarded
    #[arg(long, default_value_t = DEFAULT_MIN_SIZE)]
    pub min_size: usize,

    /// Optional extra floor on figure width and height, in points
    #[arg(long)]
    pub min_dim: Option<f32>,

    /// Render resolution
    #[arg(long, default_value_t = DEFAULT_DPI)]
    pub dpi: u32,

    /// Captions wider than this fraction of the page search the full width
    #[arg(long, default_value_t = DEFAULT_WIDE_CAPTION_RATIO)]
    pub wide_caption_ratio: f32,

    /// Horizontal slack around narrow captions, in points
    #[arg(long, default_value_t = DEFAULT_LATERAL_TOLERANCE)]
    pub lateral_tolerance: f32,

    /// Gap kept below the nearest obstacle above a caption, in points
    #[arg(long, default_value_t = DEFAULT_CEILING_BUFFER)]
    pub ceiling_buffer: f32,

    /// Skip captions with more candidate visuals than this
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATES)]
    pub max_candidates: usize,

    /// Minimum figure width and height before rendering, in points
    #[arg(long, default_value_t = DEFAULT_MIN_BOX_DIM)]
    pub min_box_dim: f32,
}

impl ExtractorArgs {
    pub fn to_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            min_size: self.min_size,
            min_dim: self.min_dim,
            dpi: self.dpi,
            wide_caption_ratio: self.wide_caption_ratio,
            lateral_tolerance: self.lateral_tolerance,
            ceiling_buffer: self.ceiling_buffer,
            max_candidates: self.max_candidates,
            min_box_dim: self.min_box_dim,
            ..ExtractorConfig::default()
        }
    }
}
