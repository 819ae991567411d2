//! The page content provider seam.
//!
//! Localization only needs four read operations and one render operation
//! from a PDF backend. [`PageContent`] captures exactly those so the
//! geometry code has no dependency on a concrete PDF library.

use image::DynamicImage;
use png::{BitDepth, ColorType, Encoder};

use crate::error::Result;
use crate::geometry::Rect;

/// Kind tag attached to a raw block by the content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    Image,
}

/// A block of text as reported by the content provider, in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTextBlock {
    pub rect: Rect,
    pub text: String,
    pub kind: BlockKind,
}

impl RawTextBlock {
    pub fn text(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
            kind: BlockKind::Text,
        }
    }
}

/// A rendered page region.
#[derive(Debug, Clone)]
pub struct Raster {
    image: DynamicImage,
}

impl Raster {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    /// Size of the raw sample buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.image.as_bytes().len()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let (width, height) = (self.width(), self.height());
        match &self.image {
            DynamicImage::ImageRgb8(rgb) => encode_png(rgb.as_raw(), width, height, ColorType::Rgb),
            DynamicImage::ImageRgba8(rgba) => {
                encode_png(rgba.as_raw(), width, height, ColorType::Rgba)
            }
            other if other.color().has_alpha() => {
                encode_png(other.to_rgba8().as_raw(), width, height, ColorType::Rgba)
            }
            other => encode_png(other.to_rgb8().as_raw(), width, height, ColorType::Rgb),
        }
    }
}

fn encode_png(data: &[u8], width: u32, height: u32, color: ColorType) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, width, height);
    encoder.set_color(color);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    writer.finish()?;
    Ok(buffer)
}

/// Read and render access to one parsed page.
pub trait PageContent {
    /// The page box; `x0`/`y0` are zero.
    fn bounds(&self) -> Rect;

    /// Text blocks in page order.
    fn text_blocks(&self) -> Vec<RawTextBlock>;

    /// Bounding boxes of embedded images.
    fn image_rects(&self) -> Vec<Rect>;

    /// Bounding boxes of painted vector paths.
    fn drawing_rects(&self) -> Vec<Rect>;

    /// Render the page clipped to `clip` at `dpi`.
    fn render(&self, clip: Rect, dpi: u32, alpha: bool) -> Result<Raster>;
}

/// A multi-page document that hands out [`PageContent`]s.
pub trait DocumentSource {
    type Page: PageContent;

    /// Basename used to derive output filenames.
    fn name(&self) -> &str;

    fn page_count(&self) -> usize;

    fn page(&self, index: usize) -> Result<Self::Page>;
}
