#![allow(dead_code)]
//! In-memory page provider for driving the extractor without a PDF backend.

use std::cell::RefCell;

use figcrop::{ExtractError, PageContent, Raster, RawTextBlock, Rect, Result};
use image::{DynamicImage, Rgb, RgbImage};

/// A page assembled from literal rectangles. Renders solid white rasters
/// whose pixel size follows the clip and DPI, and records every clip.
#[derive(Debug, Default)]
pub struct FakePage {
    pub bounds: Rect,
    pub blocks: Vec<RawTextBlock>,
    pub images: Vec<Rect>,
    pub drawings: Vec<Rect>,
    pub fail_render: bool,
    pub renders: RefCell<Vec<Rect>>,
}

impl FakePage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            ..Self::default()
        }
    }

    pub fn text(mut self, rect: Rect, text: &str) -> Self {
        self.blocks.push(RawTextBlock::text(rect, text));
        self
    }

    pub fn image(mut self, rect: Rect) -> Self {
        self.images.push(rect);
        self
    }

    pub fn drawing(mut self, rect: Rect) -> Self {
        self.drawings.push(rect);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_render = true;
        self
    }
}

impl PageContent for FakePage {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn text_blocks(&self) -> Vec<RawTextBlock> {
        self.blocks.clone()
    }

    fn image_rects(&self) -> Vec<Rect> {
        self.images.clone()
    }

    fn drawing_rects(&self) -> Vec<Rect> {
        self.drawings.clone()
    }

    fn render(&self, clip: Rect, dpi: u32, _alpha: bool) -> Result<Raster> {
        self.renders.borrow_mut().push(clip);
        if self.fail_render {
            return Err(ExtractError::EmptyRaster {
                width: 0,
                height: 0,
            });
        }
        let scale = dpi as f32 / 72.0;
        let width = (clip.width() * scale).round().max(1.0) as u32;
        let height = (clip.height() * scale).round().max(1.0) as u32;
        let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        Ok(Raster::new(DynamicImage::ImageRgb8(image)))
    }
}
