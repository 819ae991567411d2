//! PDF-backed [`DocumentSource`]: layout from the `pdf` crate, rasterization
//! through pdfium.

use std::path::Path;

use image::DynamicImage;
use pdf::file::{CachedFile, FileOptions};
use pdf::object::Page;
use pdfium_render::prelude::{PdfDocument, PdfPage, PdfRenderConfig, Pdfium};

use crate::content::PageLayout;
use crate::error::{ExtractError, Result};
use crate::geometry::Rect;
use crate::page::{DocumentSource, PageContent, Raster, RawTextBlock};

/// PDF points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Owns the pdfium bindings; documents borrow from it.
pub struct PdfRenderer {
    pdfium: Pdfium,
}

impl PdfRenderer {
    /// Bind to a pdfium library next to the executable, falling back to the
    /// system library.
    pub fn new() -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    pub fn open<'a>(&'a self, path: &Path) -> Result<PaperDocument<'a>> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| ExtractError::MissingFilename(path.display().to_string()))?;
        let file = FileOptions::cached().open(path)?;
        let rendered = self.pdfium.load_pdf_from_file(path, None)?;
        Ok(PaperDocument {
            name,
            file,
            rendered,
        })
    }
}

/// An open PDF: parsed with the `pdf` crate, rendered with pdfium.
pub struct PaperDocument<'a> {
    name: String,
    file: CachedFile<Vec<u8>>,
    rendered: PdfDocument<'a>,
}

impl<'a> DocumentSource for PaperDocument<'a> {
    type Page = PdfPageContent<'a>;

    fn name(&self) -> &str {
        &self.name
    }

    fn page_count(&self) -> usize {
        self.file.num_pages() as usize
    }

    fn page(&self, index: usize) -> Result<PdfPageContent<'a>> {
        let count = self.page_count();
        let missing = || ExtractError::MissingPage { index, count };
        if index >= count {
            return Err(missing());
        }
        let page = self.file.get_page(index as u32)?;
        let page_ref: &Page = &page;
        let layout = PageLayout::parse(page_ref, &self.file.resolver())?;
        let render_page = u16::try_from(index)
            .ok()
            .and_then(|index| self.rendered.pages().get(index).ok())
            .ok_or_else(missing)?;
        Ok(PdfPageContent {
            layout,
            page: render_page,
        })
    }
}

/// One parsed page plus its pdfium handle for rendering.
pub struct PdfPageContent<'a> {
    layout: PageLayout,
    page: PdfPage<'a>,
}

impl PdfPageContent<'_> {
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }
}

impl PageContent for PdfPageContent<'_> {
    fn bounds(&self) -> Rect {
        self.layout.bounds
    }

    fn text_blocks(&self) -> Vec<RawTextBlock> {
        self.layout.text_blocks.clone()
    }

    fn image_rects(&self) -> Vec<Rect> {
        self.layout.images.clone()
    }

    fn drawing_rects(&self) -> Vec<Rect> {
        self.layout.drawings.clone()
    }

    fn render(&self, clip: Rect, dpi: u32, alpha: bool) -> Result<Raster> {
        let scale = dpi as f32 / POINTS_PER_INCH;
        let bounds = self.layout.bounds;
        let config = PdfRenderConfig::new()
            .set_target_width((bounds.width() * scale).round() as i32)
            .set_target_height((bounds.height() * scale).round() as i32);
        let page_image = self.page.render_with_config(&config)?.as_image();

        let pixel_clip = clip
            .clip_to(&bounds)
            .map(|rect| rect.scale(scale))
            .ok_or_else(|| ExtractError::EmptyRaster {
                width: (clip.width() * scale).max(0.0) as u32,
                height: (clip.height() * scale).max(0.0) as u32,
            })?;
        let x = pixel_clip.x0.floor().max(0.0) as u32;
        let y = pixel_clip.y0.floor().max(0.0) as u32;
        let right = (pixel_clip.x1.ceil() as u32).min(page_image.width());
        let bottom = (pixel_clip.y1.ceil() as u32).min(page_image.height());
        if right <= x || bottom <= y {
            return Err(ExtractError::EmptyRaster {
                width: right.saturating_sub(x),
                height: bottom.saturating_sub(y),
            });
        }

        let cropped = page_image.crop_imm(x, y, right - x, bottom - y);
        let image: DynamicImage = if alpha {
            cropped.to_rgba8().into()
        } else {
            cropped.to_rgb8().into()
        };
        Ok(Raster::new(image))
    }
}
