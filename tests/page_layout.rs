//! Content-stream interpretation on small hand-written PDFs (612x792 pt).

use std::path::Path;

use figcrop::content::PageLayout;
use figcrop::{ExtractError, FigureExtractor, PageContent, Raster, RawTextBlock, Rect, Result};
use pdf::file::FileOptions;

fn parse_fixture(name: &str) -> PageLayout {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name);
    let file = FileOptions::cached().open(&path).unwrap();
    let page = file.get_page(0).unwrap();
    PageLayout::parse(&page, &file.resolver()).unwrap()
}

/// Parsed geometry without a renderer attached.
struct ParsedPage(PageLayout);

impl PageContent for ParsedPage {
    fn bounds(&self) -> Rect {
        self.0.bounds
    }

    fn text_blocks(&self) -> Vec<RawTextBlock> {
        self.0.text_blocks.clone()
    }

    fn image_rects(&self) -> Vec<Rect> {
        self.0.images.clone()
    }

    fn drawing_rects(&self) -> Vec<Rect> {
        self.0.drawings.clone()
    }

    fn render(&self, _clip: Rect, _dpi: u32, _alpha: bool) -> Result<Raster> {
        Err(ExtractError::EmptyRaster {
            width: 0,
            height: 0,
        })
    }
}

#[test]
fn text_runs_are_placed_and_grouped() {
    let layout = parse_fixture("layout.pdf");
    assert_eq!(layout.bounds, Rect::new(0.0, 0.0, 612.0, 792.0));
    assert_eq!(
        layout.text_blocks,
        vec![
            // positioned with Tm
            RawTextBlock::text(Rect::new(72.0, 104.0, 117.0, 114.0), "Body text"),
            // two Td lines, 12 pt apart
            RawTextBlock::text(
                Rect::new(72.0, 354.0, 162.0, 376.0),
                "Figure 1: Overview\nof the system."
            ),
        ]
    );
}

#[test]
fn painted_paths_become_drawings() {
    let layout = parse_fixture("layout.pdf");
    // `re f` and `m l S`; the `re W n` clip is not painted
    assert_eq!(
        layout.drawings,
        vec![
            Rect::new(72.0, 142.0, 472.0, 342.0),
            Rect::new(50.0, 72.0, 250.0, 72.0),
        ]
    );
}

#[test]
fn image_xobject_follows_ctm() {
    let layout = parse_fixture("layout.pdf");
    assert_eq!(layout.images, vec![Rect::new(72.0, 392.0, 272.0, 492.0)]);
}

#[test]
fn inline_image_follows_ctm() {
    let layout = parse_fixture("inline_image.pdf");
    assert_eq!(layout.images, vec![Rect::new(300.0, 652.0, 350.0, 692.0)]);
    assert!(layout.drawings.is_empty());
}

#[test]
fn form_xobject_content_is_visible() {
    let layout = parse_fixture("form_figure.pdf");
    // form /Matrix scales by 2 on top of the page translation
    assert_eq!(layout.drawings, vec![Rect::new(72.0, 142.0, 472.0, 342.0)]);
    // image drawn from the form's own resources
    assert_eq!(layout.images, vec![Rect::new(82.0, 282.0, 182.0, 332.0)]);
}

#[test]
fn standard_font_caption_has_plausible_width() {
    let layout = parse_fixture("form_figure.pdf");
    assert_eq!(layout.text_blocks.len(), 1);
    assert_eq!(layout.text_blocks[0].text, "Figure 1: Overview of the system");
    assert_eq!(layout.text_blocks[0].rect, Rect::new(72.0, 354.0, 232.0, 364.0));
}

#[test]
fn self_referencing_form_terminates() {
    let layout = parse_fixture("recursive_form.pdf");
    assert!(layout.drawings.len() > 1);
    assert!(layout.drawings.len() <= 16);
    assert!(
        layout
            .drawings
            .iter()
            .all(|rect| *rect == Rect::new(0.0, 782.0, 10.0, 792.0))
    );
}

#[test]
fn figure_inside_form_is_located() {
    let page = ParsedPage(parse_fixture("form_figure.pdf"));
    let decisions = FigureExtractor::default().locate(&page);
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].candidates.len(), 2);
    assert_eq!(decisions[0].accepted(), Some(Rect::new(72.0, 142.0, 472.0, 342.0)));
}

#[test]
fn figure_below_body_text_is_located() {
    let page = ParsedPage(parse_fixture("layout.pdf"));
    let decisions = FigureExtractor::default().locate(&page);
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].region.y_ceiling, 119.0);
    assert_eq!(decisions[0].accepted(), Some(Rect::new(72.0, 142.0, 472.0, 342.0)));
}
