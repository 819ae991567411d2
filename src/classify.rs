//! Partitioning of page content into captions, body text, and visuals.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ExtractorConfig;
use crate::geometry::Rect;
use crate::page::{BlockKind, PageContent, RawTextBlock};

lazy_static! {
    static ref CAPTION_PATTERN: Regex = Regex::new(r"(?i)^(Fig\.?|Figure)\s*\d+").unwrap();
}

/// Decides whether a text block anchors a figure.
///
/// Caption conventions differ between publishers and languages, so the
/// classifier accepts any implementation.
pub trait CaptionMatcher {
    /// `text` is already trimmed.
    fn is_caption(&self, text: &str) -> bool;
}

/// Matches `Fig`, `Fig.` or `Figure` followed by a number, case-insensitive,
/// at the start of the block.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexCaptionMatcher;

impl CaptionMatcher for RegexCaptionMatcher {
    fn is_caption(&self, text: &str) -> bool {
        CAPTION_PATTERN.is_match(text)
    }
}

impl<F> CaptionMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn is_caption(&self, text: &str) -> bool {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Caption,
    Body,
}

/// A text block after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub rect: Rect,
    pub text: String,
    pub role: TextRole,
}

/// A caption block and its position in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    pub rect: Rect,
    pub text: String,
    pub page_order: usize,
}

impl Caption {
    /// First line of the caption, used for filenames and log lines.
    pub fn first_line(&self) -> &str {
        self.text.lines().next().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Image,
    Drawing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualElement {
    pub rect: Rect,
    pub kind: VisualKind,
}

/// Classified content of one page.
#[derive(Debug, Clone, Default)]
pub struct PageElements {
    pub page: Rect,
    /// Sorted top-to-bottom.
    pub captions: Vec<Caption>,
    pub body_text: Vec<Rect>,
    pub visuals: Vec<VisualElement>,
}

/// Tag each text block as caption or body.
pub fn classify_text(blocks: &[RawTextBlock], matcher: &impl CaptionMatcher) -> Vec<TextBlock> {
    blocks
        .iter()
        .filter(|block| block.kind == BlockKind::Text)
        .map(|block| {
            let text = block.text.trim();
            let role = if matcher.is_caption(text) {
                TextRole::Caption
            } else {
                TextRole::Body
            };
            TextBlock {
                rect: block.rect,
                text: text.to_owned(),
                role,
            }
        })
        .collect()
}

/// Whether a drawing box is large enough to be figure content and is not a
/// full-width rule or page border.
pub fn admits_drawing(rect: &Rect, page: &Rect, config: &ExtractorConfig) -> bool {
    rect.width() > config.drawing_min_extent
        && rect.height() > config.drawing_min_extent
        && rect.width() < page.width() - config.drawing_page_margin
}

/// Split a page into sorted captions, body text obstacles, and visuals.
pub fn classify_page<P>(page: &P, matcher: &impl CaptionMatcher, config: &ExtractorConfig) -> PageElements
where
    P: PageContent + ?Sized,
{
    let bounds = page.bounds();
    let mut captions = Vec::new();
    let mut body_text = Vec::new();
    for (page_order, block) in classify_text(&page.text_blocks(), matcher)
        .into_iter()
        .enumerate()
    {
        match block.role {
            TextRole::Caption => captions.push(Caption {
                rect: block.rect,
                text: block.text,
                page_order,
            }),
            TextRole::Body => body_text.push(block.rect),
        }
    }
    // Stable sort keeps page order for captions sharing a top edge.
    captions.sort_by(|a, b| a.rect.y0.total_cmp(&b.rect.y0));

    let mut visuals: Vec<VisualElement> = page
        .image_rects()
        .into_iter()
        .map(|rect| VisualElement {
            rect,
            kind: VisualKind::Image,
        })
        .collect();
    visuals.extend(
        page.drawing_rects()
            .into_iter()
            .filter(|rect| admits_drawing(rect, &bounds, config))
            .map(|rect| VisualElement {
                rect,
                kind: VisualKind::Drawing,
            }),
    );

    PageElements {
        page: bounds,
        captions,
        body_text,
        visuals,
    }
}
