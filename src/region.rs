//! Caption-anchored figure localization.
//!
//! For each caption the search region is the band between the caption's top
//! edge and the nearest obstacle above it (body text or the previous caption),
//! restricted horizontally to the caption's column. Visuals inside that band
//! are unioned into the figure box.

use crate::classify::{Caption, PageElements, VisualElement};
use crate::config::ExtractorConfig;
use crate::geometry::Rect;

/// Search region for one caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x_min: f32,
    pub x_max: f32,
    pub y_ceiling: f32,
    /// The caption's top edge.
    pub y_floor: f32,
}

/// Why a caption produced no figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// No visual falls inside the search region.
    NoCandidates,
    /// Too many visuals; likely a multi-panel results grid.
    TooComplex { count: usize },
    /// The ceiling reached the caption's top edge.
    CollapsedRegion { y_ceiling: f32, y_floor: f32 },
    Undersized { width: f32, height: f32 },
}

/// Outcome of localization for a single caption.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionDecision {
    pub caption: Caption,
    pub region: Region,
    pub candidates: Vec<VisualElement>,
    pub outcome: Result<Rect, Rejection>,
}

impl CaptionDecision {
    pub fn accepted(&self) -> Option<Rect> {
        self.outcome.ok()
    }
}

/// Horizontal band `[x_min, x_max]` to search for a caption's figure.
///
/// Wide captions span the page; narrow ones are assumed to sit under a
/// single column. Layouts with three or more columns can defeat this.
pub fn column_bounds(caption: &Rect, page: &Rect, config: &ExtractorConfig) -> (f32, f32) {
    if caption.width() > page.width() * config.wide_caption_ratio {
        (0.0, page.width())
    } else {
        (
            caption.x0 - config.lateral_tolerance,
            caption.x1 + config.lateral_tolerance,
        )
    }
}

/// Topmost y the figure region may extend to.
///
/// The ceiling starts at the page top and is pushed down to the bottom edge
/// of every body-text block strictly above the caption and overlapping the
/// band, then of the previous caption under the same rule, then offset by the
/// safety buffer. The result may exceed `caption.y0`; callers must check.
pub fn resolve_ceiling(
    caption: &Rect,
    band: (f32, f32),
    body_text: &[Rect],
    previous_caption: Option<&Rect>,
    config: &ExtractorConfig,
) -> f32 {
    let (x_min, x_max) = band;
    let obstacles = body_text.iter().chain(previous_caption);
    let ceiling = obstacles
        .filter(|obstacle| obstacle.y1 < caption.y0 && obstacle.overlaps_band(x_min, x_max))
        .fold(0.0_f32, |ceiling, obstacle| ceiling.max(obstacle.y1));
    ceiling + config.ceiling_buffer
}

/// Visuals that start above the caption, end below the ceiling, and overlap
/// the band, in page order.
pub fn select_candidates(visuals: &[VisualElement], region: &Region) -> Vec<VisualElement> {
    visuals
        .iter()
        .filter(|visual| {
            let rect = &visual.rect;
            rect.y0 < region.y_floor
                && rect.y1 > region.y_ceiling
                && rect.x1 > region.x_min
                && rect.x0 < region.x_max
        })
        .copied()
        .collect()
}

/// Reject candidate sets larger than the configured cutoff.
///
/// There is no attempt to pick a best subset.
pub fn check_complexity(
    candidates: &[VisualElement],
    config: &ExtractorConfig,
) -> Result<(), Rejection> {
    if candidates.len() > config.max_candidates {
        Err(Rejection::TooComplex {
            count: candidates.len(),
        })
    } else {
        Ok(())
    }
}

/// Union candidates, clamp the top edge to the ceiling, and enforce the
/// minimum box dimension.
pub fn finalize_region(
    candidates: &[VisualElement],
    region: &Region,
    config: &ExtractorConfig,
) -> Result<Rect, Rejection> {
    let (first, rest) = candidates.split_first().ok_or(Rejection::NoCandidates)?;
    if region.y_ceiling >= region.y_floor {
        return Err(Rejection::CollapsedRegion {
            y_ceiling: region.y_ceiling,
            y_floor: region.y_floor,
        });
    }

    let mut bbox = first.rect;
    for visual in rest {
        bbox.include(&visual.rect);
    }
    if bbox.y0 < region.y_ceiling {
        bbox.y0 = region.y_ceiling;
    }

    let min_dim = config.effective_min_dim();
    if bbox.width() < min_dim || bbox.height() < min_dim {
        return Err(Rejection::Undersized {
            width: bbox.width(),
            height: bbox.height(),
        });
    }
    Ok(bbox)
}

/// Run localization for one caption given the previous caption's rectangle.
pub fn locate_caption(
    caption: &Caption,
    previous_caption: Option<&Rect>,
    elements: &PageElements,
    config: &ExtractorConfig,
) -> CaptionDecision {
    let band = column_bounds(&caption.rect, &elements.page, config);
    let y_ceiling = resolve_ceiling(
        &caption.rect,
        band,
        &elements.body_text,
        previous_caption,
        config,
    );
    let region = Region {
        x_min: band.0,
        x_max: band.1,
        y_ceiling,
        y_floor: caption.rect.y0,
    };
    let candidates = select_candidates(&elements.visuals, &region);
    let outcome = if candidates.is_empty() {
        Err(Rejection::NoCandidates)
    } else {
        check_complexity(&candidates, config)
            .and_then(|()| finalize_region(&candidates, &region, config))
    };
    CaptionDecision {
        caption: caption.clone(),
        region,
        candidates,
        outcome,
    }
}

/// Localize every caption of a page, top to bottom.
///
/// Each caption sees the rectangle of the one before it in sorted order.
pub fn locate_figures(elements: &PageElements, config: &ExtractorConfig) -> Vec<CaptionDecision> {
    let mut previous: Option<Rect> = None;
    elements
        .captions
        .iter()
        .map(|caption| {
            let decision = locate_caption(caption, previous.as_ref(), elements, config);
            previous = Some(caption.rect);
            decision
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::VisualKind;

    fn page() -> Rect {
        Rect::new(0.0, 0.0, 600.0, 800.0)
    }

    fn image(x0: f32, y0: f32, x1: f32, y1: f32) -> VisualElement {
        VisualElement {
            rect: Rect::new(x0, y0, x1, y1),
            kind: VisualKind::Image,
        }
    }

    fn caption(rect: Rect, text: &str) -> Caption {
        Caption {
            rect,
            text: text.into(),
            page_order: 0,
        }
    }

    #[test]
    fn wide_caption_spans_page() {
        let config = ExtractorConfig::default();
        let bounds = column_bounds(&Rect::new(50.0, 400.0, 550.0, 420.0), &page(), &config);
        assert_eq!(bounds, (0.0, 600.0));
    }

    #[test]
    fn narrow_caption_gets_lateral_tolerance() {
        let config = ExtractorConfig::default();
        let bounds = column_bounds(&Rect::new(50.0, 400.0, 290.0, 420.0), &page(), &config);
        assert_eq!(bounds, (30.0, 310.0));
    }

    #[test]
    fn caption_at_exact_ratio_is_narrow() {
        let config = ExtractorConfig::default();
        let bounds = column_bounds(&Rect::new(100.0, 0.0, 460.0, 10.0), &page(), &config);
        assert_eq!(bounds, (80.0, 480.0));
    }

    #[test]
    fn ceiling_defaults_to_page_top_plus_buffer() {
        let config = ExtractorConfig::default();
        let cap = Rect::new(50.0, 400.0, 550.0, 420.0);
        assert_eq!(resolve_ceiling(&cap, (0.0, 600.0), &[], None, &config), 5.0);
    }

    #[test]
    fn ceiling_uses_nearest_text_above() {
        let config = ExtractorConfig::default();
        let cap = Rect::new(50.0, 400.0, 550.0, 420.0);
        let body = [
            Rect::new(0.0, 100.0, 600.0, 150.0),
            Rect::new(0.0, 250.0, 600.0, 300.0),
            // below the caption
            Rect::new(0.0, 500.0, 600.0, 550.0),
        ];
        assert_eq!(resolve_ceiling(&cap, (0.0, 600.0), &body, None, &config), 305.0);
    }

    #[test]
    fn ceiling_ignores_other_column() {
        let config = ExtractorConfig::default();
        let cap = Rect::new(50.0, 400.0, 280.0, 420.0);
        let band = column_bounds(&cap, &page(), &config);
        let body = [Rect::new(320.0, 250.0, 580.0, 300.0)];
        assert_eq!(resolve_ceiling(&cap, band, &body, None, &config), 5.0);
    }

    #[test]
    fn ceiling_ignores_text_touching_caption() {
        let config = ExtractorConfig::default();
        let cap = Rect::new(50.0, 400.0, 550.0, 420.0);
        let body = [Rect::new(0.0, 380.0, 600.0, 400.0)];
        assert_eq!(resolve_ceiling(&cap, (0.0, 600.0), &body, None, &config), 5.0);
    }

    #[test]
    fn previous_caption_lowers_ceiling() {
        let config = ExtractorConfig::default();
        let cap = Rect::new(50.0, 400.0, 550.0, 420.0);
        let prev = Rect::new(50.0, 100.0, 550.0, 130.0);
        let body = [Rect::new(0.0, 50.0, 600.0, 90.0)];
        assert_eq!(
            resolve_ceiling(&cap, (0.0, 600.0), &body, Some(&prev), &config),
            135.0
        );
    }

    #[test]
    fn candidates_must_enter_the_band() {
        let region = Region {
            x_min: 0.0,
            x_max: 600.0,
            y_ceiling: 305.0,
            y_floor: 400.0,
        };
        let visuals = [
            image(10.0, 310.0, 590.0, 390.0),
            // entirely above the ceiling
            image(10.0, 100.0, 590.0, 305.0),
            // below the caption top
            image(10.0, 400.0, 590.0, 500.0),
        ];
        let selected = select_candidates(&visuals, &region);
        assert_eq!(selected, vec![visuals[0]]);
    }

    #[test]
    fn complexity_cutoff() {
        let config = ExtractorConfig::default();
        let two = [image(0.0, 0.0, 1.0, 1.0); 2];
        let three = [image(0.0, 0.0, 1.0, 1.0); 3];
        assert!(check_complexity(&two, &config).is_ok());
        assert_eq!(
            check_complexity(&three, &config),
            Err(Rejection::TooComplex { count: 3 })
        );
    }

    #[test]
    fn finalize_clamps_to_ceiling() {
        let config = ExtractorConfig::default();
        let region = Region {
            x_min: 0.0,
            x_max: 600.0,
            y_ceiling: 305.0,
            y_floor: 400.0,
        };
        let candidates = [image(10.0, 200.0, 300.0, 390.0), image(280.0, 320.0, 590.0, 380.0)];
        let bbox = finalize_region(&candidates, &region, &config).unwrap();
        assert_eq!(bbox, Rect::new(10.0, 305.0, 590.0, 390.0));
    }

    #[test]
    fn finalize_rejects_small_boxes() {
        let config = ExtractorConfig::default();
        let region = Region {
            x_min: 0.0,
            x_max: 600.0,
            y_ceiling: 5.0,
            y_floor: 400.0,
        };
        let candidates = [image(10.0, 350.0, 300.0, 390.0)];
        assert_eq!(
            finalize_region(&candidates, &region, &config),
            Err(Rejection::Undersized {
                width: 290.0,
                height: 40.0
            })
        );
    }

    #[test]
    fn finalize_rejects_collapsed_region() {
        let config = ExtractorConfig::default();
        let region = Region {
            x_min: 0.0,
            x_max: 600.0,
            y_ceiling: 402.0,
            y_floor: 400.0,
        };
        let candidates = [image(10.0, 300.0, 300.0, 450.0)];
        assert!(matches!(
            finalize_region(&candidates, &region, &config),
            Err(Rejection::CollapsedRegion { .. })
        ));
    }

    #[test]
    fn min_dim_applies_when_configured() {
        let config = ExtractorConfig {
            min_dim: Some(100.0),
            ..ExtractorConfig::default()
        };
        let region = Region {
            x_min: 0.0,
            x_max: 600.0,
            y_ceiling: 5.0,
            y_floor: 400.0,
        };
        let candidates = [image(10.0, 310.0, 590.0, 390.0)];
        assert!(matches!(
            finalize_region(&candidates, &region, &config),
            Err(Rejection::Undersized { .. })
        ));
        assert!(finalize_region(&candidates, &region, &ExtractorConfig::default()).is_ok());
    }

    #[test]
    fn stacked_captions_do_not_share_figures() {
        let config = ExtractorConfig::default();
        let elements = PageElements {
            page: page(),
            captions: vec![
                caption(Rect::new(50.0, 300.0, 550.0, 320.0), "Figure 1: top"),
                caption(Rect::new(50.0, 600.0, 550.0, 620.0), "Figure 2: bottom"),
            ],
            body_text: vec![Rect::new(0.0, 40.0, 600.0, 90.0)],
            visuals: vec![
                image(20.0, 100.0, 580.0, 290.0),
                image(20.0, 330.0, 580.0, 590.0),
            ],
        };
        let decisions = locate_figures(&elements, &config);
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].accepted(), Some(Rect::new(20.0, 100.0, 580.0, 290.0)));
        assert_eq!(decisions[1].region.y_ceiling, 325.0);
        assert_eq!(decisions[1].accepted(), Some(Rect::new(20.0, 330.0, 580.0, 590.0)));
    }
}
