//! Axis-aligned rectangles in page space.
//!
//! Coordinates use a top-left origin with y increasing downward, measured in
//! PDF points relative to the page box.

/// An axis-aligned box given by its top-left `(x0, y0)` and bottom-right
/// `(x1, y1)` corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle containing every point in `points`.
    ///
    /// Returns `None` for an empty iterator.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut points = points.into_iter();
        let (x, y) = points.next()?;
        let mut rect = Self::new(x, y, x, y);
        for (x, y) in points {
            rect.x0 = rect.x0.min(x);
            rect.y0 = rect.y0.min(y);
            rect.x1 = rect.x1.max(x);
            rect.y1 = rect.y1.max(y);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// True if both rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// True if the horizontal extent of `self` overlaps the open band
    /// `(x_min, x_max)`: `max(x_min, x0) < min(x_max, x1)`.
    pub fn overlaps_band(&self, x_min: f32, x_max: f32) -> bool {
        x_min.max(self.x0) < x_max.min(self.x1)
    }

    /// True if the horizontal extents of both rectangles overlap.
    pub fn overlaps_horizontally(&self, other: &Rect) -> bool {
        self.overlaps_band(other.x0, other.x1)
    }

    /// Vertical overlap length, zero when the rectangles are disjoint.
    pub fn vertical_overlap(&self, other: &Rect) -> f32 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// Grow `self` to also cover `other`.
    pub fn include(&mut self, other: &Rect) {
        self.x0 = self.x0.min(other.x0);
        self.y0 = self.y0.min(other.y0);
        self.x1 = self.x1.max(other.x1);
        self.y1 = self.y1.max(other.y1);
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let mut rect = *self;
        rect.include(other);
        rect
    }

    /// Scale every coordinate by `factor` (e.g. points to pixels).
    pub fn scale(&self, factor: f32) -> Rect {
        Rect::new(
            self.x0 * factor,
            self.y0 * factor,
            self.x1 * factor,
            self.y1 * factor,
        )
    }

    /// Clip `self` to `bounds`, returning `None` if nothing remains.
    pub fn clip_to(&self, bounds: &Rect) -> Option<Rect> {
        let clipped = Rect::new(
            self.x0.max(bounds.x0),
            self.y0.max(bounds.y0),
            self.x1.min(bounds.x1),
            self.y1.min(bounds.y1),
        );
        (clipped.width() > 0.0 && clipped.height() > 0.0).then_some(clipped)
    }
}
