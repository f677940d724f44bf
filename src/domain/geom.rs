/// Axis-aligned rectangles and the two queries every collision rule uses.
///
/// Coordinates are screen-style: x grows to the right, y grows downward,
/// `(x, y)` is the top-left corner.
///
/// Overlap is strict on both axes: rectangles that only share an edge do
/// not overlap. `penetration` reports the overlap extent on each axis,
/// so a value `<= 0` on either axis means "separated on that axis".

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "width")]
    pub w: f32,
    #[serde(rename = "height")]
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Horizontal extents overlap (strict).
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.x && self.x < other.right()
    }

    /// Vertical extents overlap (strict).
    #[inline]
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.bottom() > other.y && self.y < other.bottom()
    }
}

/// True iff `a` and `b` intersect with strictly positive overlap on both axes.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.overlaps_x(b) && a.overlaps_y(b)
}

/// Overlap extent on each axis: `(dx, dy)`.
///
/// Moving either rectangle by `dx` horizontally (or `dy` vertically) away
/// from the other separates them on that axis. Non-positive values mean
/// the rectangles are already apart on that axis.
#[inline]
pub fn penetration(a: &Rect, b: &Rect) -> (f32, f32) {
    let dx = a.right().min(b.right()) - a.x.max(b.x);
    let dy = a.bottom().min(b.bottom()) - a.y.max(b.y);
    (dx, dy)
}
