use serde::{Deserialize, Serialize};

use super::{Expanse, Point};

/// A signed rectangle with a top-left corner and a size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Construct a new rectangle.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Build a rectangle from an origin and a size.
    pub fn from_parts(tl: Point, size: Expanse) -> Self {
        Self {
            tl,
            w: size.w,
            h: size.h,
        }
    }

    /// Size of the rectangle.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// True if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i32 {
        self.tl.x.saturating_add(self.w)
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i32 {
        self.tl.y.saturating_add(self.h)
    }

    /// Translate the rectangle by an offset.
    pub fn shift(&self, by: Point) -> Self {
        Self {
            tl: self.tl + by,
            w: self.w,
            h: self.h,
        }
    }

    /// Intersection of two rectangles, if any area is shared.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x0 = self.tl.x.max(other.tl.x);
        let y0 = self.tl.y.max(other.tl.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// True if the point lies inside the rectangle.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.tl.x && p.x < self.right() && p.y >= self.tl.y && p.y < self.bottom()
    }
}
