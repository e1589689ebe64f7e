use serde::{Deserialize, Serialize};

use super::{Axis, Point, Rect};

/// An `Expanse` is a rectangle that has a width and height but no location.
/// Components are signed so intermediate layout arithmetic never wraps; a
/// resolved layout size is always clamped to be non-negative.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Expanse {
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Expanse {
    /// Construct a new expanse.
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Extent along an axis.
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.w,
            Axis::Y => self.h,
        }
    }

    /// Set the extent along an axis.
    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.w = value,
            Axis::Y => self.h = value,
        }
    }

    /// True if either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Return a `Rect` with the same dimensions, located at the origin.
    pub fn rect(&self) -> Rect {
        Rect {
            tl: Point::zero(),
            w: self.w,
            h: self.h,
        }
    }
}

impl From<Rect> for Expanse {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(i32, i32)> for Expanse {
    fn from(v: (i32, i32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
