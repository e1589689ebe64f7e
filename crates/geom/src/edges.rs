use serde::{Deserialize, Serialize};

use super::{Axis, Point};

/// Per-side values for padding, margin and offsets.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Edges<T> {
    /// Left side.
    pub left: T,
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
}

impl<T: Copy> Edges<T> {
    /// The same value on every side.
    pub fn all(v: T) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }

    /// Leading side (left or top) along an axis.
    pub fn start(&self, axis: Axis) -> T {
        match axis {
            Axis::X => self.left,
            Axis::Y => self.top,
        }
    }

    /// Trailing side (right or bottom) along an axis.
    pub fn end(&self, axis: Axis) -> T {
        match axis {
            Axis::X => self.right,
            Axis::Y => self.bottom,
        }
    }

    /// Set the leading side along an axis.
    pub fn set_start(&mut self, axis: Axis, v: T) {
        match axis {
            Axis::X => self.left = v,
            Axis::Y => self.top = v,
        }
    }

    /// Set the trailing side along an axis.
    pub fn set_end(&mut self, axis: Axis, v: T) {
        match axis {
            Axis::X => self.right = v,
            Axis::Y => self.bottom = v,
        }
    }

    /// Apply a function to every side.
    pub fn map<U>(&self, f: impl Fn(T) -> U) -> Edges<U> {
        Edges {
            left: f(self.left),
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
        }
    }
}

impl Edges<i32> {
    /// Sum of both sides along an axis.
    pub fn along(&self, axis: Axis) -> i32 {
        self.start(axis).saturating_add(self.end(axis))
    }

    /// Offset from an outer origin to the inset origin.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Side-wise sum of two inset sets.
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            left: self.left.saturating_add(other.left),
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
        }
    }
}
