use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use super::Axis;

/// A signed 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the origin point.
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Return true when both coordinates are zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Coordinate along an axis.
    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Set the coordinate along an axis.
    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }

    /// Build a point from primary/secondary components.
    pub fn from_axes(primary: Axis, main: i32, cross: i32) -> Self {
        let mut p = Self::zero();
        p.set(primary, main);
        p.set(primary.other(), cross);
        p
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_sub(other.x),
            y: self.y.saturating_sub(other.y),
        }
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from(v: (i32, i32)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub() {
        let a = Point::new(3, -2);
        assert_eq!(a + Point::new(1, 1), Point::new(4, -1));
        assert_eq!(a - Point::new(5, 0), Point::new(-2, -2));
        assert_eq!(Point::new(i32::MAX, 0) + Point::new(1, 0), Point::new(i32::MAX, 0));
    }

    #[test]
    fn axis_access() {
        let mut p = Point::from_axes(Axis::Y, 7, 2);
        assert_eq!(p, Point::new(2, 7));
        p.set(Axis::X, 9);
        assert_eq!(p.get(Axis::X), 9);
        assert!(!p.is_zero());
    }
}
