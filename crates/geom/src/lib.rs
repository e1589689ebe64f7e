//! Signed integer geometry used by the arbor layout engine.
//!
//! All layout quantities are signed: children may be offset into negative
//! space by scrolling or by relative offsets, and intermediate solver values
//! may briefly overflow their containers.

/// Per-side insets.
mod edges;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use edges::Edges;
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;
use serde::{Deserialize, Serialize};

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
}

impl Axis {
    /// Both axes, X first.
    pub const BOTH: [Self; 2] = [Self::X, Self::Y];

    /// The perpendicular axis.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Index of this axis in a two-element array.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
        }
    }
}
