//! Resolved style value types consumed by the layout engine.

use geom::{Axis, Edges};
use serde::{Deserialize, Serialize};

/// A size expression for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum SizeValue {
    /// An exact pixel extent.
    Fixed(i32),
    /// A percentage (0-100) of the parent's available content area.
    Percent(f32),
    /// Fill the available area, or start at zero when a flex parent grows it.
    #[default]
    Auto,
    /// The bounding extent of the children.
    FitContent,
    /// No constraint: no bound for min/max, zero for a preferred size.
    Unconstrained,
}

impl SizeValue {
    /// Shorthand for a percentage size.
    pub fn percent(p: f32) -> Self {
        Self::Percent(p)
    }
}

/// A length that is either fixed or relative to a base extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Length {
    /// An exact pixel length.
    Fixed(i32),
    /// A percentage (0-100) of a base extent.
    Percent(f32),
}

impl Default for Length {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

impl Length {
    /// Resolve against a base extent, rounding down.
    pub fn resolve(self, base: i32) -> i32 {
        match self {
            Self::Fixed(v) => v,
            Self::Percent(p) => percent_of(base, p),
        }
    }

    /// True if resolving needs a base extent.
    pub fn is_relative(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// Percentage of an integer extent, rounded down.
pub(crate) fn percent_of(base: i32, p: f32) -> i32 {
    (base as f32 * p / 100.0).floor() as i32
}

/// How a widget arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutType {
    /// The widget and its subtree are removed from layout entirely.
    None,
    /// Children stack along the orientation without growth.
    #[default]
    Block,
    /// Children stack with growth, shrink and alignment; scrollable.
    Flex,
    /// Children are placed in fixed-size cells; scrollable.
    Grid,
}

impl LayoutType {
    /// True for layouts that carry a scroll/virtualization controller.
    pub fn is_dynamic(self) -> bool {
        matches!(self, Self::Flex | Self::Grid)
    }
}

/// Direction in which children are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Orientation {
    /// Children flow left to right.
    Horizontal,
    /// Children flow top to bottom.
    #[default]
    Vertical,
}

impl Orientation {
    /// The primary (flow) axis.
    pub fn primary(self) -> Axis {
        match self {
            Self::Horizontal => Axis::X,
            Self::Vertical => Axis::Y,
        }
    }

    /// The secondary (cross) axis.
    pub fn secondary(self) -> Axis {
        self.primary().other()
    }
}

/// Content overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Overflow {
    /// Children may draw outside the widget.
    #[default]
    Visible,
    /// Children are clipped to the content area.
    Hidden,
    /// Children are clipped and may be scrolled.
    Scroll,
}

impl Overflow {
    /// True if descendants are clipped to this widget's content area.
    pub fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

/// Whether fixed and percentage sizes include padding and margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BoxSizing {
    /// Sizes denote the content extent; insets are added on top.
    ContentBox,
    /// Sizes denote the outer extent.
    #[default]
    BorderBox,
}

/// Child alignment along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Align {
    /// Leading edge.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Trailing edge.
    End,
    /// Leading edge, and on the secondary axis fill the container.
    Stretch,
}

/// How a widget's position is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PositionType {
    /// Placed by the parent's layout.
    #[default]
    Static,
    /// Placed by the parent's layout, then shifted by offsets.
    Relative,
    /// Removed from the parent's flow and placed by offsets.
    Absolute,
    /// Removed from the parent's flow and placed externally.
    Dynamic,
}

impl PositionType {
    /// True if the widget does not take part in its parent's flow.
    pub fn removed_from_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Dynamic)
    }
}

/// Optional per-side offsets.
pub type Offsets = Edges<Option<Length>>;
