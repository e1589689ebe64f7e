//! Per-pass layout records and their resolution flags.

use geom::{Axis, Edges, Expanse, Point};

use crate::{
    id::WidgetId,
    style::{
        Align, BoxSizing, LayoutType, Length, Offsets, Orientation, Overflow, PositionType,
        SizeValue, StyleAccessor, StyleValue, StyleValueId,
    },
};

/// Resolution flags along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct AxisState {
    /// The record's own base size is resolved.
    pub size: bool,
    /// The record's own offset is resolved.
    pub position: bool,
    /// The parent's grow step has finished with this record.
    pub grown_by_parent: bool,
    /// This record's grow step has finished.
    pub grown_children: bool,
    /// This record has placed all of its in-flow children.
    pub positioned_children: bool,
    /// The parent has placed this record.
    pub positioned_by_parent: bool,
}

impl AxisState {
    /// Every flag set.
    pub const DONE: Self = Self {
        size: true,
        position: true,
        grown_by_parent: true,
        grown_children: true,
        positioned_children: true,
        positioned_by_parent: true,
    };

    /// Size will not change again.
    pub fn settled(self) -> bool {
        self.size && self.grown_by_parent
    }
}

/// All resolution flags of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct RecordState {
    /// Flags per axis, indexed by [`Axis::index`].
    pub axes: [AxisState; 2],
    /// Data-bound children have been spawned, or there are none to spawn.
    pub spawned_dynamic_children: bool,
    /// The record carries a flex or grid controller.
    pub dynamic_layout: bool,
    /// The record does not take part in its parent's flow.
    pub removed_from_parent_layout: bool,
}

impl RecordState {
    /// A state with every completion flag set.
    pub fn done() -> Self {
        Self {
            axes: [AxisState::DONE; 2],
            spawned_dynamic_children: true,
            dynamic_layout: false,
            removed_from_parent_layout: false,
        }
    }

    /// Flags along an axis.
    pub fn axis(&self, axis: Axis) -> AxisState {
        self.axes[axis.index()]
    }

    /// Flags along an axis, mutably.
    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        &mut self.axes[axis.index()]
    }

    /// True when nothing remains to resolve.
    pub fn is_final(&self) -> bool {
        self.spawned_dynamic_children && self.axes.iter().all(|a| *a == AxisState::DONE)
    }

    /// Undo a container's grow and placement steps so they run again over
    /// newly spawned children. Size and position flags are never cleared.
    pub fn clear_flags(&mut self) {
        for a in &mut self.axes {
            a.grown_children = false;
            a.positioned_children = false;
        }
    }
}

/// Style values captured once per record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(super) struct RecordStyle {
    /// Child arrangement.
    pub layout: LayoutType,
    /// Flow direction.
    pub orientation: Orientation,
    /// Preferred size per axis.
    pub preferred: [SizeValue; 2],
    /// Minimum size per axis.
    pub min: [SizeValue; 2],
    /// Maximum size per axis.
    pub max: [SizeValue; 2],
    /// Padding.
    pub padding: Edges<Length>,
    /// Margin.
    pub margin: Edges<Length>,
    /// Gap between children.
    pub gap: Length,
    /// Growth factor.
    pub grow: f32,
    /// Shrink factor.
    pub shrink: f32,
    /// Default primary alignment of children.
    pub primary_align: Align,
    /// Default secondary alignment of children.
    pub secondary_align: Align,
    /// Own primary alignment override.
    pub self_align: Option<Align>,
    /// Own secondary alignment override.
    pub self_cross_align: Option<Align>,
    /// Overflow behavior.
    pub overflow: Overflow,
    /// Box sizing mode.
    pub box_sizing: BoxSizing,
    /// Position type.
    pub position: PositionType,
    /// Offsets for relative and absolute positioning.
    pub offsets: Offsets,
}

impl RecordStyle {
    /// Read every layout-relevant value for a widget.
    pub fn capture(styles: &impl StyleAccessor, widget: WidgetId) -> Self {
        let ctx = styles.modifier_context(widget);
        let get = |id| styles.style_value(widget, id, &ctx);
        let size = |id, default| match get(id) {
            Some(StyleValue::Size(v)) => v,
            _ => default,
        };
        let edges = |id| match get(id) {
            Some(StyleValue::Edges(e)) => e,
            _ => Edges::default(),
        };
        let length = |id| match get(id) {
            Some(StyleValue::Length(l)) => Some(l),
            _ => None,
        };
        let factor = |id| match get(id) {
            Some(StyleValue::Factor(f)) if f.is_finite() => f.max(0.0),
            _ => 0.0,
        };
        let align = |id| match get(id) {
            Some(StyleValue::Align(a)) => Some(a),
            _ => None,
        };
        Self {
            layout: match get(StyleValueId::LayoutType) {
                Some(StyleValue::Layout(l)) => l,
                _ => LayoutType::default(),
            },
            orientation: match get(StyleValueId::Orientation) {
                Some(StyleValue::Orientation(o)) => o,
                _ => Orientation::default(),
            },
            preferred: [
                size(StyleValueId::Width, SizeValue::Auto),
                size(StyleValueId::Height, SizeValue::Auto),
            ],
            min: [
                size(StyleValueId::MinWidth, SizeValue::Unconstrained),
                size(StyleValueId::MinHeight, SizeValue::Unconstrained),
            ],
            max: [
                size(StyleValueId::MaxWidth, SizeValue::Unconstrained),
                size(StyleValueId::MaxHeight, SizeValue::Unconstrained),
            ],
            padding: edges(StyleValueId::Padding),
            margin: edges(StyleValueId::Margin),
            gap: length(StyleValueId::Gap).unwrap_or_default(),
            grow: factor(StyleValueId::Grow),
            shrink: factor(StyleValueId::Shrink),
            primary_align: align(StyleValueId::PrimaryAlign).unwrap_or_default(),
            secondary_align: align(StyleValueId::SecondaryAlign).unwrap_or_default(),
            self_align: align(StyleValueId::SelfAlign),
            self_cross_align: align(StyleValueId::SelfCrossAlign),
            overflow: match get(StyleValueId::Overflow) {
                Some(StyleValue::Overflow(o)) => o,
                _ => Overflow::default(),
            },
            box_sizing: match get(StyleValueId::BoxSizing) {
                Some(StyleValue::BoxSizing(b)) => b,
                _ => BoxSizing::default(),
            },
            position: match get(StyleValueId::Position) {
                Some(StyleValue::Position(p)) => p,
                _ => PositionType::default(),
            },
            offsets: Offsets {
                left: length(StyleValueId::Left),
                top: length(StyleValueId::Top),
                right: length(StyleValueId::Right),
                bottom: length(StyleValueId::Bottom),
            },
        }
    }

    /// Flow axis.
    pub fn primary(&self) -> Axis {
        self.orientation.primary()
    }

    /// Preferred size along an axis.
    pub fn preferred(&self, axis: Axis) -> SizeValue {
        self.preferred[axis.index()]
    }

    /// True if the preferred size along an axis is fit-content.
    pub fn fits_content(&self, axis: Axis) -> bool {
        self.preferred(axis) == SizeValue::FitContent
    }

    /// Primary alignment this container applies to a child.
    pub fn child_primary_align(&self, child: &Self) -> Align {
        match self.layout {
            LayoutType::Flex if !self.fits_content(self.primary()) => {
                child.self_align.unwrap_or(self.primary_align)
            }
            _ => Align::Start,
        }
    }

    /// Secondary alignment this container applies to a child. Stretch needs a
    /// container extent, so it degrades to start inside a fit-content axis.
    pub fn child_secondary_align(&self, child: &Self) -> Align {
        match self.layout {
            LayoutType::Flex => {
                let a = child.self_cross_align.unwrap_or(self.secondary_align);
                if a == Align::Stretch && self.fits_content(self.primary().other()) {
                    Align::Start
                } else {
                    a
                }
            }
            _ => Align::Start,
        }
    }
}

/// One widget's layout state for a single pass.
#[derive(Debug, Clone)]
pub(super) struct LayoutRecord {
    /// Widget the record lays out. `None` for the sentinel.
    pub widget: Option<WidgetId>,
    /// Parent record index.
    pub parent: usize,
    /// Child record indices in widget order.
    pub children: Vec<usize>,
    /// Flow position inside the parent's content area.
    pub position: Point,
    /// Relative or absolute offset added to the flow position.
    pub offset: Point,
    /// Outer size, margin included.
    pub size: Expanse,
    /// Resolved minimum per axis.
    pub min: [Option<i32>; 2],
    /// Resolved maximum per axis.
    pub max: [Option<i32>; 2],
    /// Resolved padding.
    pub padding: Edges<i32>,
    /// Resolved margin.
    pub margin: Edges<i32>,
    /// Insets resolved per axis.
    pub insets_resolved: [bool; 2],
    /// Size per axis is assigned by the parent's grow step.
    pub grows: [bool; 2],
    /// Physical scroll applied to in-flow children.
    pub scroll: Point,
    /// Resolution flags.
    pub state: RecordState,
    /// Captured style.
    pub style: RecordStyle,
}

impl LayoutRecord {
    /// Construct an unresolved record.
    pub fn new(widget: Option<WidgetId>, parent: usize, style: RecordStyle) -> Self {
        Self {
            widget,
            parent,
            children: Vec::new(),
            position: Point::zero(),
            offset: Point::zero(),
            size: Expanse::default(),
            min: [None; 2],
            max: [None; 2],
            padding: Edges::default(),
            margin: Edges::default(),
            insets_resolved: [false; 2],
            grows: [false; 2],
            scroll: Point::zero(),
            state: RecordState::default(),
            style,
        }
    }

    /// Padding plus margin.
    pub fn insets(&self) -> Edges<i32> {
        self.padding.plus(&self.margin)
    }

    /// Content extent along an axis.
    pub fn content(&self, axis: Axis) -> i32 {
        (self.size.get(axis) - self.insets().along(axis)).max(0)
    }

    /// Flow end along an axis.
    pub fn end(&self, axis: Axis) -> i32 {
        self.position.get(axis) + self.size.get(axis)
    }

    /// True if the record takes part in its parent's flow.
    pub fn in_flow(&self) -> bool {
        !self.state.removed_from_parent_layout
    }
}

/// Clamp a value to optional bounds. When min exceeds max, max wins.
pub(super) fn clamp_axis(value: i32, min: Option<i32>, max: Option<i32>) -> i32 {
    let mut value = value;
    if let Some(min) = min {
        value = value.max(min);
    }
    if let Some(max) = max {
        value = value.min(max);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_wins_over_min() {
        assert_eq!(clamp_axis(5, Some(10), Some(8)), 8);
        assert_eq!(clamp_axis(5, Some(10), None), 10);
        assert_eq!(clamp_axis(50, None, Some(8)), 8);
        assert_eq!(clamp_axis(-3, None, None), -3);
    }

    #[test]
    fn clear_flags_keeps_size_and_position() {
        let mut s = RecordState::done();
        s.clear_flags();
        assert!(!s.is_final());
        for a in Axis::BOTH {
            let st = s.axis(a);
            assert!(st.size && st.position && st.settled());
            assert!(!st.grown_children && !st.positioned_children);
        }
    }

    #[test]
    fn stretch_degrades_in_fit_content_axis() {
        let mut parent = RecordStyle {
            layout: LayoutType::Flex,
            secondary_align: Align::Stretch,
            ..RecordStyle::default()
        };
        let child = RecordStyle::default();
        assert_eq!(parent.child_secondary_align(&child), Align::Stretch);
        parent.preferred = [SizeValue::FitContent, SizeValue::Auto];
        assert_eq!(parent.child_secondary_align(&child), Align::Start);

        parent.primary_align = Align::End;
        assert_eq!(parent.child_primary_align(&child), Align::End);
        parent.preferred = [SizeValue::Auto, SizeValue::FitContent];
        assert_eq!(parent.child_primary_align(&child), Align::Start);
    }
}
