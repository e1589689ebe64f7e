//! Style values and the accessor contract the layout engine reads them through.
//!
//! The style cascade lives outside this crate. What arrives here is a list of
//! rules per widget, each gated on a set of modifiers (hover, pressed, ...).
//! The engine asks for one value at a time through [`StyleAccessor`], with a
//! [`ModifierContext`] computed once per widget per pass.

/// Style value types.
mod value;

use geom::Edges;
use serde::{Deserialize, Serialize};
pub use value::{
    Align, BoxSizing, LayoutType, Length, Offsets, Orientation, Overflow, PositionType, SizeValue,
};
pub(crate) use value::percent_of;

use crate::id::WidgetId;

/// Bitset of active widget modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers(u32);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Pointer is over the widget.
    pub const HOVER: Self = Self(1);
    /// Widget is being pressed.
    pub const PRESSED: Self = Self(1 << 1);
    /// Widget has input focus.
    pub const FOCUSED: Self = Self(1 << 2);
    /// Widget is disabled.
    pub const DISABLED: Self = Self(1 << 3);
    /// Widget is selected.
    pub const SELECTED: Self = Self(1 << 4);

    /// Raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// True if every modifier in `other` is also set here.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two sets.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Remove modifiers.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Number of modifiers set.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Identifies one style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleValueId {
    /// [`LayoutType`].
    LayoutType,
    /// [`Orientation`].
    Orientation,
    /// Preferred width.
    Width,
    /// Preferred height.
    Height,
    /// Minimum width.
    MinWidth,
    /// Minimum height.
    MinHeight,
    /// Maximum width.
    MaxWidth,
    /// Maximum height.
    MaxHeight,
    /// Padding edges.
    Padding,
    /// Margin edges.
    Margin,
    /// Gap between children.
    Gap,
    /// Flex growth factor.
    Grow,
    /// Flex shrink factor.
    Shrink,
    /// Default child alignment along the primary axis.
    PrimaryAlign,
    /// Default child alignment along the secondary axis.
    SecondaryAlign,
    /// Per-widget primary-axis alignment override used by the parent.
    SelfAlign,
    /// Per-widget secondary-axis alignment override used by the parent.
    SelfCrossAlign,
    /// [`Overflow`].
    Overflow,
    /// [`BoxSizing`].
    BoxSizing,
    /// [`PositionType`].
    Position,
    /// Left offset.
    Left,
    /// Top offset.
    Top,
    /// Right offset.
    Right,
    /// Bottom offset.
    Bottom,
}

/// A single resolved style value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StyleValue {
    /// A layout type.
    Layout(LayoutType),
    /// An orientation.
    Orientation(Orientation),
    /// A size expression.
    Size(SizeValue),
    /// Per-side lengths.
    Edges(Edges<Length>),
    /// A single length.
    Length(Length),
    /// A growth or shrink factor.
    Factor(f32),
    /// An alignment.
    Align(Align),
    /// Overflow behavior.
    Overflow(Overflow),
    /// Box sizing mode.
    BoxSizing(BoxSizing),
    /// Position type.
    Position(PositionType),
}

/// A set of values that applies when all of its modifiers are active.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleRule {
    /// Modifiers required for the rule to match.
    pub modifiers: Modifiers,
    /// Values declared by the rule.
    pub values: Vec<(StyleValueId, StyleValue)>,
}

/// Per-widget style declarations: a base rule plus modifier variants.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Style {
    /// Rules in declaration order. Rule 0 is the unconditional base rule.
    rules: Vec<StyleRule>,
}

/// Rules matching a widget's active modifiers, least specific first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifierContext {
    /// Indices into the widget's rules.
    matching: Vec<usize>,
}

impl Style {
    /// Set a value on the base rule, replacing any earlier declaration.
    pub fn set(mut self, id: StyleValueId, value: StyleValue) -> Self {
        if self.rules.is_empty() {
            self.rules.push(StyleRule::default());
        }
        let base = &mut self.rules[0];
        base.values.retain(|(i, _)| *i != id);
        base.values.push((id, value));
        self
    }

    /// Add a variant that applies when `modifiers` are all active.
    pub fn variant(mut self, modifiers: Modifiers, variant: Self) -> Self {
        if self.rules.is_empty() {
            self.rules.push(StyleRule::default());
        }
        let values = variant.rules.into_iter().flat_map(|r| r.values).collect();
        self.rules.push(StyleRule { modifiers, values });
        self
    }

    /// Compute the matching-rule context for a set of active modifiers.
    pub fn context(&self, active: Modifiers) -> ModifierContext {
        let mut matching: Vec<usize> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| active.contains(r.modifiers))
            .map(|(i, _)| i)
            .collect();
        // Stable: equally specific rules keep declaration order.
        matching.sort_by_key(|i| self.rules[*i].modifiers.count());
        ModifierContext { matching }
    }

    /// Look up a value, most specific matching rule first.
    pub fn lookup(&self, id: StyleValueId, ctx: &ModifierContext) -> Option<StyleValue> {
        ctx.matching.iter().rev().find_map(|ri| {
            self.rules.get(*ri).and_then(|rule| {
                rule.values
                    .iter()
                    .rev()
                    .find(|(i, _)| *i == id)
                    .map(|(_, v)| *v)
            })
        })
    }

    /// Layout type.
    pub fn layout(self, t: LayoutType) -> Self {
        self.set(StyleValueId::LayoutType, StyleValue::Layout(t))
    }

    /// Flex layout with an orientation.
    pub fn flex(self, o: Orientation) -> Self {
        self.layout(LayoutType::Flex).orientation(o)
    }

    /// Grid layout with a scroll orientation.
    pub fn grid(self, o: Orientation) -> Self {
        self.layout(LayoutType::Grid).orientation(o)
    }

    /// Block layout with an orientation.
    pub fn block(self, o: Orientation) -> Self {
        self.layout(LayoutType::Block).orientation(o)
    }

    /// Orientation.
    pub fn orientation(self, o: Orientation) -> Self {
        self.set(StyleValueId::Orientation, StyleValue::Orientation(o))
    }

    /// Preferred width.
    pub fn width(self, v: SizeValue) -> Self {
        self.set(StyleValueId::Width, StyleValue::Size(v))
    }

    /// Preferred height.
    pub fn height(self, v: SizeValue) -> Self {
        self.set(StyleValueId::Height, StyleValue::Size(v))
    }

    /// Fixed preferred width and height.
    pub fn fixed(self, w: i32, h: i32) -> Self {
        self.width(SizeValue::Fixed(w)).height(SizeValue::Fixed(h))
    }

    /// Minimum width.
    pub fn min_width(self, v: SizeValue) -> Self {
        self.set(StyleValueId::MinWidth, StyleValue::Size(v))
    }

    /// Minimum height.
    pub fn min_height(self, v: SizeValue) -> Self {
        self.set(StyleValueId::MinHeight, StyleValue::Size(v))
    }

    /// Maximum width.
    pub fn max_width(self, v: SizeValue) -> Self {
        self.set(StyleValueId::MaxWidth, StyleValue::Size(v))
    }

    /// Maximum height.
    pub fn max_height(self, v: SizeValue) -> Self {
        self.set(StyleValueId::MaxHeight, StyleValue::Size(v))
    }

    /// Padding on every side.
    pub fn padding(self, e: Edges<Length>) -> Self {
        self.set(StyleValueId::Padding, StyleValue::Edges(e))
    }

    /// Margin on every side.
    pub fn margin(self, e: Edges<Length>) -> Self {
        self.set(StyleValueId::Margin, StyleValue::Edges(e))
    }

    /// Gap between children.
    pub fn gap(self, l: Length) -> Self {
        self.set(StyleValueId::Gap, StyleValue::Length(l))
    }

    /// Growth factor.
    pub fn grow(self, f: f32) -> Self {
        self.set(StyleValueId::Grow, StyleValue::Factor(f))
    }

    /// Shrink factor.
    pub fn shrink(self, f: f32) -> Self {
        self.set(StyleValueId::Shrink, StyleValue::Factor(f))
    }

    /// Default primary-axis alignment of children.
    pub fn primary_align(self, a: Align) -> Self {
        self.set(StyleValueId::PrimaryAlign, StyleValue::Align(a))
    }

    /// Default secondary-axis alignment of children.
    pub fn secondary_align(self, a: Align) -> Self {
        self.set(StyleValueId::SecondaryAlign, StyleValue::Align(a))
    }

    /// Primary-axis alignment override applied by the parent to this widget.
    pub fn self_align(self, a: Align) -> Self {
        self.set(StyleValueId::SelfAlign, StyleValue::Align(a))
    }

    /// Secondary-axis alignment override applied by the parent to this widget.
    pub fn self_cross_align(self, a: Align) -> Self {
        self.set(StyleValueId::SelfCrossAlign, StyleValue::Align(a))
    }

    /// Overflow behavior.
    pub fn overflow(self, o: Overflow) -> Self {
        self.set(StyleValueId::Overflow, StyleValue::Overflow(o))
    }

    /// Box sizing mode.
    pub fn box_sizing(self, b: BoxSizing) -> Self {
        self.set(StyleValueId::BoxSizing, StyleValue::BoxSizing(b))
    }

    /// Position type.
    pub fn position(self, p: PositionType) -> Self {
        self.set(StyleValueId::Position, StyleValue::Position(p))
    }

    /// Left offset.
    pub fn left(self, l: Length) -> Self {
        self.set(StyleValueId::Left, StyleValue::Length(l))
    }

    /// Top offset.
    pub fn top(self, l: Length) -> Self {
        self.set(StyleValueId::Top, StyleValue::Length(l))
    }

    /// Right offset.
    pub fn right(self, l: Length) -> Self {
        self.set(StyleValueId::Right, StyleValue::Length(l))
    }

    /// Bottom offset.
    pub fn bottom(self, l: Length) -> Self {
        self.set(StyleValueId::Bottom, StyleValue::Length(l))
    }
}

/// Read access to per-widget style values.
pub trait StyleAccessor {
    /// Compute the modifier-matching context for a widget. Called once per
    /// widget per pass.
    fn modifier_context(&self, widget: WidgetId) -> ModifierContext;

    /// Look up one style value for a widget.
    fn style_value(
        &self,
        widget: WidgetId,
        id: StyleValueId,
        ctx: &ModifierContext,
    ) -> Option<StyleValue>;
}
