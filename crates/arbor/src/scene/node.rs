use std::{fmt, sync::Arc};

use geom::{Axis, Edges, Expanse, Point, Rect};

use super::listener::{Drawable, LayoutListener};
use crate::{
    controller::LayoutController,
    data::{DataSource, Filter, Row, SortKey},
    id::{TemplateId, WidgetId},
    style::{Modifiers, Style},
};

/// Per-axis change flags from the last commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutChanges {
    /// Position changed, indexed by [`Axis::index`].
    pub position: [bool; 2],
    /// Size changed, indexed by [`Axis::index`].
    pub size: [bool; 2],
    /// Padding or margin changed.
    pub insets: bool,
}

impl LayoutChanges {
    /// Changes recorded for a widget committed for the first time.
    pub(crate) fn all() -> Self {
        Self {
            position: [true; 2],
            size: [true; 2],
            insets: true,
        }
    }

    /// True if position or size changed along any axis.
    pub fn bounds_changed(&self) -> bool {
        self.position.iter().chain(self.size.iter()).any(|c| *c)
    }

    /// True if the size changed along an axis.
    pub fn size_changed(&self, axis: Axis) -> bool {
        self.size[axis.index()]
    }
}

/// A data source bound to a flex or grid widget, with the template its items
/// are cloned from.
#[derive(Clone)]
pub struct DataBinding {
    /// Row provider.
    pub source: Arc<dyn DataSource>,
    /// Item template.
    pub template: TemplateId,
    /// Active filter.
    pub filter: Option<Filter>,
    /// Active sort.
    pub sort: Option<SortKey>,
}

impl fmt::Debug for DataBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBinding")
            .field("source", &self.source.id())
            .field("template", &self.template)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .finish()
    }
}

/// Widget data stored in the scene arena.
pub struct Node {
    /// Widget name, used in dumps.
    pub(crate) name: String,
    /// Parent in the arena tree.
    pub(crate) parent: Option<WidgetId>,
    /// Children in the arena tree.
    pub(crate) children: Vec<WidgetId>,

    /// Style declarations.
    pub(crate) style: Style,
    /// Active style modifiers.
    pub(crate) modifiers: Modifiers,
    /// Hidden widgets and their subtrees are skipped by layout.
    pub(crate) hidden: bool,
    /// Externally driven position for dynamic positioning.
    pub(crate) dynamic_position: Point,

    /// Committed outer position relative to the parent's outer origin.
    pub(crate) position: Point,
    /// Committed outer size, margin included.
    pub(crate) size: Expanse,
    /// Committed padding.
    pub(crate) padding: Edges<i32>,
    /// Committed margin.
    pub(crate) margin: Edges<i32>,
    /// Committed outer rectangle in screen space.
    pub(crate) screen_rect: Rect,
    /// Change flags from the last commit.
    pub(crate) changes: LayoutChanges,
    /// Whether the widget has been committed at least once.
    pub(crate) laid_out: bool,

    /// Bound data source, for flex and grid containers.
    pub(crate) binding: Option<DataBinding>,
    /// Scroll and virtualization state, for flex and grid containers.
    pub(crate) controller: Option<LayoutController>,
    /// Index in the parent's view order this item widget currently shows.
    pub(crate) data_index: Option<usize>,
    /// Row pushed into this item widget.
    pub(crate) data: Option<Row>,

    /// Content area observer.
    pub(crate) listener: Option<Box<dyn LayoutListener>>,
    /// Render-side state.
    pub(crate) drawable: Option<Box<dyn Drawable>>,
}

impl Node {
    /// Construct a detached node.
    pub(crate) fn new(name: &str, style: Style) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            style,
            modifiers: Modifiers::NONE,
            hidden: false,
            dynamic_position: Point::zero(),
            position: Point::zero(),
            size: Expanse::default(),
            padding: Edges::default(),
            margin: Edges::default(),
            screen_rect: Rect::default(),
            changes: LayoutChanges::default(),
            laid_out: false,
            binding: None,
            controller: None,
            data_index: None,
            data: None,
            listener: None,
            drawable: None,
        }
    }

    /// Widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent widget, if attached.
    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Child widgets in layout order.
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    /// Style declarations.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// True if the widget is hidden.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Outer position relative to the parent's outer origin.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Outer size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Outer rectangle relative to the parent's outer origin.
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Padding resolved at the last commit.
    pub fn padding(&self) -> Edges<i32> {
        self.padding
    }

    /// Margin resolved at the last commit.
    pub fn margin(&self) -> Edges<i32> {
        self.margin
    }

    /// Outer rectangle in screen space.
    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    /// Content rectangle relative to the parent's outer origin.
    pub fn content_rect(&self) -> Rect {
        content_rect(self.rect(), self.padding.plus(&self.margin))
    }

    /// Change flags from the last commit.
    pub fn changes(&self) -> LayoutChanges {
        self.changes
    }

    /// True once the widget has been committed.
    pub fn laid_out(&self) -> bool {
        self.laid_out
    }

    /// Scroll controller, for flex and grid widgets.
    pub fn controller(&self) -> Option<&LayoutController> {
        self.controller.as_ref()
    }

    /// View-order index of the item this widget shows.
    pub fn data_index(&self) -> Option<usize> {
        self.data_index
    }

    /// Row bound into this widget.
    pub fn data(&self) -> Option<&Row> {
        self.data.as_ref()
    }
}

/// Shrink an outer rectangle by insets, never below zero size.
pub(crate) fn content_rect(outer: Rect, insets: Edges<i32>) -> Rect {
    Rect::from_parts(
        outer.tl + insets.origin(),
        Expanse::new(
            (outer.w - insets.along(Axis::X)).max(0),
            (outer.h - insets.along(Axis::Y)).max(0),
        ),
    )
}
