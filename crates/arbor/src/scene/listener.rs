//! Hooks the commit phase notifies.

use std::collections::HashMap;

use geom::{Point, Rect};

use crate::id::WidgetId;

/// Observer of a widget's content area.
pub trait LayoutListener {
    /// Called before a new content area is written to the widget. Both
    /// rectangles are in the parent's coordinate space.
    fn on_before_content_area_changed(&mut self, widget: WidgetId, old: Rect, new: Rect);
}

/// Render-side state bound to a widget's bounds.
pub trait Drawable {
    /// Re-bind to new screen-space bounds.
    fn rebind(&mut self, widget: WidgetId, bounds: Rect);
}

/// Spatial lookup of visible widgets, kept in sync by the commit phase.
pub trait SpatialIndex {
    /// Insert or move a widget.
    fn insert(&mut self, widget: WidgetId, bounds: Rect);

    /// Remove a widget. Removing an absent widget is a no-op.
    fn remove(&mut self, widget: WidgetId);

    /// Screen-space bounds of an indexed widget.
    fn bounds(&self, widget: WidgetId) -> Option<Rect>;

    /// Widgets whose bounds contain a point.
    fn locate(&self, point: Point) -> Vec<WidgetId>;
}

/// A flat spatial index. Adequate for the widget counts a virtualized window
/// keeps alive.
#[derive(Debug, Default)]
pub struct BoundsIndex {
    /// Bounds by widget.
    entries: HashMap<WidgetId, Rect>,
}

impl BoundsIndex {
    /// Number of indexed widgets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SpatialIndex for BoundsIndex {
    fn insert(&mut self, widget: WidgetId, bounds: Rect) {
        self.entries.insert(widget, bounds);
    }

    fn remove(&mut self, widget: WidgetId) {
        self.entries.remove(&widget);
    }

    fn bounds(&self, widget: WidgetId) -> Option<Rect> {
        self.entries.get(&widget).copied()
    }

    fn locate(&self, point: Point) -> Vec<WidgetId> {
        self.entries
            .iter()
            .filter(|(_, r)| r.contains_point(point))
            .map(|(id, _)| *id)
            .collect()
    }
}
