//! Writing finished records back onto the scene.

use std::collections::HashSet;

use geom::{Axis, Point, Rect};
use tracing::trace;

use super::LayoutPass;
use crate::{
    id::WidgetId,
    scene::{LayoutChanges, content_rect},
    style::{Overflow, StyleAccessor, StyleValue, StyleValueId},
};

impl LayoutPass<'_> {
    /// Commit every record in arena order. Parents precede children, so each
    /// record's screen origin is known when its children are reached.
    pub(super) fn commit(&mut self, root: WidgetId) {
        let (origin, clip) = self.container_frame(root);
        let n = self.records.len();
        let mut origins = vec![origin; n];
        let mut clips = vec![clip; n];
        let mut seen = HashSet::with_capacity(n);
        let notify_insets = self.scene.config.notify_padding_changes;

        for i in 1..n {
            let rec = &self.records[i];
            let parent = &self.records[rec.parent];
            let scroll = if rec.in_flow() {
                parent.scroll
            } else {
                Point::zero()
            };
            let local = rec.position + rec.offset + parent.insets().origin() - scroll;
            let screen_rect = Rect::from_parts(origins[rec.parent] + local, rec.size);
            origins[i] = screen_rect.tl;
            let insets = rec.insets();
            let parent_clip = clips[rec.parent];
            clips[i] = if rec.style.overflow.clips() {
                parent_clip.and_then(|c| c.intersect(&content_rect(screen_rect, insets)))
            } else {
                parent_clip
            };
            let visible = !screen_rect.is_empty()
                && parent_clip.is_some_and(|c| c.intersect(&screen_rect).is_some());
            let (size, padding, margin) = (rec.size, rec.padding, rec.margin);

            let Some(widget) = rec.widget else {
                continue;
            };
            seen.insert(widget);
            let Some(node) = self.scene.nodes.get_mut(widget) else {
                continue;
            };
            let changes = if node.laid_out {
                let mut c = LayoutChanges::default();
                for a in Axis::BOTH {
                    c.position[a.index()] = node.position.get(a) != local.get(a);
                    c.size[a.index()] = node.size.get(a) != size.get(a);
                }
                c.insets = node.padding != padding || node.margin != margin;
                c
            } else {
                LayoutChanges::all()
            };
            let moved = node.screen_rect != screen_rect;

            let resized = changes.size.iter().any(|c| *c);
            if resized || (changes.insets && notify_insets) {
                let old = node.content_rect();
                let new = content_rect(Rect::from_parts(local, size), insets);
                if let Some(listener) = node.listener.as_mut() {
                    listener.on_before_content_area_changed(widget, old, new);
                }
            }

            node.position = local;
            node.size = size;
            node.padding = padding;
            node.margin = margin;
            node.screen_rect = screen_rect;
            node.changes = changes;
            node.laid_out = true;
            if moved || changes.bounds_changed() {
                trace!(?widget, ?screen_rect, "bounds changed");
                if let Some(drawable) = node.drawable.as_mut() {
                    drawable.rebind(widget, screen_rect);
                }
            }
            if visible {
                self.scene.spatial.insert(widget, screen_rect);
            } else {
                self.scene.spatial.remove(widget);
            }
            self.commit_controller(i, widget);
        }

        for id in self.scene.subtree_pre_order(root) {
            if !seen.contains(&id) {
                self.scene.spatial.remove(id);
            }
        }
    }

    /// Refresh a container's controller from its committed children:
    /// viewport, content extent and measured item extent. A controller whose
    /// scroll had to be pulled back into range queues another pass.
    fn commit_controller(&mut self, index: usize, widget: WidgetId) {
        let rec = &self.records[index];
        let primary = rec.style.primary();
        let viewport = rec.content(primary);
        let mut flow = rec
            .children
            .iter()
            .map(|c| &self.records[*c])
            .filter(|c| c.in_flow());
        let first = flow.next().map(|c| c.size.get(primary));
        let content_extent = rec
            .children
            .iter()
            .map(|c| &self.records[*c])
            .filter(|c| c.in_flow())
            .map(|c| c.end(primary))
            .max()
            .unwrap_or(0);
        let Some(ctl) = self
            .scene
            .nodes
            .get_mut(widget)
            .and_then(|n| n.controller.as_mut())
        else {
            return;
        };
        ctl.viewport = viewport;
        ctl.content_extent = content_extent;
        if ctl.bound
            && let Some(first) = first
        {
            ctl.measured_extent = Some(first + ctl.gap);
        }
        if ctl.reclamp() {
            trace!(?widget, vpos = ctl.virtual_scroll_position, "scroll reclamped");
            self.scene.queue_recalculation(widget);
        }
    }

    /// Screen origin and clip rectangle of whatever contains the root.
    fn container_frame(&self, root: WidgetId) -> (Point, Option<Rect>) {
        let screen = self.scene.screen.rect();
        let Some(parent) = self.scene.parent(root) else {
            return (Point::zero(), Some(screen));
        };
        let origin = self
            .scene
            .nodes
            .get(parent)
            .map(|n| n.screen_rect.tl)
            .unwrap_or_default();
        let mut clip = Some(screen);
        let mut current = Some(parent);
        while let Some(id) = current {
            let Some(node) = self.scene.nodes.get(id) else {
                break;
            };
            let ctx = self.scene.modifier_context(id);
            let clips = matches!(
                self.scene.style_value(id, StyleValueId::Overflow, &ctx),
                Some(StyleValue::Overflow(o)) if o != Overflow::Visible
            );
            if clips {
                let content = content_rect(node.screen_rect, node.padding.plus(&node.margin));
                clip = clip.and_then(|c| c.intersect(&content));
            }
            current = node.parent;
        }
        (origin, clip)
    }
}
