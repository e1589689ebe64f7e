//! Own-size resolution.

use geom::Axis;
use tracing::trace;

use super::{LayoutPass, record::clamp_axis};
use crate::style::{BoxSizing, LayoutType, Length, SizeValue, percent_of};

impl LayoutPass<'_> {
    /// Resolve padding and margin along an axis. Percentage sides wait for
    /// the parent's available content.
    pub(super) fn resolve_insets(&mut self, index: usize, axis: Axis) {
        let rec = &self.records[index];
        if rec.insets_resolved[axis.index()] {
            return;
        }
        let (padding, margin) = (rec.style.padding, rec.style.margin);
        let sides = [
            padding.start(axis),
            padding.end(axis),
            margin.start(axis),
            margin.end(axis),
        ];
        let base = if sides.iter().any(|l| l.is_relative()) {
            match self.available_content(rec.parent, axis) {
                Some(b) => b,
                None => return,
            }
        } else {
            0
        };
        let resolve = |l: Length| l.resolve(base);
        let rec = &mut self.records[index];
        rec.padding.set_start(axis, resolve(sides[0]));
        rec.padding.set_end(axis, resolve(sides[1]));
        rec.margin.set_start(axis, resolve(sides[2]));
        rec.margin.set_end(axis, resolve(sides[3]));
        rec.insets_resolved[axis.index()] = true;
        self.advance();
    }

    /// Resolve a record's base size along an axis, clamped to its bounds.
    pub(super) fn try_resolve_size(&mut self, index: usize, axis: Axis) {
        self.resolve_insets(index, axis);
        let rec = &self.records[index];
        let a = axis.index();
        if rec.state.axis(axis).size || !rec.insets_resolved[a] {
            return;
        }
        let extra = match rec.style.box_sizing {
            BoxSizing::ContentBox => rec.insets().along(axis),
            BoxSizing::BorderBox => 0,
        };
        let Some(min) = self.resolve_bound(index, axis, rec.style.min[a], extra) else {
            return;
        };
        let Some(max) = self.resolve_bound(index, axis, rec.style.max[a], extra) else {
            return;
        };
        let value = match rec.style.preferred(axis) {
            SizeValue::Fixed(v) => v + extra,
            SizeValue::Percent(p) => match self.available_content(rec.parent, axis) {
                Some(c) => percent_of(c, p) + extra,
                None => return,
            },
            SizeValue::Auto if rec.grows[a] => 0,
            SizeValue::Auto => match self.available_content(rec.parent, axis) {
                Some(c) => c,
                None => return,
            },
            SizeValue::FitContent => match self.fit_content(index, axis) {
                Some(v) => v,
                None => return,
            },
            SizeValue::Unconstrained => 0,
        };
        let size = clamp_axis(value, min, max).max(0);
        let rec = &mut self.records[index];
        rec.min[a] = min;
        rec.max[a] = max;
        rec.size.set(axis, size);
        rec.state.axis_mut(axis).size = true;
        trace!(widget = ?rec.widget, ?axis, size, "size resolved");
        self.advance();
    }

    /// Resolve a min or max bound. The outer `None` means the bound is not
    /// resolvable yet; the inner `None` means there is no bound.
    fn resolve_bound(
        &self,
        index: usize,
        axis: Axis,
        value: SizeValue,
        extra: i32,
    ) -> Option<Option<i32>> {
        match value {
            SizeValue::Fixed(v) => Some(Some(v + extra)),
            SizeValue::Percent(p) => {
                let c = self.available_content(self.records[index].parent, axis)?;
                Some(Some(percent_of(c, p) + extra))
            }
            SizeValue::Auto | SizeValue::FitContent | SizeValue::Unconstrained => Some(None),
        }
    }

    /// Bounding extent of the in-flow children plus insets. Waits for every
    /// child to settle, and along the flow axis for every child to be placed.
    fn fit_content(&self, index: usize, axis: Axis) -> Option<i32> {
        let rec = &self.records[index];
        if !rec.state.spawned_dynamic_children {
            return None;
        }
        let primary = rec.style.primary();
        let placed = rec.style.layout == LayoutType::Grid || axis == primary;
        let mut extent = 0;
        for c in &rec.children {
            let child = &self.records[*c];
            if !child.in_flow() {
                continue;
            }
            let st = child.state.axis(axis);
            if !st.settled() {
                return None;
            }
            if placed {
                if !st.positioned_by_parent {
                    return None;
                }
                let scroll = if axis == primary {
                    rec.scroll.get(axis)
                } else {
                    0
                };
                extent = extent.max(child.end(axis) - scroll);
            } else {
                extent = extent.max(child.size.get(axis));
            }
        }
        if axis == primary
            && let Some(virtual_extent) = rec
                .widget
                .and_then(|w| self.scene.nodes.get(w))
                .and_then(|n| n.controller.as_ref())
                .and_then(|c| c.virtual_extent())
        {
            extent = extent.max(virtual_extent);
        }
        Some(extent + rec.insets().along(axis))
    }
}
