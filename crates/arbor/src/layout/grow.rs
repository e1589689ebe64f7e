//! Flex growth, shrink and stretch.

use geom::Axis;
use tracing::trace;

use super::{LayoutPass, allocate_flex_shares, record::clamp_axis};
use crate::style::LayoutType;

impl LayoutPass<'_> {
    /// Assign sizes to the children whose extent along an axis this
    /// container decides: flex growth or shrink along the flow axis, stretch
    /// across it.
    pub(super) fn grow_children(&mut self, index: usize, axis: Axis) {
        let rec = &self.records[index];
        if rec.state.axis(axis).grown_children || !rec.state.spawned_dynamic_children {
            return;
        }
        let kids = self.flow_children(index);
        let parts: Vec<usize> = kids
            .iter()
            .copied()
            .filter(|k| !self.records[*k].state.axis(axis).grown_by_parent)
            .collect();
        if parts.is_empty() {
            self.finish_growth(index, axis, &parts);
            return;
        }
        let rec = &self.records[index];
        if !rec.state.axis(axis).settled() {
            return;
        }
        let content = rec.content(axis);
        if parts
            .iter()
            .any(|p| !self.records[*p].state.axis(axis).size)
        {
            return;
        }

        if rec.style.layout == LayoutType::Flex && axis == rec.style.primary() {
            if kids.iter().any(|k| !self.records[*k].state.axis(axis).size) {
                return;
            }
            let Some(gap) = self.gap(index) else {
                return;
            };
            let used: i32 = kids.iter().map(|k| self.records[*k].size.get(axis)).sum();
            let available = content - used - gap * (kids.len() as i32 - 1);
            let weights: Vec<f32> = parts
                .iter()
                .map(|p| {
                    let s = &self.records[*p].style;
                    if available >= 0 { s.grow } else { s.shrink }
                })
                .collect();
            let shares = allocate_flex_shares(available.abs(), &weights);
            trace!(widget = ?rec.widget, ?axis, available, ?shares, "distributing flex space");
            for (p, share) in parts.iter().zip(shares) {
                let child = &mut self.records[*p];
                let a = axis.index();
                let base = child.size.get(axis);
                let sized = if available >= 0 {
                    base + share
                } else {
                    base - share
                };
                child
                    .size
                    .set(axis, clamp_axis(sized, child.min[a], child.max[a]).max(0));
            }
        } else {
            for p in &parts {
                let child = &mut self.records[*p];
                let a = axis.index();
                child
                    .size
                    .set(axis, clamp_axis(content, child.min[a], child.max[a]).max(0));
            }
        }
        self.finish_growth(index, axis, &parts);
    }

    /// Mark the participants grown and the container done.
    fn finish_growth(&mut self, index: usize, axis: Axis, parts: &[usize]) {
        for p in parts {
            self.records[*p].state.axis_mut(axis).grown_by_parent = true;
        }
        self.records[index].state.axis_mut(axis).grown_children = true;
        self.advance();
    }
}
