//! Window arithmetic and data binding for virtualized containers.

use std::collections::HashMap;

use geom::Axis;
use scopeguard::guard;
use tracing::{trace, warn};

use crate::{
    data::Row,
    error::Result,
    id::WidgetId,
    scene::Scene,
    style::{BoxSizing, Length, Modifiers, SizeValue, StyleValue, StyleValueId, percent_of},
    template::TemplateNode,
};

/// Extent one item occupies along an axis, gap included, as declared by the
/// template root. `None` when the root's size is not fixed or a percentage.
pub(crate) fn template_item_extent(
    root: &TemplateNode,
    axis: Axis,
    content: i32,
    gap: i32,
) -> Option<i32> {
    let ctx = root.style.context(Modifiers::NONE);
    let id = match axis {
        Axis::X => StyleValueId::Width,
        Axis::Y => StyleValueId::Height,
    };
    let size = match root.style.lookup(id, &ctx) {
        Some(StyleValue::Size(SizeValue::Fixed(v))) => v,
        Some(StyleValue::Size(SizeValue::Percent(p))) => percent_of(content, p),
        _ => return None,
    };
    let content_box = matches!(
        root.style.lookup(StyleValueId::BoxSizing, &ctx),
        Some(StyleValue::BoxSizing(BoxSizing::ContentBox))
    );
    let insets = if content_box {
        [StyleValueId::Padding, StyleValueId::Margin]
            .iter()
            .map(|id| match root.style.lookup(*id, &ctx) {
                Some(StyleValue::Edges(e)) => {
                    let side = |l: Length| l.resolve(content);
                    side(e.start(axis)) + side(e.end(axis))
                }
                _ => 0,
            })
            .sum()
    } else {
        0
    };
    Some((size + insets + gap).max(0))
}

/// Item widgets needed to cover a viewport: whole rows plus overscan, capped
/// at the data count.
pub(crate) fn needed_items(
    viewport: i32,
    extent: i32,
    overscan_rows: usize,
    columns: usize,
    count: usize,
) -> usize {
    if extent <= 0 {
        return count.min(1);
    }
    let rows = (viewport.max(0) as usize).div_ceil(extent as usize) + overscan_rows;
    (rows * columns.max(1)).min(count)
}

/// View-order range shown by a window of `slots` item widgets at a virtual
/// scroll position.
pub(crate) fn visible_range(
    vpos: f32,
    extent: Option<i32>,
    columns: usize,
    slots: usize,
    count: usize,
) -> (usize, usize) {
    let row = match extent {
        Some(e) if e > 0 => (vpos.max(0.0) as i32 / e) as usize,
        _ => 0,
    };
    let start = (row * columns.max(1)).min(count);
    (start, (start + slots).min(count))
}

impl Scene {
    /// Push rows for the view-order range `[start, end)` into a bound
    /// container's item widgets. Widgets past the end of the data are hidden.
    pub(crate) fn rebind_items(&mut self, widget: WidgetId, start: usize, end: usize) -> Result<()> {
        let node = self.get(widget)?;
        let Some(binding) = node.binding.clone() else {
            return Ok(());
        };
        let children = node.children.clone();
        let indices: Vec<usize> = node
            .controller
            .as_ref()
            .map(|c| {
                let order = c.view_order();
                debug_assert!(end <= order.len(), "window past the end of the query");
                order.get(start..end.min(order.len())).unwrap_or(&[]).to_vec()
            })
            .unwrap_or_default();

        let mut rows: HashMap<usize, Row> = HashMap::with_capacity(indices.len());
        {
            binding.source.lock_read();
            let source = guard(binding.source.as_ref(), |s| s.unlock_read());
            source.iterate_data(&indices, &mut |i, row| {
                rows.insert(i, row.clone());
            });
        }
        if rows.len() < indices.len() {
            warn!(
                ?widget,
                missing = indices.len() - rows.len(),
                "data source returned fewer rows than requested"
            );
        }
        trace!(?widget, start, end, "rebinding items");

        for (slot, child) in children.iter().enumerate() {
            let bound = indices.get(slot).map(|i| (start + slot, rows.remove(i)));
            let hide = bound.is_none();
            if let Some(node) = self.nodes.get_mut(*child) {
                match bound {
                    Some((index, row)) => {
                        node.data_index = Some(index);
                        node.data = row;
                    }
                    None => {
                        node.data_index = None;
                        node.data = None;
                    }
                }
                node.hidden = hide;
            }
            if hide {
                self.forget_subtree(*child);
            }
        }
        Ok(())
    }
}
