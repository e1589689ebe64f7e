//! Snapshot builder: flattens a widget subtree into the record arena.

use geom::{Axis, Point};
use tracing::{debug, trace};

use super::{
    LayoutPass,
    record::{LayoutRecord, RecordState, RecordStyle},
};
use crate::{
    controller::{ControllerKind, LayoutController},
    error::Result,
    id::WidgetId,
    style::{Align, LayoutType, PositionType, SizeValue},
};

impl LayoutPass<'_> {
    /// Build the arena for a subtree: the sentinel at index 0, then one
    /// record per laid-out widget in pre-order.
    pub(super) fn build(&mut self, root: WidgetId) -> Result<()> {
        let sentinel = self.sentinel_for(root)?;
        self.records.push(sentinel);
        if self.build_subtree(root, 0) == 0 {
            trace!(?root, "root is hidden or has no layout");
            return Ok(());
        }
        self.keep_committed_root(root);
        Ok(())
    }

    /// The sentinel stands in for whatever contains the root: the parent's
    /// committed content area, or the screen.
    fn sentinel_for(&self, root: WidgetId) -> Result<LayoutRecord> {
        let node = self.scene.get(root)?;
        let mut sentinel = LayoutRecord::new(None, 0, RecordStyle::default());
        match node.parent.and_then(|p| self.scene.nodes.get(p)) {
            Some(parent) => {
                sentinel.size = parent.size;
                sentinel.padding = parent.padding;
                sentinel.margin = parent.margin;
                if let Some(ctl) = parent.controller.as_ref() {
                    sentinel.scroll = Point::from_axes(ctl.axis, ctl.scroll_position, 0);
                }
            }
            None => sentinel.size = self.scene.screen,
        }
        sentinel.insets_resolved = [true; 2];
        sentinel.state = RecordState::done();
        Ok(sentinel)
    }

    /// A root whose parent owns its geometry keeps its committed size and
    /// position; only its subtree is resolved.
    fn keep_committed_root(&mut self, root: WidgetId) {
        let Some(node) = self.scene.nodes.get(root) else {
            return;
        };
        if node.parent.is_none() || !node.laid_out {
            return;
        }
        let (size, position, padding, margin) = (node.size, node.position, node.padding, node.margin);
        let sentinel_origin = self.records[0].insets().origin();
        let sentinel_scroll = self.records[0].scroll;
        let Some(rec) = self.records.get_mut(1) else {
            return;
        };
        let scroll = if rec.in_flow() {
            sentinel_scroll
        } else {
            Point::zero()
        };
        rec.size = size;
        rec.padding = padding;
        rec.margin = margin;
        rec.insets_resolved = [true; 2];
        rec.position = position - sentinel_origin + scroll;
        rec.offset = Point::zero();
        for a in Axis::BOTH {
            let st = rec.state.axis_mut(a);
            st.size = true;
            st.grown_by_parent = true;
            st.position = true;
            st.positioned_by_parent = true;
        }
    }

    /// Walk a widget subtree with an explicit stack, appending records under
    /// `parent`. Returns the number of records added.
    pub(super) fn build_subtree(&mut self, top: WidgetId, parent: usize) -> usize {
        let mut added = 0;
        let mut stack = vec![(top, parent)];
        while let Some((widget, parent)) = stack.pop() {
            let Some(index) = self.push_record(widget, parent) else {
                continue;
            };
            added += 1;
            if !self.records[index].state.spawned_dynamic_children {
                continue;
            }
            if let Some(node) = self.scene.nodes.get(widget) {
                for child in node.children.iter().rev() {
                    stack.push((*child, index));
                }
            }
        }
        added
    }

    /// Append the record for one widget. Hidden widgets and widgets without
    /// a layout are skipped along with their subtrees.
    fn push_record(&mut self, widget: WidgetId, parent: usize) -> Option<usize> {
        let node = self.scene.nodes.get(widget)?;
        if node.hidden {
            return None;
        }
        let dynamic_position = node.dynamic_position;
        let has_binding = node.binding.is_some();
        let style = RecordStyle::capture(&*self.scene, widget);
        if style.layout == LayoutType::None {
            return None;
        }
        self.prepare_controller(widget, &style);

        let mut rec = LayoutRecord::new(Some(widget), parent, style);
        rec.state.dynamic_layout = style.layout.is_dynamic();
        rec.state.spawned_dynamic_children = !(has_binding && rec.state.dynamic_layout);
        if let Some(ctl) = self
            .scene
            .nodes
            .get(widget)
            .and_then(|n| n.controller.as_ref())
        {
            rec.scroll = Point::from_axes(ctl.axis, ctl.scroll_position, 0);
        }
        self.preset_flags(&mut rec, dynamic_position);

        let index = self.records.len();
        self.records.push(rec);
        self.records[parent].children.push(index);
        for a in Axis::BOTH {
            self.resolve_insets(index, a);
        }
        trace!(?widget, index, parent, "record");
        Some(index)
    }

    /// Create, update or destroy the controller to match the layout type,
    /// applying any deferred window trim.
    fn prepare_controller(&mut self, widget: WidgetId, style: &RecordStyle) {
        let trim = {
            let Some(node) = self.scene.nodes.get_mut(widget) else {
                return;
            };
            let kind = match style.layout {
                LayoutType::Flex => ControllerKind::Flex,
                LayoutType::Grid => ControllerKind::Grid,
                LayoutType::None | LayoutType::Block => {
                    if node.controller.take().is_some() {
                        debug!(?widget, "layout no longer dynamic, dropping controller");
                    }
                    return;
                }
            };
            let bound = node.binding.is_some();
            let ctl = node.controller.get_or_insert_with(|| {
                debug!(?widget, ?kind, "creating layout controller");
                LayoutController::new(kind, style.primary())
            });
            if ctl.kind != kind || ctl.axis != style.primary() {
                ctl.kind = kind;
                ctl.axis = style.primary();
                ctl.visible = None;
            }
            ctl.fit_content = style.fits_content(style.primary());
            ctl.bound = bound;
            if kind == ControllerKind::Flex {
                ctl.columns = 1;
            }
            let trim = ctl.pending_trim;
            ctl.pending_trim = 0;
            if trim > 0 {
                ctl.visible = None;
            }
            trim
        };
        if trim == 0 {
            return;
        }
        let children = self.scene.children(widget).to_vec();
        let keep = children.len().saturating_sub(trim);
        debug!(?widget, removed = children.len() - keep, "trimming item window");
        for child in &children[keep..] {
            if let Err(e) = self.scene.drop_subtree(*child) {
                debug!(?widget, error = %e, "trim target already gone");
            }
        }
        if let Some(ctl) = self
            .scene
            .nodes
            .get_mut(widget)
            .and_then(|n| n.controller.as_mut())
        {
            ctl.item_slots = keep;
        }
    }

    /// Initial flags from the position type and the parent's layout.
    fn preset_flags(&self, rec: &mut LayoutRecord, dynamic_position: Point) {
        let parent = &self.records[rec.parent];
        match rec.style.position {
            PositionType::Static => {
                for a in Axis::BOTH {
                    rec.state.axis_mut(a).position = true;
                }
            }
            PositionType::Relative => {}
            PositionType::Absolute => {
                rec.state.removed_from_parent_layout = true;
                for a in Axis::BOTH {
                    let st = rec.state.axis_mut(a);
                    st.positioned_by_parent = true;
                    st.grown_by_parent = true;
                }
            }
            PositionType::Dynamic => {
                rec.state.removed_from_parent_layout = true;
                rec.position = dynamic_position;
                for a in Axis::BOTH {
                    let st = rec.state.axis_mut(a);
                    st.position = true;
                    st.positioned_by_parent = true;
                    st.grown_by_parent = true;
                }
            }
        }
        if !rec.in_flow() {
            return;
        }
        if rec.parent == 0 {
            for a in Axis::BOTH {
                let st = rec.state.axis_mut(a);
                st.positioned_by_parent = true;
                st.grown_by_parent = true;
            }
            return;
        }
        if parent.style.layout == LayoutType::Flex {
            let primary = parent.style.primary();
            let secondary = primary.other();
            rec.grows[primary.index()] = (rec.style.grow != 0.0 || rec.style.shrink != 0.0)
                && !parent.style.fits_content(primary);
            rec.grows[secondary.index()] = parent.style.child_secondary_align(&rec.style)
                == Align::Stretch
                && rec.style.preferred(secondary) == SizeValue::Auto;
        }
        for a in Axis::BOTH {
            rec.state.axis_mut(a).grown_by_parent = !rec.grows[a.index()];
        }
    }
}
