//! Spawning the item window of data-bound containers.

use geom::Point;
use tracing::{debug, trace};

use super::LayoutPass;
use crate::{
    controller::{ControllerKind, needed_items, template_item_extent, visible_range},
    error::{Error, Result},
    template::LoadState,
};

/// Outcome of a spawn step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Spawn {
    /// The container's extents are not settled yet.
    Waiting,
    /// Nothing to spawn, or the template is still loading.
    Done,
    /// Records were added to the arena.
    Added,
}

impl LayoutPass<'_> {
    /// Mark a record's children spawned.
    fn mark_spawned(&mut self, index: usize) {
        self.records[index].state.spawned_dynamic_children = true;
    }

    /// Clone enough item widgets to cover a bound container's viewport plus
    /// overscan, bind the visible data range into them, and add their records
    /// to the arena.
    ///
    /// The window never shrinks within a pass: surplus widgets are trimmed
    /// before the next one.
    pub(super) fn resolve_unspawned_dynamic_children(&mut self, index: usize) -> Result<Spawn> {
        let Some(widget) = self.records[index].widget else {
            self.mark_spawned(index);
            return Ok(Spawn::Done);
        };
        let Some(binding) = self.scene.get(widget)?.binding.clone() else {
            self.mark_spawned(index);
            return Ok(Spawn::Done);
        };
        let template = match self.scene.templates.try_load(binding.template, widget)? {
            LoadState::Ready(t) => t,
            LoadState::Pending => {
                debug!(?widget, "item template pending");
                if let Some(ctl) = self.scene.get_mut(widget)?.controller.as_mut() {
                    ctl.template_pending = true;
                }
                self.mark_spawned(index);
                return Ok(Spawn::Done);
            }
        };

        let rec = &self.records[index];
        let primary = rec.style.primary();
        let cross = primary.other();
        let windowed = rec.style.fits_content(primary);
        let viewport = if windowed {
            self.scene.scroll_viewport(widget, primary)
        } else if rec.state.axis(primary).settled() {
            rec.content(primary)
        } else {
            return Ok(Spawn::Waiting);
        };
        let cross_content = if rec.style.fits_content(cross) {
            None
        } else if rec.state.axis(cross).settled() {
            Some(rec.content(cross))
        } else {
            return Ok(Spawn::Waiting);
        };
        let Some(gap) = self.gap(index) else {
            return Ok(Spawn::Waiting);
        };
        let overscan = self.scene.config.overscan_rows;
        let existing = self.scene.children(widget).len();

        let (needed, columns, mut follow_up) = {
            let ctl = self
                .scene
                .get_mut(widget)?
                .controller
                .as_mut()
                .ok_or(Error::NoController(widget))?;
            ctl.template_pending = false;
            ctl.refresh_queries(&binding);
            let count = ctl.data_count();
            ctl.declared_extent = template_item_extent(&template.root, primary, viewport, gap);
            let columns = match ctl.kind {
                ControllerKind::Flex => 1,
                ControllerKind::Grid => {
                    let cell = cross_content.and_then(|c| {
                        template_item_extent(&template.root, cross, c, 0).map(|e| (c, e))
                    });
                    match (cross_content, cell) {
                        (_, Some((c, e))) if e > 0 => (c / e).max(1) as usize,
                        (None, _) => count.max(1),
                        _ => ctl.columns.max(1),
                    }
                }
            };
            let (needed, follow_up) = match ctl.item_extent() {
                Some(e) => (needed_items(viewport, e, overscan, columns, count), false),
                None => (count.min(1), count > 0 && ctl.measured_extent.is_none()),
            };
            ctl.columns = columns;
            ctl.gap = gap;
            (needed, columns, follow_up)
        };

        if needed > existing {
            debug!(?widget, existing, needed, "spawning item widgets");
            for _ in existing..needed {
                self.scene.instantiate(widget, &template.root)?;
            }
        } else if needed < existing {
            debug!(?widget, existing, needed, "deferring item window trim");
            if let Some(ctl) = self.scene.get_mut(widget)?.controller.as_mut() {
                ctl.pending_trim = existing - needed;
            }
            follow_up = true;
        }
        let slots = existing.max(needed);

        let (range, rebind, physical) = {
            let ctl = self
                .scene
                .get_mut(widget)?
                .controller
                .as_mut()
                .ok_or(Error::NoController(widget))?;
            ctl.item_slots = slots;
            let range = visible_range(
                ctl.virtual_scroll_position,
                ctl.item_extent(),
                columns,
                slots,
                ctl.data_count(),
            );
            let rebind = ctl.visible != Some(range) || needed > existing;
            ctl.scroll_position = ctl.physical(ctl.virtual_scroll_position);
            (range, rebind, ctl.scroll_position)
        };
        if rebind {
            self.scene.rebind_items(widget, range.0, range.1)?;
            if let Some(ctl) = self.scene.get_mut(widget)?.controller.as_mut() {
                ctl.visible = Some(range);
            }
        }
        self.records[index].scroll = Point::from_axes(primary, physical, 0);
        trace!(?widget, ?range, physical, "item window bound");

        let children = self.scene.children(widget).to_vec();
        let mut added = 0;
        for child in children {
            added += self.build_subtree(child, index);
        }
        self.mark_spawned(index);
        if follow_up {
            self.scene.queue_owner(widget);
        }
        if added == 0 {
            return Ok(Spawn::Done);
        }
        self.records[index].state.clear_flags();
        Ok(Spawn::Added)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use geom::Expanse;

    use super::*;
    use crate::{
        data::{DataValue, Row, VecDataSource},
        id::{SourceId, WidgetId},
        scene::Scene,
        style::{Orientation, SizeValue, Style},
        template::{MemoryTemplates, Template, TemplateNode},
    };

    /// A list bound to fifty rows of 20px items.
    fn bound_list() -> Result<(Scene, WidgetId)> {
        let mut templates = MemoryTemplates::default();
        templates.insert(
            "row",
            Template {
                root: TemplateNode::new("row", Style::default().height(SizeValue::Fixed(20))),
            },
        );
        let mut scene = Scene::new(Expanse::new(100, 100)).with_templates(Box::new(templates));
        let list = scene.add("list", Style::default().flex(Orientation::Vertical));
        let rows = (0..50).map(|i| Row::default().with("n", DataValue::Int(i))).collect();
        scene.bind_data(list, Arc::new(VecDataSource::new(SourceId(1), rows)), "row")?;
        Ok((scene, list))
    }

    #[test]
    fn pending_template_does_not_restart_the_sweep() -> Result<()> {
        let (mut scene, list) = bound_list()?;
        let mut pass = LayoutPass::new(&mut scene);
        pass.build(list)?;
        assert_eq!(pass.records.len(), 2);
        assert_eq!(pass.resolve_unspawned_dynamic_children(1)?, Spawn::Done);
        assert_eq!(pass.records.len(), 2);
        assert!(pass.records[1].state.spawned_dynamic_children);
        assert!(scene.controller(list)?.template_pending);
        Ok(())
    }

    #[test]
    fn loaded_template_adds_item_records() -> Result<()> {
        let (mut scene, list) = bound_list()?;
        scene.settle()?;
        let mut pass = LayoutPass::new(&mut scene);
        pass.build(list)?;
        assert_eq!(pass.records.len(), 2);
        pass.solve()?;
        // Five visible rows plus one of overscan.
        assert_eq!(pass.records.len(), 8);
        Ok(())
    }
}
