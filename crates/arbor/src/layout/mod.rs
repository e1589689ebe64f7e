//! The layout resolution engine.
//!
//! A recalculation flattens a widget subtree into an arena of
//! [`LayoutRecord`](record::LayoutRecord)s, then sweeps the arena until every
//! record is final. Each step commits a value only once its own inputs are
//! final: percentage sizes wait on ancestors, fit-content sizes wait on
//! descendants, and flex alignment waits on siblings. Because these chains
//! interleave arbitrarily, resolution is a fixed-point iteration rather than
//! a single top-down or bottom-up walk. The finished arena is then written
//! back onto the scene nodes by the commit phase.

/// Snapshot builder.
mod builder;
/// Write-back of finished records.
mod commit;
/// Child placement along the primary and secondary axes.
mod flow;
/// Flex growth and shrink distribution.
mod grow;
/// Relative and absolute offsets.
mod position;
/// Per-pass records and flags.
mod record;
/// Own-size resolution.
mod size;
/// Data-bound child spawning.
mod spawn;

use geom::{Axis, Expanse};
use tracing::{debug, error, trace, warn};

use self::{record::LayoutRecord, spawn::Spawn};
use crate::{
    error::{Error, Result},
    id::WidgetId,
    scene::Scene,
    style::{Length, percent_of},
};

/// One recalculation over a widget subtree.
struct LayoutPass<'a> {
    /// Scene being laid out.
    scene: &'a mut Scene,
    /// Record arena. Index 0 is the sentinel standing in for the root's
    /// container.
    records: Vec<LayoutRecord>,
    /// Some step changed a flag during the current sweep.
    progress: bool,
    /// Sweeps run so far.
    sweeps: usize,
}

impl<'a> LayoutPass<'a> {
    /// Construct an empty pass over a scene.
    fn new(scene: &'a mut Scene) -> Self {
        Self {
            scene,
            records: Vec::new(),
            progress: false,
            sweeps: 0,
        }
    }

    /// Build, solve and commit a subtree.
    fn run(&mut self, root: WidgetId) -> Result<()> {
        self.build(root)?;
        trace!(?root, records = self.records.len(), "layout snapshot built");
        if let Err(e) = self.solve() {
            error!(?root, error = %e, "layout did not converge, skipping commit");
            return Err(e);
        }
        debug!(?root, records = self.records.len(), sweeps = self.sweeps, "layout solved");
        self.commit(root);
        Ok(())
    }

    /// Widgets whose records are not final.
    fn unresolved(&self) -> Vec<WidgetId> {
        self.records
            .iter()
            .filter(|r| !r.state.is_final())
            .filter_map(|r| r.widget)
            .collect()
    }

    /// Sweep the arena until every record is final.
    fn solve(&mut self) -> Result<()> {
        let limit = self.scene.config.max_sweeps;
        loop {
            if self.records.iter().all(|r| r.state.is_final()) {
                return Ok(());
            }
            if self.sweeps >= limit {
                return Err(Error::SweepLimit {
                    limit,
                    widgets: self.unresolved(),
                });
            }
            self.sweeps += 1;
            self.progress = false;
            self.sweep();
            if !self.progress {
                return Err(Error::Unresolved {
                    sweeps: self.sweeps,
                    widgets: self.unresolved(),
                });
            }
        }
    }

    /// One pass over every non-final record in arena order. Spawning
    /// children restarts the pass so new records are visited in order.
    fn sweep(&mut self) {
        let mut i = 1;
        while i < self.records.len() {
            if self.records[i].state.is_final() {
                i += 1;
                continue;
            }
            for a in Axis::BOTH {
                self.try_resolve_size(i, a);
            }
            for a in Axis::BOTH {
                self.try_resolve_position(i, a);
            }
            if !self.records[i].state.spawned_dynamic_children {
                match self.resolve_unspawned_dynamic_children(i) {
                    Ok(Spawn::Added) => {
                        self.progress = true;
                        i = 1;
                        continue;
                    }
                    Ok(Spawn::Done) => self.progress = true,
                    Ok(Spawn::Waiting) => {}
                    Err(e) => {
                        warn!(widget = ?self.records[i].widget, error = %e, "spawning children failed");
                    }
                }
            }
            let primary = self.records[i].style.primary();
            for a in [primary, primary.other()] {
                self.grow_children(i, a);
            }
            for a in [primary, primary.other()] {
                self.position_children(i, a);
            }
            i += 1;
        }
    }

    /// Settled content extent of a record along an axis. An unsettled
    /// fit-content record passes through what its own container offers,
    /// less its insets.
    fn available_content(&self, index: usize, axis: Axis) -> Option<i32> {
        let mut index = index;
        let mut inset = 0;
        loop {
            let rec = &self.records[index];
            if !rec.insets_resolved[axis.index()] {
                return None;
            }
            if index == 0 || rec.state.axis(axis).settled() {
                return Some((rec.content(axis) - inset).max(0));
            }
            if !rec.style.fits_content(axis) {
                return None;
            }
            inset += rec.insets().along(axis);
            index = rec.parent;
        }
    }

    /// Resolved gap between a container's children.
    fn gap(&self, index: usize) -> Option<i32> {
        let rec = &self.records[index];
        match rec.style.gap {
            Length::Fixed(v) => Some(v),
            Length::Percent(p) => self
                .available_content(index, rec.style.primary())
                .map(|c| percent_of(c, p)),
        }
    }

    /// Mark progress after a flag flip.
    fn advance(&mut self) {
        self.progress = true;
    }
}

/// Split `remaining` across weights, rounding each share down.
fn allocate_flex_shares(remaining: i32, weights: &[f32]) -> Vec<i32> {
    let total: f32 = weights.iter().filter(|w| w.is_finite()).map(|w| w.max(0.0)).sum();
    if remaining <= 0 || total <= 0.0 {
        return vec![0; weights.len()];
    }
    weights
        .iter()
        .map(|w| {
            let w = if w.is_finite() { w.max(0.0) } else { 0.0 };
            (remaining as f64 * w as f64 / total as f64).floor() as i32
        })
        .collect()
}

impl Scene {
    /// Lay out a widget's subtree against its parent's committed content
    /// area, or the screen for a root. Nothing is committed if the solver
    /// fails to converge.
    pub fn recalculate_hierarchy(&mut self, widget: WidgetId) -> Result<()> {
        self.get(widget)?;
        LayoutPass::new(self).run(widget)
    }

    /// Content area a widget offers its children: its committed size less
    /// padding and margin. Lays the widget out first if it never has been.
    pub fn available_child_content_area(&mut self, widget: WidgetId) -> Result<Expanse> {
        if !self.get(widget)?.laid_out {
            let root = self.layout_root(widget);
            self.recalculate_hierarchy(root)?;
        }
        let node = self.get(widget)?;
        Ok(node.content_rect().expanse())
    }

    /// The nearest ancestor-or-self that can be laid out on its own: the
    /// topmost ancestor that has never been laid out.
    fn layout_root(&self, widget: WidgetId) -> WidgetId {
        let mut root = widget;
        let mut current = self.parent(widget);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(n) if !n.laid_out => root = id,
                _ => break,
            }
            current = self.parent(id);
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_round_down() {
        assert_eq!(allocate_flex_shares(400, &[1.0, 1.0, 2.0]), vec![100, 100, 200]);
        assert_eq!(allocate_flex_shares(10, &[1.0, 1.0, 1.0]), vec![3, 3, 3]);
        assert_eq!(allocate_flex_shares(10, &[0.0, 0.0]), vec![0, 0]);
        assert_eq!(allocate_flex_shares(-5, &[1.0]), vec![0]);
    }
}
