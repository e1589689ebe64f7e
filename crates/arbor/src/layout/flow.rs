//! Child placement: block and flex chaining, flex alignment, grid cells.

use geom::Axis;
use tracing::trace;

use super::LayoutPass;
use crate::style::{Align, LayoutType};

/// A run of center-aligned children, `kids[first..end]`.
#[derive(Debug, Clone, Copy)]
struct CenterRun {
    /// First child of the run.
    first: usize,
    /// One past the last child of the run.
    end: usize,
}

/// The container a run is placed in.
#[derive(Debug, Clone, Copy)]
struct FlowFrame {
    /// Flow axis.
    axis: Axis,
    /// Gap between children.
    gap: i32,
    /// Content extent along the axis, once settled.
    content: Option<i32>,
}

impl LayoutPass<'_> {
    /// In-flow children of a record.
    pub(super) fn flow_children(&self, index: usize) -> Vec<usize> {
        self.records[index]
            .children
            .iter()
            .copied()
            .filter(|c| self.records[*c].in_flow())
            .collect()
    }

    /// Place a container's in-flow children along an axis.
    pub(super) fn position_children(&mut self, index: usize, axis: Axis) {
        let rec = &self.records[index];
        if rec.state.axis(axis).positioned_children || !rec.state.spawned_dynamic_children {
            return;
        }
        let kids = self.flow_children(index);
        if !kids.is_empty() {
            let rec = &self.records[index];
            if rec.style.layout == LayoutType::Grid {
                self.place_grid(index, &kids);
            } else if axis == rec.style.primary() {
                self.place_primary(index, &kids, axis);
            } else {
                self.place_secondary(index, &kids, axis);
            }
            if kids
                .iter()
                .any(|k| !self.records[*k].state.axis(axis).positioned_by_parent)
            {
                return;
            }
        }
        self.records[index].state.axis_mut(axis).positioned_children = true;
        self.advance();
    }

    /// Record a child's flow position along an axis.
    fn place(&mut self, child: usize, axis: Axis, at: i32) {
        let rec = &mut self.records[child];
        rec.position.set(axis, at);
        rec.state.axis_mut(axis).positioned_by_parent = true;
        trace!(widget = ?rec.widget, ?axis, at, "placed");
        self.advance();
    }

    /// Size of a child along an axis once it will not change again.
    fn settled_size(&self, child: usize, axis: Axis) -> Option<i32> {
        let rec = &self.records[child];
        rec.state
            .axis(axis)
            .settled()
            .then(|| rec.size.get(axis))
    }

    /// Flow end of a placed and settled child.
    fn placed_end(&self, child: usize, axis: Axis) -> Option<i32> {
        let rec = &self.records[child];
        let st = rec.state.axis(axis);
        (st.settled() && st.positioned_by_parent).then(|| rec.end(axis))
    }

    /// Flow position of a placed child.
    fn placed_start(&self, child: usize, axis: Axis) -> Option<i32> {
        let rec = &self.records[child];
        rec.state
            .axis(axis)
            .positioned_by_parent
            .then(|| rec.position.get(axis))
    }

    /// Chain children along the flow axis. Start children follow the
    /// preceding start or center child; end children back up against the
    /// following end or center child; a run of center children is centered
    /// between its start and end neighbors.
    fn place_primary(&mut self, index: usize, kids: &[usize], axis: Axis) {
        let Some(gap) = self.gap(index) else {
            return;
        };
        let style = self.records[index].style;
        let aligns: Vec<Align> = kids
            .iter()
            .map(|k| match style.child_primary_align(&self.records[*k].style) {
                Align::Stretch => Align::Start,
                a => a,
            })
            .collect();
        let content = {
            let rec = &self.records[index];
            rec.state.axis(axis).settled().then(|| rec.content(axis))
        };

        loop {
            let mut moved = false;
            let mut j = 0;
            while j < kids.len() {
                if aligns[j] == Align::Center {
                    let run_end = (j..kids.len())
                        .find(|k| aligns[*k] != Align::Center)
                        .unwrap_or(kids.len());
                    if !self.records[kids[j]].state.axis(axis).positioned_by_parent
                        && self.place_center_run(
                            kids,
                            &aligns,
                            CenterRun {
                                first: j,
                                end: run_end,
                            },
                            FlowFrame { axis, gap, content },
                        )
                    {
                        moved = true;
                    }
                    j = run_end;
                    continue;
                }
                let kid = kids[j];
                if self.records[kid].state.axis(axis).positioned_by_parent {
                    j += 1;
                    continue;
                }
                let at = match aligns[j] {
                    Align::End => {
                        let next = kids.get(j + 1).filter(|_| {
                            matches!(aligns.get(j + 1), Some(Align::End | Align::Center))
                        });
                        let anchor = match next {
                            Some(n) => self.placed_start(*n, axis).map(|p| p - gap),
                            None => content,
                        };
                        anchor.zip(self.settled_size(kid, axis)).map(|(a, s)| a - s)
                    }
                    _ => {
                        let prev = j
                            .checked_sub(1)
                            .filter(|p| matches!(aligns[*p], Align::Start | Align::Center));
                        match prev {
                            Some(p) => self.placed_end(kids[p], axis).map(|e| e + gap),
                            None => Some(0),
                        }
                    }
                };
                if let Some(at) = at {
                    self.place(kid, axis, at);
                    moved = true;
                }
                j += 1;
            }
            if !moved {
                break;
            }
        }
    }

    /// Center a run of children between its neighbors. Returns true if the
    /// run was placed.
    fn place_center_run(
        &mut self,
        kids: &[usize],
        aligns: &[Align],
        run: CenterRun,
        frame: FlowFrame,
    ) -> bool {
        let CenterRun { first, end } = run;
        let FlowFrame { axis, gap, content } = frame;
        let run = &kids[first..end];
        let mut sizes = Vec::with_capacity(run.len());
        for k in run {
            match self.settled_size(*k, axis) {
                Some(s) => sizes.push(s),
                None => return false,
            }
        }
        let left = match first.checked_sub(1) {
            Some(p) if aligns[p] == Align::Start => match self.placed_end(kids[p], axis) {
                Some(e) => e + gap,
                None => return false,
            },
            _ => 0,
        };
        let right = match kids.get(end) {
            Some(n) if aligns[end] == Align::End => match self.placed_start(*n, axis) {
                Some(p) => p - gap,
                None => return false,
            },
            _ => match content {
                Some(c) => c,
                None => return false,
            },
        };
        let extent: i32 = sizes.iter().sum::<i32>() + gap * (sizes.len() as i32 - 1);
        let mut at = left + (right - left - extent).div_euclid(2);
        for (k, size) in run.iter().zip(sizes) {
            self.place(*k, axis, at);
            at += size + gap;
        }
        true
    }

    /// Place children across the flow axis by their secondary alignment.
    fn place_secondary(&mut self, index: usize, kids: &[usize], axis: Axis) {
        let (style, content) = {
            let rec = &self.records[index];
            (
                rec.style,
                rec.state.axis(axis).settled().then(|| rec.content(axis)),
            )
        };
        for kid in kids {
            if self.records[*kid].state.axis(axis).positioned_by_parent {
                continue;
            }
            let align = style.child_secondary_align(&self.records[*kid].style);
            let at = match align {
                Align::Start | Align::Stretch => Some(0),
                Align::Center => content
                    .zip(self.settled_size(*kid, axis))
                    .map(|(c, s)| (c - s).div_euclid(2)),
                Align::End => content
                    .zip(self.settled_size(*kid, axis))
                    .map(|(c, s)| c - s),
            };
            if let Some(at) = at {
                self.place(*kid, axis, at);
            }
        }
    }

    /// Place children in equal cells sized by the first child, wrapping rows
    /// at the container's cross extent.
    fn place_grid(&mut self, index: usize, kids: &[usize]) {
        let (style, primary) = {
            let rec = &self.records[index];
            (rec.style, rec.style.primary())
        };
        let cross = primary.other();
        let Some(gap) = self.gap(index) else {
            return;
        };
        let (Some(entry_p), Some(entry_c)) = (
            self.settled_size(kids[0], primary),
            self.settled_size(kids[0], cross),
        ) else {
            return;
        };
        let columns = if style.fits_content(cross) {
            kids.len()
        } else {
            let rec = &self.records[index];
            if !rec.state.axis(cross).settled() {
                return;
            }
            if entry_c > 0 {
                (rec.content(cross) / entry_c).max(1) as usize
            } else {
                1
            }
        };
        for (k, kid) in kids.iter().enumerate() {
            let (row, column) = ((k / columns) as i32, (k % columns) as i32);
            self.place(*kid, cross, column * (entry_c + gap));
            self.place(*kid, primary, row * (entry_p + gap));
        }
        if let Some(ctl) = self.records[index]
            .widget
            .and_then(|w| self.scene.nodes.get_mut(w))
            .and_then(|n| n.controller.as_mut())
        {
            ctl.columns = columns;
        }
        for a in Axis::BOTH {
            self.records[index].state.axis_mut(a).positioned_children = true;
        }
    }
}
