//! Relative and absolute offsets.

use geom::Axis;
use tracing::trace;

use super::LayoutPass;
use crate::style::PositionType;

impl LayoutPass<'_> {
    /// Resolve a record's own offset along an axis. Static and dynamic
    /// records are preset; relative and absolute records read their offsets.
    pub(super) fn try_resolve_position(&mut self, index: usize, axis: Axis) {
        let rec = &self.records[index];
        if rec.state.axis(axis).position {
            return;
        }
        let start = rec.style.offsets.start(axis);
        let end = rec.style.offsets.end(axis);
        let needs_base = start.or(end).is_some_and(|l| l.is_relative());
        let base = if needs_base {
            match self.available_content(rec.parent, axis) {
                Some(b) => b,
                None => return,
            }
        } else {
            0
        };
        let offset = match (rec.style.position, start, end) {
            (_, Some(s), _) => s.resolve(base),
            (PositionType::Relative, None, Some(e)) => -e.resolve(base),
            (PositionType::Absolute, None, Some(e)) => {
                let parent = &self.records[rec.parent];
                if !rec.state.axis(axis).settled() || !parent.state.axis(axis).settled() {
                    return;
                }
                parent.content(axis) - e.resolve(base) - rec.size.get(axis)
            }
            _ => 0,
        };
        let rec = &mut self.records[index];
        rec.offset.set(axis, offset);
        rec.state.axis_mut(axis).position = true;
        trace!(widget = ?rec.widget, ?axis, offset, "offset resolved");
        self.advance();
    }
}
