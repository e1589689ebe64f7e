//! Scroll and virtualization state for flex and grid containers.
//!
//! A [`LayoutController`] lives on the widget node for the widget's whole
//! lifetime and survives recalculations. It owns the logical (virtual) scroll
//! position, the physical offset applied to the spawned window of item
//! widgets, pan physics, and the cached queries of a bound data source.

/// Pan physics and frame timing.
mod physics;
/// Window arithmetic and item binding.
mod virtualize;

use geom::Axis;
pub use physics::{PanState, Stopwatch};
use tracing::{debug, error, trace, warn};
pub(crate) use virtualize::{needed_items, template_item_extent, visible_range};

use crate::{
    data::{CachedQuery, MoreDataRequest, SortedIndices},
    error::{Error, Result},
    id::WidgetId,
    scene::{DataBinding, Scene},
};

/// Offset of a row of items along the scroll axis, saturating at
/// `i32::MAX`.
fn row_offset(row: usize, extent: i32) -> i32 {
    let offset = i64::try_from(row)
        .unwrap_or(i64::MAX)
        .saturating_mul(i64::from(extent.max(0)));
    i32::try_from(offset).unwrap_or(i32::MAX)
}

/// Which dynamic layout a controller serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    /// A flex container: one item per row.
    Flex,
    /// A grid container: several items per row.
    Grid,
}

/// Persistent scroll and virtualization state of a flex or grid widget.
#[derive(Debug)]
pub struct LayoutController {
    /// Layout served.
    pub(crate) kind: ControllerKind,
    /// Scroll axis.
    pub(crate) axis: Axis,
    /// The container sizes to its content along the scroll axis.
    pub(crate) fit_content: bool,
    /// Logical scroll position over the full data extent.
    pub(crate) virtual_scroll_position: f32,
    /// Physical offset applied to in-flow children along the scroll axis.
    pub(crate) scroll_position: i32,
    /// Pan velocity state.
    pub(crate) pan: PanState,
    /// Frame timer for `Scene::tick`.
    pub(crate) stopwatch: Stopwatch,
    /// Filtered row indices of the bound source.
    pub(crate) query: Option<CachedQuery>,
    /// Sorted permutation of `query`.
    pub(crate) sorted: Option<SortedIndices>,
    /// A data source is bound.
    pub(crate) bound: bool,
    /// Content extent along the scroll axis at the last commit.
    pub(crate) viewport: i32,
    /// Item extent declared by the template, gap included.
    pub(crate) declared_extent: Option<i32>,
    /// Item extent measured from the first item at the last commit.
    pub(crate) measured_extent: Option<i32>,
    /// Items per row.
    pub(crate) columns: usize,
    /// Resolved gap between items.
    pub(crate) gap: i32,
    /// View-order range bound into the item widgets.
    pub(crate) visible: Option<(usize, usize)>,
    /// Extent of the children along the scroll axis at the last commit.
    pub(crate) content_extent: i32,
    /// Item widgets to remove before the next build.
    pub(crate) pending_trim: usize,
    /// Data count at which more data was last requested.
    pub(crate) requested_at: Option<usize>,
    /// The item template is still loading.
    pub(crate) template_pending: bool,
    /// Item widgets currently spawned.
    pub(crate) item_slots: usize,
}

impl LayoutController {
    /// Construct a controller at scroll position zero.
    pub fn new(kind: ControllerKind, axis: Axis) -> Self {
        Self {
            kind,
            axis,
            fit_content: false,
            virtual_scroll_position: 0.0,
            scroll_position: 0,
            pan: PanState::default(),
            stopwatch: Stopwatch::new(),
            query: None,
            sorted: None,
            bound: false,
            viewport: 0,
            declared_extent: None,
            measured_extent: None,
            columns: 1,
            gap: 0,
            visible: None,
            content_extent: 0,
            pending_trim: 0,
            requested_at: None,
            template_pending: false,
            item_slots: 0,
        }
    }

    /// Layout served.
    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    /// Scroll axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Logical scroll position.
    pub fn virtual_scroll_position(&self) -> f32 {
        self.virtual_scroll_position
    }

    /// Physical offset applied to the spawned window.
    pub fn scroll_position(&self) -> i32 {
        self.scroll_position
    }

    /// Current pan state.
    pub fn pan(&self) -> PanState {
        self.pan
    }

    /// Items per row.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// View-order range bound into the item widgets.
    pub fn visible_range(&self) -> Option<(usize, usize)> {
        self.visible
    }

    /// Viewport extent along the scroll axis.
    pub fn viewport(&self) -> i32 {
        self.viewport
    }

    /// Item extent, gap included: declared by the template, or measured.
    pub fn item_extent(&self) -> Option<i32> {
        self.declared_extent
            .or(self.measured_extent)
            .filter(|e| *e > 0)
    }

    /// Bound rows in view order: the sorted permutation when sorting, else
    /// the filtered indices.
    pub fn view_order(&self) -> &[usize] {
        match (&self.sorted, &self.query) {
            (Some(s), _) => &s.0,
            (None, Some(q)) => &q.indices,
            (None, None) => &[],
        }
    }

    /// Number of bound rows after filtering.
    pub fn data_count(&self) -> usize {
        self.view_order().len()
    }

    /// Number of item rows covering the whole data set.
    fn rows(&self) -> usize {
        self.data_count().div_ceil(self.columns.max(1))
    }

    /// Extent of every bound item laid end to end, for data-bound containers
    /// with a known item extent.
    pub(crate) fn virtual_extent(&self) -> Option<i32> {
        if !self.bound {
            return None;
        }
        let e = self.item_extent()?;
        Some((row_offset(self.rows(), e) - self.gap).max(0))
    }

    /// Largest valid virtual scroll position. Zero while the template is
    /// loading or when the content fits.
    pub fn maximum(&self) -> i32 {
        if self.bound {
            if self.template_pending || self.item_slots == 0 {
                return 0;
            }
            self.virtual_extent()
                .map(|extent| (extent - self.viewport).max(0))
                .unwrap_or(0)
        } else {
            (self.content_extent - self.viewport).max(0)
        }
    }

    /// Physical scroll offset for a virtual position.
    ///
    /// A virtualized window is offset by the position within its first row.
    /// A fit-content window sits at its first row's true offset, so its
    /// children are pushed down instead.
    pub(crate) fn physical(&self, vpos: f32) -> i32 {
        let v = vpos.max(0.0).floor() as i32;
        match (self.bound, self.fit_content, self.item_extent()) {
            (true, true, Some(e)) => -((v / e) * e),
            (true, false, Some(e)) => v % e,
            (true, _, None) | (false, true, _) => 0,
            (false, false, _) => v,
        }
    }

    /// Re-query the data source if its revision moved.
    pub(crate) fn refresh_queries(&mut self, binding: &DataBinding) {
        let revision = binding.source.revision();
        if self.query.as_ref().is_some_and(|q| q.revision == revision) {
            return;
        }
        let query = binding.source.cache_query(binding.filter.as_ref());
        self.sorted = binding.sort.as_ref().and_then(|key| {
            match binding.source.sort_query(&query, &key.property, key.order) {
                Ok(sorted) => Some(sorted),
                Err(e) => {
                    warn!(error = %e, "sort unavailable, using source order");
                    None
                }
            }
        });
        trace!(rows = query.indices.len(), revision, "data query refreshed");
        self.query = Some(query);
        self.visible = None;
    }

    /// Drop cached queries so the next pass re-queries and re-binds.
    pub(crate) fn invalidate_queries(&mut self) {
        self.query = None;
        self.sorted = None;
        self.visible = None;
    }

    /// Forget everything derived from a previous binding.
    pub(crate) fn reset_binding(&mut self) {
        self.invalidate_queries();
        self.virtual_scroll_position = 0.0;
        self.scroll_position = 0;
        self.declared_extent = None;
        self.measured_extent = None;
        self.requested_at = None;
        self.pending_trim = 0;
        self.template_pending = false;
        self.item_slots = 0;
        self.pan.stop();
    }

    /// Clamp the virtual position into range and refresh the physical
    /// offset. Returns true if either moved. A fit-content container is
    /// scrolled by its ancestors, so its range is its whole extent.
    pub(crate) fn reclamp(&mut self) -> bool {
        let max = if self.fit_content {
            self.virtual_extent().unwrap_or(0)
        } else {
            self.maximum()
        } as f32;
        let before = (self.virtual_scroll_position, self.scroll_position);
        if self.virtual_scroll_position > max {
            self.virtual_scroll_position = max;
        }
        self.scroll_position = self.physical(self.virtual_scroll_position);
        before != (self.virtual_scroll_position, self.scroll_position)
    }
}

impl Scene {
    /// The controller of a flex or grid widget.
    pub fn controller(&self, widget: WidgetId) -> Result<&LayoutController> {
        self.get(widget)?
            .controller
            .as_ref()
            .ok_or(Error::NoController(widget))
    }

    /// The controller of a flex or grid widget, mutably.
    fn controller_mut(&mut self, widget: WidgetId) -> Result<&mut LayoutController> {
        self.get_mut(widget)?
            .controller
            .as_mut()
            .ok_or(Error::NoController(widget))
    }

    /// Logical scroll position of a widget.
    pub fn virtual_scroll_position(&self, widget: WidgetId) -> Result<f32> {
        Ok(self.controller(widget)?.virtual_scroll_position)
    }

    /// Largest valid logical scroll position of a widget.
    pub fn maximum_virtual_scroll_position(&self, widget: WidgetId) -> Result<i32> {
        Ok(self.controller(widget)?.maximum())
    }

    /// Scroll a widget. The position is clamped to `[0, maximum]`, pushed to
    /// fit-content scrollable descendants, and the widget's subtree is
    /// recalculated. Landing exactly on the maximum asks the data source for
    /// another page. Returns the clamped position.
    pub fn set_virtual_scroll_position(&mut self, widget: WidgetId, vpos: f32) -> Result<f32> {
        if !vpos.is_finite() {
            return Err(Error::Invalid(format!("scroll position {vpos}")));
        }
        let ctl = self.controller_mut(widget)?;
        let max = ctl.maximum();
        let clamped = vpos.clamp(0.0, max as f32);
        let old_physical = ctl.scroll_position;
        ctl.virtual_scroll_position = clamped;
        ctl.scroll_position = ctl.physical(clamped);
        let axis = ctl.axis;
        trace!(?widget, vpos, clamped, max, "scroll");

        self.propagate_scroll(widget, axis, clamped, old_physical)?;
        self.recalculate_hierarchy(widget)?;
        if clamped == max as f32 {
            self.request_more_data(widget)?;
        }
        Ok(clamped)
    }

    /// Push a scroll position into fit-content scrollable descendants. Each
    /// receives the position less its own offset inside the scrolled content.
    fn propagate_scroll(
        &mut self,
        widget: WidgetId,
        axis: Axis,
        vpos: f32,
        old_physical: i32,
    ) -> Result<()> {
        let node = self.get(widget)?;
        let origin = node.screen_rect.tl.get(axis)
            + node.padding.plus(&node.margin).start(axis)
            - old_physical;
        let targets: Vec<(WidgetId, i32)> = self
            .subtree_pre_order(widget)
            .into_iter()
            .skip(1)
            .filter_map(|id| {
                let n = self.nodes.get(id)?;
                let ctl = n.controller.as_ref()?;
                (ctl.fit_content && ctl.axis == axis && n.laid_out)
                    .then(|| (id, n.screen_rect.tl.get(axis) - origin))
            })
            .collect();
        for (id, offset) in targets {
            if let Some(ctl) = self.nodes.get_mut(id).and_then(|n| n.controller.as_mut()) {
                let mut v = (vpos - offset as f32).max(0.0);
                if let Some(extent) = ctl.virtual_extent() {
                    v = v.min(extent as f32);
                }
                ctl.virtual_scroll_position = v;
                ctl.scroll_position = ctl.physical(v);
                trace!(widget = ?id, offset, vpos = v, "propagated scroll");
            }
        }
        Ok(())
    }

    /// Ask a bound widget's source for another page, at most once per data
    /// count.
    fn request_more_data(&mut self, widget: WidgetId) -> Result<()> {
        let page_size = self.config.page_size;
        let node = self.get(widget)?;
        let (Some(binding), Some(ctl)) = (node.binding.clone(), node.controller.as_ref()) else {
            return Ok(());
        };
        if ctl.item_slots == 0 {
            return Ok(());
        }
        let count = ctl.data_count();
        if ctl.requested_at == Some(count) {
            trace!(?widget, count, "more data already requested");
            return Ok(());
        }
        let request = MoreDataRequest {
            source: binding.source.id(),
            count: page_size,
            sort: binding.sort.clone(),
            filter: binding.filter.clone(),
            sorted_len: ctl.sorted.as_ref().map(|s| s.0.len()),
            last_index: ctl.view_order().last().copied(),
        };
        self.controller_mut(widget)?.requested_at = Some(count);
        debug!(?widget, count, "requesting more data");
        binding.source.request_more_data(request);
        Ok(())
    }

    /// Scroll the least distance that brings an item fully into view. For
    /// data-bound widgets `index` is a view-order data index; otherwise it is
    /// a child index. Returns the new position.
    pub fn update_view_to_show_item_at_index(
        &mut self,
        widget: WidgetId,
        index: usize,
    ) -> Result<f32> {
        let node = self.get(widget)?;
        let ctl = node.controller.as_ref().ok_or(Error::NoController(widget))?;
        let axis = ctl.axis;
        let (top, bottom) = if ctl.bound {
            if index >= ctl.data_count() {
                return Err(Error::Invalid(format!(
                    "item {index} out of range of {}",
                    ctl.data_count()
                )));
            }
            let Some(e) = ctl.item_extent() else {
                return Ok(ctl.virtual_scroll_position);
            };
            let top = row_offset(index / ctl.columns.max(1), e);
            (top, top.saturating_add(e - ctl.gap))
        } else {
            let child = node
                .children
                .get(index)
                .and_then(|c| self.nodes.get(*c))
                .ok_or_else(|| Error::Invalid(format!("no child {index}")))?;
            let start = node.padding.plus(&node.margin).start(axis);
            let top = child.position.get(axis) - start + ctl.scroll_position;
            (top, top + child.size.get(axis))
        };
        let vpos = ctl.virtual_scroll_position;
        let view = ctl.viewport;
        let target = if (top as f32) < vpos {
            top
        } else if (bottom - view) as f32 > vpos {
            bottom - view
        } else {
            return Ok(vpos);
        };
        self.set_virtual_scroll_position(widget, target as f32)
    }

    /// Accelerate a widget's pan. The pan is driven by `update`/`tick` until
    /// it comes to rest or hits a scroll bound.
    pub fn pan(&mut self, widget: WidgetId, acceleration: f32) -> Result<()> {
        let ctl = self.controller_mut(widget)?;
        if !ctl.pan.active {
            ctl.stopwatch.reset();
            ctl.stopwatch.lap();
        }
        ctl.pan.requested_acceleration += acceleration;
        ctl.pan.active = true;
        Ok(())
    }

    /// Set a widget's pan velocity directly, as after a fling.
    pub fn set_pan_velocity(&mut self, widget: WidgetId, velocity: f32) -> Result<()> {
        let ctl = self.controller_mut(widget)?;
        if !ctl.pan.active {
            ctl.stopwatch.reset();
            ctl.stopwatch.lap();
        }
        ctl.pan.velocity = velocity;
        ctl.pan.active = true;
        Ok(())
    }

    /// Stop a widget's pan.
    pub fn stop_pan(&mut self, widget: WidgetId) -> Result<()> {
        self.controller_mut(widget)?.pan.stop();
        Ok(())
    }

    /// Step every active pan. `dt` overrides the controllers' stopwatches.
    pub(crate) fn advance_pans(&mut self, dt: Option<f32>) -> Result<()> {
        let friction = self.config.pan_friction;
        let active: Vec<WidgetId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.controller.as_ref().is_some_and(|c| c.pan.active))
            .map(|(id, _)| id)
            .collect();
        let mut first_err = None;
        for widget in active {
            if let Err(e) = self.advance_pan(widget, dt, friction) {
                error!(?widget, error = %e, "pan step failed");
                if let Ok(ctl) = self.controller_mut(widget) {
                    ctl.pan.stop();
                }
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Step one widget's pan.
    fn advance_pan(&mut self, widget: WidgetId, dt: Option<f32>, friction: f32) -> Result<()> {
        let ctl = self.controller_mut(widget)?;
        let dt = dt.unwrap_or_else(|| ctl.stopwatch.lap());
        let delta = ctl.pan.step(dt, friction);
        let target = ctl.virtual_scroll_position + delta;
        let at_rest = ctl.pan.at_rest();
        let clamped = self.set_virtual_scroll_position(widget, target)?;
        if at_rest || clamped != target {
            debug!(?widget, clamped, "pan finished");
            self.controller_mut(widget)?.pan.stop();
        }
        Ok(())
    }
}
