//! The widget tree the layout engine reads from and commits into.
//!
//! A [`Scene`] owns every widget in a slotmap arena. Widgets carry their style
//! declarations, optional data binding, scroll controller and listeners; the
//! layout pass reads them through [`StyleAccessor`] and writes committed
//! geometry back onto the nodes.

/// Commit-phase hooks and the spatial index.
mod listener;
/// Arena node data.
mod node;

use std::{collections::HashSet, mem, sync::Arc};

use geom::{Axis, Expanse, Point};
pub use listener::{BoundsIndex, Drawable, LayoutListener, SpatialIndex};
pub(crate) use node::content_rect;
pub use node::{DataBinding, LayoutChanges, Node};
use slotmap::SlotMap;
use tracing::{debug, error, trace};

use crate::{
    config::LayoutConfig,
    data::{DataSource, Filter, SortKey},
    error::{Error, Result},
    id::WidgetId,
    style::{ModifierContext, Modifiers, Style, StyleAccessor, StyleValue, StyleValueId},
    template::{MemoryTemplates, TemplateCache, TemplateNode, TemplateSource},
};

/// The widget arena plus the services layout depends on.
pub struct Scene {
    /// Widget arena.
    pub(crate) nodes: SlotMap<WidgetId, Node>,
    /// Window size in pixels.
    pub(crate) screen: Expanse,
    /// Engine tunables.
    pub(crate) config: LayoutConfig,
    /// Item templates for data-bound containers.
    pub(crate) templates: TemplateCache,
    /// Visibility index maintained by the commit phase.
    pub(crate) spatial: Box<dyn SpatialIndex>,
    /// Widgets queued for recalculation, in request order.
    pub(crate) pending: Vec<WidgetId>,
}

impl Scene {
    /// Construct an empty scene with default configuration and no templates.
    pub fn new(screen: Expanse) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            screen,
            config: LayoutConfig::default(),
            templates: TemplateCache::new(Box::new(MemoryTemplates::default())),
            spatial: Box::new(BoundsIndex::default()),
            pending: Vec::new(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the template source.
    pub fn with_templates(mut self, source: Box<dyn TemplateSource>) -> Self {
        self.templates = TemplateCache::new(source);
        self
    }

    /// Replace the spatial index.
    pub fn with_spatial_index(mut self, index: Box<dyn SpatialIndex>) -> Self {
        self.spatial = index;
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Window size.
    pub fn screen(&self) -> Expanse {
        self.screen
    }

    /// Resize the window. Root widgets are queued for recalculation.
    pub fn set_screen(&mut self, screen: Expanse) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        let roots: Vec<WidgetId> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(id, _)| id)
            .collect();
        for id in roots {
            self.queue_recalculation(id);
        }
    }

    /// The spatial index.
    pub fn spatial_index(&self) -> &dyn SpatialIndex {
        self.spatial.as_ref()
    }

    /// Look up a widget.
    pub fn node(&self, widget: WidgetId) -> Option<&Node> {
        self.nodes.get(widget)
    }

    /// Look up a widget, failing if it is gone.
    pub(crate) fn get(&self, widget: WidgetId) -> Result<&Node> {
        self.nodes.get(widget).ok_or(Error::WidgetNotFound(widget))
    }

    /// Look up a widget mutably, failing if it is gone.
    pub(crate) fn get_mut(&mut self, widget: WidgetId) -> Result<&mut Node> {
        self.nodes.get_mut(widget).ok_or(Error::WidgetNotFound(widget))
    }

    /// Parent of a widget.
    pub fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        self.nodes.get(widget).and_then(|n| n.parent)
    }

    /// Children of a widget. Empty for unknown widgets.
    pub fn children(&self, widget: WidgetId) -> &[WidgetId] {
        self.nodes.get(widget).map(|n| n.children()).unwrap_or(&[])
    }

    /// Number of widgets in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds no widgets.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached widget.
    pub fn add(&mut self, name: &str, style: Style) -> WidgetId {
        self.nodes.insert(Node::new(name, style))
    }

    /// Create a widget under a parent.
    pub fn add_child(&mut self, parent: WidgetId, name: &str, style: Style) -> Result<WidgetId> {
        self.get(parent)?;
        let child = self.add(name, style);
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Attach a detached widget as the last child of a parent.
    pub fn attach(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        self.link(parent, child)?;
        self.queue_recalculation(parent);
        Ok(())
    }

    /// Attach without queueing a recalculation.
    fn link(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        self.get(parent)?;
        if self.get(child)?.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach a widget from its parent, keeping it in the arena.
    pub fn detach(&mut self, child: WidgetId) -> Result<()> {
        let Some(parent) = self.get(child)?.parent else {
            return Ok(());
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        self.get_mut(child)?.parent = None;
        self.forget_subtree(child);
        self.queue_recalculation(parent);
        Ok(())
    }

    /// Remove a widget and its descendants from the arena.
    pub fn remove_subtree(&mut self, widget: WidgetId) -> Result<()> {
        if let Some(parent) = self.drop_subtree(widget)? {
            self.queue_recalculation(parent);
        }
        Ok(())
    }

    /// Remove a subtree without queueing a recalculation. Returns the former
    /// parent.
    pub(crate) fn drop_subtree(&mut self, widget: WidgetId) -> Result<Option<WidgetId>> {
        let parent = self.get(widget)?.parent;
        if let Some(node) = parent.and_then(|p| self.nodes.get_mut(p)) {
            node.children.retain(|c| *c != widget);
        }
        for id in self.subtree_pre_order(widget) {
            self.spatial.remove(id);
            self.nodes.remove(id);
        }
        self.pending.retain(|id| self.nodes.contains_key(*id));
        Ok(parent)
    }

    /// True if `ancestor` is a strict ancestor of `widget`.
    pub fn is_ancestor(&self, ancestor: WidgetId, widget: WidgetId) -> bool {
        let mut current = self.parent(widget);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Collect a subtree in pre-order, including the root.
    pub(crate) fn subtree_pre_order(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(id);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Drop a subtree from the spatial index.
    pub(crate) fn forget_subtree(&mut self, root: WidgetId) {
        for id in self.subtree_pre_order(root) {
            self.spatial.remove(id);
        }
    }

    /// Replace a widget's style declarations.
    pub fn set_style(&mut self, widget: WidgetId, style: Style) -> Result<()> {
        self.get_mut(widget)?.style = style;
        self.queue_owner(widget);
        Ok(())
    }

    /// Replace a widget's active modifiers.
    pub fn set_modifiers(&mut self, widget: WidgetId, modifiers: Modifiers) -> Result<()> {
        let node = self.get_mut(widget)?;
        if node.modifiers != modifiers {
            node.modifiers = modifiers;
            self.queue_owner(widget);
        }
        Ok(())
    }

    /// Show or hide a widget. Returns true if visibility changed.
    pub fn set_hidden(&mut self, widget: WidgetId, hidden: bool) -> Result<bool> {
        let node = self.get_mut(widget)?;
        if node.hidden == hidden {
            return Ok(false);
        }
        node.hidden = hidden;
        if hidden {
            self.forget_subtree(widget);
        }
        self.queue_owner(widget);
        Ok(true)
    }

    /// Set the externally driven position of a dynamically positioned widget.
    pub fn set_dynamic_position(&mut self, widget: WidgetId, position: Point) -> Result<()> {
        let node = self.get_mut(widget)?;
        if node.dynamic_position != position {
            node.dynamic_position = position;
            self.queue_owner(widget);
        }
        Ok(())
    }

    /// Install a content area observer.
    pub fn set_listener(&mut self, widget: WidgetId, listener: Box<dyn LayoutListener>) -> Result<()> {
        self.get_mut(widget)?.listener = Some(listener);
        Ok(())
    }

    /// Install render-side state.
    pub fn set_drawable(&mut self, widget: WidgetId, drawable: Box<dyn Drawable>) -> Result<()> {
        self.get_mut(widget)?.drawable = Some(drawable);
        Ok(())
    }

    /// Bind a data source to a flex or grid widget. Items are cloned from the
    /// template registered under `template_guid`. Existing children are
    /// removed: a bound container owns its item widgets.
    pub fn bind_data(
        &mut self,
        widget: WidgetId,
        source: Arc<dyn DataSource>,
        template_guid: &str,
    ) -> Result<()> {
        let template = self.templates.find_or_register(template_guid);
        let children = self.get(widget)?.children.clone();
        for child in children {
            self.drop_subtree(child)?;
        }
        let node = self.get_mut(widget)?;
        node.binding = Some(DataBinding {
            source,
            template,
            filter: None,
            sort: None,
        });
        if let Some(ctl) = node.controller.as_mut() {
            ctl.reset_binding();
        }
        self.queue_recalculation(widget);
        Ok(())
    }

    /// Remove a widget's data binding and its item widgets.
    pub fn unbind_data(&mut self, widget: WidgetId) -> Result<()> {
        if self.get_mut(widget)?.binding.take().is_none() {
            return Ok(());
        }
        let children = self.get(widget)?.children.clone();
        for child in children {
            self.drop_subtree(child)?;
        }
        if let Some(ctl) = self.get_mut(widget)?.controller.as_mut() {
            ctl.reset_binding();
        }
        self.queue_recalculation(widget);
        Ok(())
    }

    /// Set the filter of a bound widget.
    pub fn set_filter(&mut self, widget: WidgetId, filter: Option<Filter>) -> Result<()> {
        self.update_binding(widget, |b| b.filter = filter)
    }

    /// Set the sort of a bound widget.
    pub fn set_sort(&mut self, widget: WidgetId, sort: Option<SortKey>) -> Result<()> {
        self.update_binding(widget, |b| b.sort = sort)
    }

    /// Mutate a binding and invalidate the cached queries.
    fn update_binding(&mut self, widget: WidgetId, f: impl FnOnce(&mut DataBinding)) -> Result<()> {
        let node = self.get_mut(widget)?;
        let binding = node
            .binding
            .as_mut()
            .ok_or_else(|| Error::Invalid(format!("widget {widget:?} has no data binding")))?;
        f(binding);
        if let Some(ctl) = node.controller.as_mut() {
            ctl.invalidate_queries();
        }
        self.queue_recalculation(widget);
        Ok(())
    }

    /// Queue a widget for recalculation on the next update.
    pub fn queue_recalculation(&mut self, widget: WidgetId) {
        if !self.pending.contains(&widget) {
            trace!(?widget, "queueing recalculation");
            self.pending.push(widget);
        }
    }

    /// Queue the widget that owns this widget's geometry: its parent, or the
    /// widget itself when it is a root.
    pub(crate) fn queue_owner(&mut self, widget: WidgetId) {
        let owner = self.parent(widget).unwrap_or(widget);
        self.queue_recalculation(owner);
    }

    /// True if recalculations or template loads are queued.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || self.templates.has_pending()
    }

    /// Run queued template loads, queueing the owner of every waiting widget
    /// that still exists and still has a controller.
    pub fn process_template_loads(&mut self) {
        for widget in self.templates.run_jobs() {
            match self.nodes.get(widget) {
                Some(node) if node.controller.is_some() => self.queue_owner(widget),
                _ => debug!(?widget, "template load finished for a widget that is gone"),
            }
        }
    }

    /// Recalculate every queued widget once. Recalculations queued while
    /// running are left for the next call. A widget that fails does not stop
    /// the rest of the queue; the first failure is returned afterwards.
    pub fn run_pending(&mut self) -> Result<()> {
        let queued = mem::take(&mut self.pending);
        let mut done = HashSet::new();
        let mut first_err = None;
        for widget in queued {
            if !self.nodes.contains_key(widget) || !done.insert(widget) {
                continue;
            }
            // A queued ancestor recalculates this subtree as well.
            if done.iter().any(|d| self.is_ancestor(*d, widget)) {
                continue;
            }
            if let Err(e) = self.recalculate_hierarchy(widget) {
                error!(?widget, error = %e, "queued recalculation failed");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Advance one frame: pan physics, template loads, then queued
    /// recalculations.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        self.step_frame(Some(dt))
    }

    /// Advance one frame, taking each controller's frame delta from its
    /// stopwatch.
    pub fn tick(&mut self) -> Result<()> {
        self.step_frame(None)
    }

    /// Run every phase of a frame even when an earlier one fails, returning
    /// the first failure.
    fn step_frame(&mut self, dt: Option<f32>) -> Result<()> {
        let pans = self.advance_pans(dt);
        self.process_template_loads();
        let pending = self.run_pending();
        pans.and(pending)
    }

    /// Run template loads and recalculations until nothing is queued.
    /// Returns the number of rounds taken.
    pub fn settle(&mut self) -> Result<usize> {
        let mut rounds = 0;
        while self.has_pending() {
            if rounds >= self.config.max_sweeps {
                return Err(Error::Invalid(format!(
                    "scene did not settle after {rounds} rounds"
                )));
            }
            self.process_template_loads();
            self.run_pending()?;
            rounds += 1;
        }
        Ok(rounds)
    }

    /// Clone a template subtree under a parent. Returns the new subtree root.
    pub(crate) fn instantiate(
        &mut self,
        parent: WidgetId,
        template: &TemplateNode,
    ) -> Result<WidgetId> {
        let root = self.add(&template.name, template.style.clone());
        self.link(parent, root)?;
        let mut stack: Vec<(&TemplateNode, WidgetId)> = vec![(template, root)];
        while let Some((tn, id)) = stack.pop() {
            for child in &tn.children {
                let cid = self.add(&child.name, child.style.clone());
                self.link(id, cid)?;
                stack.push((child, cid));
            }
        }
        Ok(root)
    }

    /// Viewport extent of the nearest scrolling ancestor along an axis, or
    /// the screen extent when there is none.
    pub(crate) fn scroll_viewport(&self, widget: WidgetId, axis: Axis) -> i32 {
        let mut current = self.parent(widget);
        while let Some(id) = current {
            if let Some(ctl) = self.nodes.get(id).and_then(|n| n.controller.as_ref())
                && ctl.axis == axis
                && ctl.viewport > 0
            {
                return ctl.viewport;
            }
            current = self.parent(id);
        }
        self.screen.get(axis)
    }
}

impl StyleAccessor for Scene {
    fn modifier_context(&self, widget: WidgetId) -> ModifierContext {
        self.nodes
            .get(widget)
            .map(|n| n.style.context(n.modifiers))
            .unwrap_or_default()
    }

    fn style_value(
        &self,
        widget: WidgetId,
        id: StyleValueId,
        ctx: &ModifierContext,
    ) -> Option<StyleValue> {
        self.nodes.get(widget).and_then(|n| n.style.lookup(id, ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SizeValue;

    #[test]
    fn attach_rejects_cycles_and_double_parents() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(10, 10));
        let a = scene.add("a", Style::default());
        let b = scene.add_child(a, "b", Style::default())?;
        let c = scene.add_child(b, "c", Style::default())?;
        assert_eq!(scene.attach(c, a), Err(Error::WouldCreateCycle { parent: c, child: a }));
        assert_eq!(scene.attach(a, c), Err(Error::AlreadyAttached(c)));
        assert!(scene.is_ancestor(a, c));
        assert_eq!(scene.children(a), &[b]);
        Ok(())
    }

    #[test]
    fn remove_subtree_drops_descendants() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(10, 10));
        let a = scene.add("a", Style::default());
        let b = scene.add_child(a, "b", Style::default())?;
        scene.add_child(b, "c", Style::default())?;
        scene.remove_subtree(b)?;
        assert_eq!(scene.len(), 1);
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.remove_subtree(b), Err(Error::WidgetNotFound(b)));
        Ok(())
    }

    #[test]
    fn style_accessor_uses_modifiers() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(10, 10));
        let a = scene.add(
            "a",
            Style::default()
                .width(SizeValue::Fixed(1))
                .variant(Modifiers::HOVER, Style::default().width(SizeValue::Fixed(2))),
        );
        let ctx = scene.modifier_context(a);
        assert_eq!(
            scene.style_value(a, StyleValueId::Width, &ctx),
            Some(StyleValue::Size(SizeValue::Fixed(1)))
        );
        scene.set_modifiers(a, Modifiers::HOVER)?;
        let ctx = scene.modifier_context(a);
        assert_eq!(
            scene.style_value(a, StyleValueId::Width, &ctx),
            Some(StyleValue::Size(SizeValue::Fixed(2)))
        );
        Ok(())
    }

    #[test]
    fn instantiate_clones_template_tree() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(10, 10));
        let list = scene.add("list", Style::default());
        let tn = TemplateNode::new("item", Style::default())
            .child(TemplateNode::new("label", Style::default()))
            .child(TemplateNode::new("icon", Style::default()));
        let item = scene.instantiate(list, &tn)?;
        let names: Vec<&str> = scene
            .children(item)
            .iter()
            .filter_map(|c| scene.node(*c).map(|n| n.name()))
            .collect();
        assert_eq!(names, vec!["label", "icon"]);
        Ok(())
    }

    #[test]
    fn queue_dedups() {
        let mut scene = Scene::new(Expanse::new(10, 10));
        let a = scene.add("a", Style::default());
        scene.queue_recalculation(a);
        scene.queue_recalculation(a);
        assert_eq!(scene.pending.len(), 1);
        assert!(scene.has_pending());
    }
}
