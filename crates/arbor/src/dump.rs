use std::fmt::{self, Write};

use geom::{Edges, Rect};
use serde::Serialize;

use crate::{
    error::{Error, Result},
    id::WidgetId,
    scene::Scene,
};

/// Traverses a tree of widgets and returns a string showing the widget names
/// and committed geometry for each widget. This is a debug function.
pub fn dump(scene: &Scene, root: WidgetId) -> Result<String> {
    let mut out = String::new();
    dump_node(&mut out, scene, root, 0)?;
    Ok(out)
}

/// Helper to write an indented label followed by a value.
fn write_field(out: &mut String, indent: &str, label: &str, value: &str) -> Result<()> {
    writeln!(out, "{indent}  {label} {value}").map_err(|e| Error::Invalid(e.to_string()))
}

/// Walk a widget subtree and emit formatted debug output.
fn dump_node(out: &mut String, scene: &Scene, widget: WidgetId, level: usize) -> Result<()> {
    let node = scene.node(widget).ok_or(Error::WidgetNotFound(widget))?;
    let indent = "    ".repeat(level);
    let fmt_err = |e: fmt::Error| Error::Invalid(e.to_string());

    write!(out, "{indent}{} {widget:?}", node.name()).map_err(fmt_err)?;
    let mut indicators = Vec::new();
    if node.hidden() {
        indicators.push("hidden".to_string());
    }
    if !node.laid_out() {
        indicators.push("unlaid".to_string());
    }
    if let Some(i) = node.data_index() {
        indicators.push(format!("item {i}"));
    }
    if !indicators.is_empty() {
        write!(out, " [{}]", indicators.join(", ")).map_err(fmt_err)?;
    }
    writeln!(out).map_err(fmt_err)?;

    let r = node.rect();
    write_field(
        out,
        &indent,
        "rect:",
        &format!("x: {}, y: {}, w: {}, h: {}", r.tl.x, r.tl.y, r.w, r.h),
    )?;
    let s = node.screen_rect();
    write_field(
        out,
        &indent,
        "screen:",
        &format!("x: {}, y: {}, w: {}, h: {}", s.tl.x, s.tl.y, s.w, s.h),
    )?;
    if let Some(ctl) = node.controller() {
        write_field(
            out,
            &indent,
            "scroll:",
            &format!(
                "virtual {}, physical {}, visible {:?}",
                ctl.virtual_scroll_position(),
                ctl.scroll_position(),
                ctl.visible_range()
            ),
        )?;
    }

    if !node.hidden() {
        for child in node.children() {
            dump_node(out, scene, *child, level + 1)?;
        }
    }
    Ok(())
}

/// Serializable snapshot of a committed widget subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDump {
    /// Widget name.
    pub name: String,
    /// Outer rectangle relative to the parent.
    pub rect: Rect,
    /// Outer rectangle in screen space.
    pub screen_rect: Rect,
    /// Padding plus margin.
    pub insets: Edges<i32>,
    /// True if hidden.
    pub hidden: bool,
    /// Bound item index, for item widgets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_index: Option<usize>,
    /// Logical scroll position, for flex and grid widgets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll: Option<f32>,
    /// Children in layout order.
    pub children: Vec<LayoutDump>,
}

impl LayoutDump {
    /// Snapshot a subtree.
    pub fn capture(scene: &Scene, root: WidgetId) -> Result<Self> {
        let node = scene.node(root).ok_or(Error::WidgetNotFound(root))?;
        let children = node
            .children()
            .iter()
            .map(|c| Self::capture(scene, *c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: node.name().to_string(),
            rect: node.rect(),
            screen_rect: node.screen_rect(),
            insets: node.padding().plus(&node.margin()),
            hidden: node.hidden(),
            data_index: node.data_index(),
            scroll: node.controller().map(|c| c.virtual_scroll_position()),
            children,
        })
    }
}

/// Serialize a committed subtree as pretty-printed JSON.
pub fn dump_json(scene: &Scene, root: WidgetId) -> Result<String> {
    let dump = LayoutDump::capture(scene, root)?;
    serde_json::to_string_pretty(&dump).map_err(|e| Error::Invalid(e.to_string()))
}
