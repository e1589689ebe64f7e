//! Sample scenes for the arbor command-line demo.

use std::sync::Arc;

use arbor::{
    Align, DataValue, LayoutConfig, Length, MemoryTemplates, Orientation, Result, Row, Scene, SizeValue,
    SourceId, Style, Template, TemplateNode, VecDataSource, WidgetId,
    geom::{Edges, Expanse},
};

/// Template name every demo item is registered under.
const ITEM_TEMPLATE: &str = "item";

/// Template for a list row: a fixed-height strip with a label and a badge.
fn row_template(height: i32) -> Template {
    Template {
        root: TemplateNode::new(
            "row",
            Style::default()
                .flex(Orientation::Horizontal)
                .height(SizeValue::Fixed(height))
                .padding(Edges {
                    left: Length::Fixed(2),
                    right: Length::Fixed(2),
                    ..Edges::all(Length::Fixed(0))
                })
                .secondary_align(Align::Center),
        )
        .child(TemplateNode::new("label", Style::default().grow(1.0)))
        .child(TemplateNode::new("badge", Style::default().fixed(4, 1))),
    }
}

/// Template for a grid tile.
fn tile_template(size: i32) -> Template {
    Template {
        root: TemplateNode::new("tile", Style::default().fixed(size, size)),
    }
}

/// Numbered rows for the demo data source.
fn rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::default()
                .with("n", DataValue::Int(i as i64))
                .with("label", DataValue::Text(format!("item {i}")))
        })
        .collect()
}

/// A header, a virtualized list that takes the remaining height, and a
/// footer. Returns the scene, its root and the list.
pub fn list_scene(
    screen: Expanse,
    config: LayoutConfig,
    count: usize,
    item_height: i32,
) -> Result<(Scene, WidgetId, WidgetId)> {
    let mut templates = MemoryTemplates::default();
    templates.insert(ITEM_TEMPLATE, row_template(item_height));
    let mut scene = Scene::new(screen)
        .with_config(config)
        .with_templates(Box::new(templates));

    let root = scene.add("root", Style::default().flex(Orientation::Vertical));
    scene.add_child(root, "header", Style::default().height(SizeValue::Fixed(3)))?;
    let list = scene.add_child(
        root,
        "list",
        Style::default().flex(Orientation::Vertical).grow(1.0),
    )?;
    scene.add_child(root, "footer", Style::default().height(SizeValue::Fixed(1)))?;

    let source = Arc::new(VecDataSource::new(SourceId(1), rows(count)));
    scene.bind_data(list, source, ITEM_TEMPLATE)?;
    scene.settle()?;
    Ok((scene, root, list))
}

/// A virtualized grid of square tiles filling the screen.
pub fn grid_scene(
    screen: Expanse,
    config: LayoutConfig,
    count: usize,
    tile: i32,
) -> Result<(Scene, WidgetId, WidgetId)> {
    let mut templates = MemoryTemplates::default();
    templates.insert(ITEM_TEMPLATE, tile_template(tile));
    let mut scene = Scene::new(screen)
        .with_config(config)
        .with_templates(Box::new(templates));

    let root = scene.add(
        "root",
        Style::default()
            .grid(Orientation::Vertical)
            .padding(Edges::all(Length::Fixed(1))),
    );
    let source = Arc::new(VecDataSource::new(SourceId(1), rows(count)));
    scene.bind_data(root, source, ITEM_TEMPLATE)?;
    scene.settle()?;
    Ok((scene, root, root))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_fills_between_header_and_footer() -> Result<()> {
        let (scene, _, list) = list_scene(Expanse::new(40, 24), LayoutConfig::default(), 100, 2)?;
        let node = scene.node(list).expect("list");
        assert_eq!(node.rect().tl.y, 3);
        assert_eq!(node.size(), Expanse::new(40, 20));
        // Ten visible rows plus one of overscan.
        assert_eq!(scene.children(list).len(), 11);
        assert_eq!(scene.maximum_virtual_scroll_position(list)?, 180);
        Ok(())
    }

    #[test]
    fn grid_packs_tiles_into_columns() -> Result<()> {
        let (scene, _, grid) = grid_scene(Expanse::new(32, 20), LayoutConfig::default(), 50, 10)?;
        let ctl = scene.controller(grid)?;
        assert_eq!(ctl.columns(), 3);
        assert_eq!(ctl.data_count(), 50);
        Ok(())
    }
}
