//! Integration tests for data-bound, virtualized flex and grid containers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arbor::{
        DataValue, Error, Filter, FilterOp, LayoutConfig, MemoryTemplates, Orientation, Result,
        Row, Scene, SizeValue, SortKey, SortOrder, SourceId, Style, Template, TemplateNode,
        VecDataSource, WidgetId,
        geom::{Expanse, Rect},
    };
    use pretty_assertions::assert_eq;

    fn rows(n: i64) -> Vec<Row> {
        (0..n).map(|i| Row::default().with("n", DataValue::Int(i))).collect()
    }

    fn templates(root: TemplateNode) -> Box<MemoryTemplates> {
        let mut t = MemoryTemplates::default();
        t.insert("row", Template { root });
        Box::new(t)
    }

    fn row_template() -> TemplateNode {
        TemplateNode::new("row", Style::default().height(SizeValue::Fixed(20)))
    }

    /// A 200x100 vertical list bound to `n` numbered rows.
    fn list(n: i64) -> Result<(Scene, WidgetId, Arc<VecDataSource>)> {
        let mut scene =
            Scene::new(Expanse::new(200, 100)).with_templates(templates(row_template()));
        let list = scene.add("list", Style::default().flex(Orientation::Vertical));
        let src = Arc::new(VecDataSource::new(SourceId(1), rows(n)));
        scene.bind_data(list, src.clone(), "row")?;
        scene.settle()?;
        Ok((scene, list, src))
    }

    fn indices(scene: &Scene, list: WidgetId) -> Vec<Option<usize>> {
        scene
            .children(list)
            .iter()
            .map(|c| scene.node(*c).expect("item").data_index())
            .collect()
    }

    #[test]
    fn window_covers_viewport_plus_overscan() -> Result<()> {
        let (scene, list, src) = list(1000)?;
        assert_eq!(scene.children(list).len(), 6);
        assert_eq!(indices(&scene, list), (0..6).map(Some).collect::<Vec<_>>());
        let ys: Vec<i32> = scene
            .children(list)
            .iter()
            .map(|c| scene.node(*c).expect("item").rect().tl.y)
            .collect();
        assert_eq!(ys, vec![0, 20, 40, 60, 80, 100]);
        assert_eq!(src.lock_count(), 1);
        assert_eq!(src.active_readers(), 0);

        let ctl = scene.controller(list)?;
        assert_eq!(ctl.data_count(), 1000);
        assert_eq!(ctl.item_extent(), Some(20));
        assert_eq!(scene.maximum_virtual_scroll_position(list)?, 1000 * 20 - 100);
        let first = scene.children(list)[0];
        assert_eq!(
            scene.node(first).expect("item").data().and_then(|r| r.get("n")),
            Some(&DataValue::Int(0))
        );
        Ok(())
    }

    #[test]
    fn short_data_spawns_only_what_exists() -> Result<()> {
        let (scene, list, _) = list(3)?;
        assert_eq!(indices(&scene, list), vec![Some(0), Some(1), Some(2)]);
        assert_eq!(scene.maximum_virtual_scroll_position(list)?, 0);
        Ok(())
    }

    #[test]
    fn rebinds_only_when_the_range_moves() -> Result<()> {
        let (mut scene, list, src) = list(1000)?;
        scene.recalculate_hierarchy(list)?;
        assert_eq!(src.lock_count(), 1);

        scene.set_virtual_scroll_position(list, 10.0)?;
        assert_eq!(src.lock_count(), 1);
        let first = scene.children(list)[0];
        assert_eq!(scene.node(first).expect("item").rect().tl.y, -10);

        scene.set_virtual_scroll_position(list, 40.0)?;
        assert_eq!(src.lock_count(), 2);
        assert_eq!(scene.controller(list)?.visible_range(), Some((2, 8)));
        assert_eq!(indices(&scene, list), (2..8).map(Some).collect::<Vec<_>>());
        assert_eq!(scene.node(first).expect("item").rect().tl.y, 0);

        scene.set_virtual_scroll_position(list, 45.0)?;
        assert_eq!(src.lock_count(), 2);
        assert_eq!(scene.node(first).expect("item").rect().tl.y, -5);
        Ok(())
    }

    #[test]
    fn template_loads_on_a_later_frame() -> Result<()> {
        let mut scene =
            Scene::new(Expanse::new(200, 100)).with_templates(templates(row_template()));
        let list = scene.add("list", Style::default().flex(Orientation::Vertical));
        let src = Arc::new(VecDataSource::new(SourceId(1), rows(50)));
        scene.bind_data(list, src, "row")?;

        scene.update(0.0)?;
        assert!(scene.children(list).is_empty());
        assert_eq!(scene.maximum_virtual_scroll_position(list)?, 0);
        assert!(scene.has_pending());

        scene.update(0.0)?;
        assert_eq!(scene.children(list).len(), 6);
        assert!(!scene.has_pending());
        Ok(())
    }

    #[test]
    fn missing_template_keeps_retrying() -> Result<()> {
        let config = LayoutConfig {
            max_sweeps: 8,
            ..LayoutConfig::default()
        };
        let mut scene = Scene::new(Expanse::new(200, 100)).with_config(config);
        let list = scene.add("list", Style::default().flex(Orientation::Vertical));
        let src = Arc::new(VecDataSource::new(SourceId(1), rows(5)));
        scene.bind_data(list, src, "nowhere")?;
        assert!(matches!(scene.settle(), Err(Error::Invalid(_))));
        assert!(scene.children(list).is_empty());
        Ok(())
    }

    #[test]
    fn shrinking_viewport_trims_on_the_next_pass() -> Result<()> {
        let (mut scene, list, _) = list(1000)?;
        scene.set_style(
            list,
            Style::default()
                .flex(Orientation::Vertical)
                .height(SizeValue::Fixed(40)),
        )?;
        scene.update(0.0)?;
        // The window never shrinks within a pass.
        assert_eq!(scene.children(list).len(), 6);
        assert!(scene.has_pending());

        scene.settle()?;
        assert_eq!(scene.children(list).len(), 3);
        assert_eq!(indices(&scene, list), vec![Some(0), Some(1), Some(2)]);
        Ok(())
    }

    #[test]
    fn growing_viewport_spawns_more() -> Result<()> {
        let (mut scene, list, _) = list(1000)?;
        scene.set_screen(Expanse::new(200, 200));
        scene.settle()?;
        assert_eq!(scene.children(list).len(), 11);
        Ok(())
    }

    #[test]
    fn unknown_item_extent_is_measured() -> Result<()> {
        let template = TemplateNode::new("row", Style::default().height(SizeValue::FitContent))
            .child(TemplateNode::new("label", Style::default().fixed(50, 25)));
        let mut scene = Scene::new(Expanse::new(200, 100)).with_templates(templates(template));
        let list = scene.add("list", Style::default().flex(Orientation::Vertical));
        let src = Arc::new(VecDataSource::new(SourceId(1), rows(100)));
        scene.bind_data(list, src, "row")?;
        scene.settle()?;

        let ctl = scene.controller(list)?;
        assert_eq!(ctl.item_extent(), Some(25));
        assert_eq!(scene.children(list).len(), 5);
        let last = scene.children(list)[4];
        assert_eq!(scene.node(last).expect("item").rect(), Rect::new(0, 100, 200, 25));
        Ok(())
    }

    #[test]
    fn grid_wraps_cells_into_columns() -> Result<()> {
        let template = TemplateNode::new("cell", Style::default().fixed(30, 20));
        let mut scene = Scene::new(Expanse::new(100, 100)).with_templates(templates(template));
        let grid = scene.add("grid", Style::default().grid(Orientation::Vertical));
        let src = Arc::new(VecDataSource::new(SourceId(1), rows(100)));
        scene.bind_data(grid, src, "row")?;
        scene.settle()?;

        let ctl = scene.controller(grid)?;
        assert_eq!(ctl.columns(), 3);
        assert_eq!(scene.children(grid).len(), 18);
        assert_eq!(scene.maximum_virtual_scroll_position(grid)?, 34 * 20 - 100);
        let fifth = scene.children(grid)[4];
        assert_eq!(scene.node(fifth).expect("cell").rect(), Rect::new(30, 20, 30, 20));

        scene.set_virtual_scroll_position(grid, 40.0)?;
        assert_eq!(scene.controller(grid)?.visible_range(), Some((6, 24)));
        assert_eq!(indices(&scene, grid)[0], Some(6));
        Ok(())
    }

    #[test]
    fn filter_and_sort_reorder_the_view() -> Result<()> {
        let (mut scene, list, _) = list(1000)?;
        scene.set_filter(
            list,
            Some(Filter {
                property: "n".into(),
                op: FilterOp::Lt,
                value: DataValue::Int(3),
            }),
        )?;
        scene.settle()?;
        assert_eq!(scene.controller(list)?.data_count(), 3);
        assert_eq!(indices(&scene, list), vec![Some(0), Some(1), Some(2)]);

        scene.set_filter(list, None)?;
        scene.set_sort(
            list,
            Some(SortKey {
                property: "n".into(),
                order: SortOrder::Descending,
            }),
        )?;
        scene.settle()?;
        let first = scene.children(list)[0];
        assert_eq!(
            scene.node(first).expect("item").data().and_then(|r| r.get("n")),
            Some(&DataValue::Int(999))
        );
        Ok(())
    }

    #[test]
    fn unsupported_sort_falls_back_to_source_order() -> Result<()> {
        let (mut scene, list, _) = list(10)?;
        scene.set_sort(
            list,
            Some(SortKey {
                property: "missing".into(),
                order: SortOrder::Ascending,
            }),
        )?;
        scene.settle()?;
        assert_eq!(&scene.controller(list)?.view_order()[..3], &[0, 1, 2]);
        Ok(())
    }

    #[test]
    fn appended_rows_extend_the_range() -> Result<()> {
        let (mut scene, list, src) = list(10)?;
        assert_eq!(scene.maximum_virtual_scroll_position(list)?, 100);
        src.push_rows(rows(5));
        scene.recalculate_hierarchy(list)?;
        assert_eq!(scene.controller(list)?.data_count(), 15);
        assert_eq!(scene.maximum_virtual_scroll_position(list)?, 200);
        Ok(())
    }

    #[test]
    fn unbinding_removes_items() -> Result<()> {
        let (mut scene, list, _) = list(100)?;
        scene.unbind_data(list)?;
        scene.settle()?;
        assert!(scene.children(list).is_empty());
        assert_eq!(scene.controller(list)?.data_count(), 0);
        Ok(())
    }

    #[test]
    fn nested_fit_content_list_follows_the_outer_scroll() -> Result<()> {
        let mut scene =
            Scene::new(Expanse::new(200, 100)).with_templates(templates(row_template()));
        let outer = scene.add("outer", Style::default().flex(Orientation::Vertical));
        let header = scene.add_child(outer, "header", Style::default().height(SizeValue::Fixed(30)))?;
        let inner = scene.add_child(
            outer,
            "inner",
            Style::default()
                .flex(Orientation::Vertical)
                .height(SizeValue::FitContent),
        )?;
        let src = Arc::new(VecDataSource::new(SourceId(1), rows(100)));
        scene.bind_data(inner, src, "row")?;
        scene.settle()?;

        assert_eq!(scene.node(inner).expect("inner").size().h, 2000);
        assert_eq!(scene.maximum_virtual_scroll_position(outer)?, 2030 - 100);
        assert_eq!(scene.children(inner).len(), 6);

        scene.set_virtual_scroll_position(outer, 530.0)?;
        assert_eq!(scene.node(header).expect("header").screen_rect().tl.y, -530);
        assert_eq!(scene.virtual_scroll_position(inner)?, 500.0);
        assert_eq!(scene.controller(inner)?.visible_range(), Some((25, 31)));
        let first = scene.children(inner)[0];
        let node = scene.node(first).expect("item");
        assert_eq!(node.data_index(), Some(25));
        assert_eq!(node.screen_rect().tl.y, 0);
        Ok(())
    }
}
