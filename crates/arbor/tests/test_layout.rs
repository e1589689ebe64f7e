//! Integration tests for block layout, sizing, positioning and commit.

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use arbor::{
        BoxSizing, Drawable, Error, LayoutConfig, LayoutDump, LayoutListener, LayoutType, Length,
        Orientation, Overflow, PositionType, Result, Scene, SizeValue, Style, WidgetId,
        geom::{Edges, Expanse, Point, Rect},
    };
    use pretty_assertions::assert_eq;

    fn size(scene: &Scene, id: WidgetId) -> Expanse {
        scene.node(id).expect("widget exists").size()
    }

    fn pos(scene: &Scene, id: WidgetId) -> Point {
        scene.node(id).expect("widget exists").position()
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<(WidgetId, Rect, Rect)>>>,
    }

    impl LayoutListener for Recorder {
        fn on_before_content_area_changed(&mut self, widget: WidgetId, old: Rect, new: Rect) {
            self.calls.borrow_mut().push((widget, old, new));
        }
    }

    #[derive(Clone, Default)]
    struct Rebinds {
        bounds: Rc<RefCell<Vec<Rect>>>,
    }

    impl Drawable for Rebinds {
        fn rebind(&mut self, _widget: WidgetId, bounds: Rect) {
            self.bounds.borrow_mut().push(bounds);
        }
    }

    #[test]
    fn percentage_resolves_against_parent_content() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(800, 600));
        let root = scene.add("root", Style::default().fixed(200, 100));
        let child = scene.add_child(
            root,
            "child",
            Style::default().width(SizeValue::Percent(50.0)),
        )?;
        scene.recalculate_hierarchy(root)?;
        assert_eq!(size(&scene, root), Expanse::new(200, 100));
        assert_eq!(size(&scene, child), Expanse::new(100, 100));
        Ok(())
    }

    #[test]
    fn root_auto_fills_screen() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(80, 24));
        let root = scene.add("root", Style::default());
        scene.recalculate_hierarchy(root)?;
        assert_eq!(size(&scene, root), Expanse::new(80, 24));
        scene.set_screen(Expanse::new(100, 30));
        scene.update(0.0)?;
        assert_eq!(size(&scene, root), Expanse::new(100, 30));
        Ok(())
    }

    #[test]
    fn fit_content_block_takes_widest_and_summed_height() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(800, 600));
        let root = scene.add(
            "root",
            Style::default()
                .block(Orientation::Vertical)
                .width(SizeValue::FitContent)
                .height(SizeValue::FitContent),
        );
        let a = scene.add_child(root, "a", Style::default().fixed(10, 20))?;
        let b = scene.add_child(root, "b", Style::default().fixed(20, 20))?;
        let c = scene.add_child(root, "c", Style::default().fixed(30, 20))?;
        scene.recalculate_hierarchy(root)?;

        assert_eq!(size(&scene, root), Expanse::new(30, 60));
        assert_eq!(pos(&scene, a), Point::new(0, 0));
        assert_eq!(pos(&scene, b), Point::new(0, 20));
        assert_eq!(pos(&scene, c), Point::new(0, 40));
        Ok(())
    }

    #[test]
    fn fit_content_includes_insets() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(800, 600));
        let root = scene.add(
            "root",
            Style::default()
                .block(Orientation::Horizontal)
                .width(SizeValue::FitContent)
                .height(SizeValue::FitContent)
                .padding(Edges::all(Length::Fixed(2)))
                .gap(Length::Fixed(3)),
        );
        let a = scene.add_child(root, "a", Style::default().fixed(10, 5))?;
        let b = scene.add_child(root, "b", Style::default().fixed(10, 7))?;
        scene.recalculate_hierarchy(root)?;

        assert_eq!(size(&scene, root), Expanse::new(27, 11));
        assert_eq!(pos(&scene, a), Point::new(2, 2));
        assert_eq!(pos(&scene, b), Point::new(15, 2));
        Ok(())
    }

    #[test]
    fn second_pass_is_identical_and_reports_no_changes() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(300, 200));
        let root = scene.add(
            "root",
            Style::default()
                .flex(Orientation::Horizontal)
                .padding(Edges::all(Length::Percent(5.0))),
        );
        let a = scene.add_child(root, "a", Style::default().grow(1.0))?;
        scene.add_child(root, "b", Style::default().width(SizeValue::Percent(25.0)))?;
        scene.recalculate_hierarchy(root)?;
        let first = LayoutDump::capture(&scene, root)?;
        assert!(scene.node(a).expect("a").changes().bounds_changed());

        scene.recalculate_hierarchy(root)?;
        let second = LayoutDump::capture(&scene, root)?;
        assert_eq!(first, second);
        assert!(!scene.node(a).expect("a").changes().bounds_changed());
        Ok(())
    }

    #[test]
    fn relative_and_absolute_offsets() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(800, 600));
        let root = scene.add(
            "root",
            Style::default()
                .block(Orientation::Vertical)
                .fixed(100, 100)
                .padding(Edges::all(Length::Fixed(5))),
        );
        let rel = scene.add_child(
            root,
            "rel",
            Style::default()
                .fixed(20, 20)
                .position(PositionType::Relative)
                .left(Length::Fixed(3))
                .top(Length::Percent(10.0)),
        )?;
        let abs = scene.add_child(
            root,
            "abs",
            Style::default()
                .fixed(20, 20)
                .position(PositionType::Absolute)
                .right(Length::Fixed(10))
                .bottom(Length::Fixed(10)),
        )?;
        let after = scene.add_child(root, "after", Style::default().fixed(10, 10))?;
        scene.recalculate_hierarchy(root)?;

        assert_eq!(pos(&scene, rel), Point::new(8, 14));
        assert_eq!(pos(&scene, abs), Point::new(65, 65));
        // Absolute children leave the flow.
        assert_eq!(pos(&scene, after), Point::new(5, 25));
        Ok(())
    }

    #[test]
    fn relative_end_offset_shifts_back() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(100, 100));
        let root = scene.add("root", Style::default());
        let child = scene.add_child(
            root,
            "child",
            Style::default()
                .fixed(10, 10)
                .position(PositionType::Relative)
                .right(Length::Fixed(4)),
        )?;
        scene.recalculate_hierarchy(root)?;
        assert_eq!(pos(&scene, child), Point::new(-4, 0));
        Ok(())
    }

    #[test]
    fn dynamic_position_is_external() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(100, 100));
        let root = scene.add("root", Style::default());
        let first = scene.add_child(root, "first", Style::default().fixed(10, 10))?;
        let popup = scene.add_child(
            root,
            "popup",
            Style::default()
                .fixed(30, 30)
                .position(PositionType::Dynamic),
        )?;
        let second = scene.add_child(root, "second", Style::default().fixed(10, 10))?;
        scene.set_dynamic_position(popup, Point::new(40, 50))?;
        scene.settle()?;

        assert_eq!(pos(&scene, popup), Point::new(40, 50));
        assert_eq!(pos(&scene, first), Point::new(0, 0));
        assert_eq!(pos(&scene, second), Point::new(0, 10));

        scene.set_dynamic_position(popup, Point::new(1, 2))?;
        scene.settle()?;
        assert_eq!(pos(&scene, popup), Point::new(1, 2));
        Ok(())
    }

    #[test]
    fn bounds_clamp_with_max_winning() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(800, 600));
        let root = scene.add("root", Style::default().fixed(200, 100));
        let capped = scene.add_child(
            root,
            "capped",
            Style::default()
                .width(SizeValue::Percent(50.0))
                .max_width(SizeValue::Fixed(80))
                .height(SizeValue::Fixed(10)),
        )?;
        let crossed = scene.add_child(
            root,
            "crossed",
            Style::default()
                .width(SizeValue::Fixed(10))
                .min_width(SizeValue::Fixed(150))
                .max_width(SizeValue::Fixed(120))
                .height(SizeValue::Fixed(10)),
        )?;
        let floored = scene.add_child(
            root,
            "floored",
            Style::default()
                .width(SizeValue::Fixed(10))
                .min_width(SizeValue::Percent(25.0))
                .height(SizeValue::Unconstrained),
        )?;
        scene.recalculate_hierarchy(root)?;
        assert_eq!(size(&scene, capped).w, 80);
        assert_eq!(size(&scene, crossed).w, 120);
        assert_eq!(size(&scene, floored), Expanse::new(50, 0));
        Ok(())
    }

    #[test]
    fn content_box_adds_insets() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(800, 600));
        let root = scene.add("root", Style::default());
        let child = scene.add_child(
            root,
            "child",
            Style::default()
                .fixed(50, 20)
                .box_sizing(BoxSizing::ContentBox)
                .padding(Edges::all(Length::Fixed(5)))
                .margin(Edges::all(Length::Fixed(1))),
        )?;
        scene.recalculate_hierarchy(root)?;
        let node = scene.node(child).expect("child");
        assert_eq!(node.size(), Expanse::new(62, 32));
        assert_eq!(node.content_rect(), Rect::new(6, 6, 50, 20));
        Ok(())
    }

    #[test]
    fn hidden_and_none_are_skipped() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(100, 100));
        let root = scene.add("root", Style::default());
        let gone = scene.add_child(root, "gone", Style::default().fixed(10, 10))?;
        let none = scene.add_child(
            root,
            "none",
            Style::default().fixed(10, 10).layout(LayoutType::None),
        )?;
        let kept = scene.add_child(root, "kept", Style::default().fixed(10, 10))?;
        scene.set_hidden(gone, true)?;
        scene.settle()?;

        assert!(!scene.node(gone).expect("gone").laid_out());
        assert!(!scene.node(none).expect("none").laid_out());
        assert_eq!(pos(&scene, kept), Point::new(0, 0));

        scene.set_hidden(gone, false)?;
        scene.settle()?;
        assert_eq!(pos(&scene, gone), Point::new(0, 0));
        assert_eq!(pos(&scene, kept), Point::new(0, 10));
        Ok(())
    }

    #[test]
    fn listener_sees_content_area_changes_only() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(100, 100));
        let root = scene.add("root", Style::default());
        let child = scene.add_child(
            root,
            "child",
            Style::default()
                .fixed(40, 20)
                .padding(Edges::all(Length::Fixed(2))),
        )?;
        let rec = Recorder::default();
        scene.set_listener(child, Box::new(rec.clone()))?;
        scene.settle()?;
        assert_eq!(
            rec.calls.borrow().as_slice(),
            &[(child, Rect::default(), Rect::new(2, 2, 36, 16))]
        );

        scene.recalculate_hierarchy(root)?;
        assert_eq!(rec.calls.borrow().len(), 1);

        scene.set_style(
            child,
            Style::default()
                .fixed(50, 20)
                .padding(Edges::all(Length::Fixed(2))),
        )?;
        scene.settle()?;
        assert_eq!(rec.calls.borrow().len(), 2);
        assert_eq!(rec.calls.borrow()[1].2, Rect::new(2, 2, 46, 16));
        Ok(())
    }

    #[test]
    fn padding_only_changes_follow_config() -> Result<()> {
        let run = |notify: bool| -> Result<usize> {
            let config = LayoutConfig {
                notify_padding_changes: notify,
                ..LayoutConfig::default()
            };
            let mut scene = Scene::new(Expanse::new(100, 100)).with_config(config);
            let root = scene.add("root", Style::default());
            let child = scene.add_child(root, "child", Style::default().fixed(40, 20))?;
            let rec = Recorder::default();
            scene.set_listener(child, Box::new(rec.clone()))?;
            scene.settle()?;
            scene.set_style(
                child,
                Style::default()
                    .fixed(40, 20)
                    .padding(Edges::all(Length::Fixed(1))),
            )?;
            scene.settle()?;
            assert!(scene.node(child).expect("child").changes().insets);
            let n = rec.calls.borrow().len();
            Ok(n)
        };
        assert_eq!(run(false)?, 1);
        assert_eq!(run(true)?, 2);
        Ok(())
    }

    #[test]
    fn spatial_index_tracks_clipped_visibility() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(200, 200));
        let root = scene.add(
            "root",
            Style::default()
                .block(Orientation::Vertical)
                .fixed(100, 100)
                .overflow(Overflow::Hidden),
        );
        let a = scene.add_child(root, "a", Style::default().fixed(50, 80))?;
        let b = scene.add_child(root, "b", Style::default().fixed(50, 80))?;
        let c = scene.add_child(root, "c", Style::default().fixed(50, 80))?;
        let draw = Rebinds::default();
        scene.set_drawable(b, Box::new(draw.clone()))?;
        scene.settle()?;

        let index = scene.spatial_index();
        assert_eq!(index.bounds(a), Some(Rect::new(0, 0, 50, 80)));
        assert_eq!(index.bounds(b), Some(Rect::new(0, 80, 50, 80)));
        assert_eq!(index.bounds(c), None);
        let hits = index.locate(Point::new(10, 90));
        assert!(hits.contains(&b) && hits.contains(&root) && !hits.contains(&a));
        assert_eq!(draw.bounds.borrow().as_slice(), &[Rect::new(0, 80, 50, 80)]);

        scene.set_hidden(a, true)?;
        scene.settle()?;
        let index = scene.spatial_index();
        assert_eq!(index.bounds(a), None);
        assert_eq!(index.bounds(c), Some(Rect::new(0, 80, 50, 80)));
        assert_eq!(draw.bounds.borrow().len(), 2);
        Ok(())
    }

    #[test]
    fn subtree_recalculation_keeps_committed_root() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(100, 100));
        let root = scene.add(
            "root",
            Style::default()
                .block(Orientation::Vertical)
                .padding(Edges::all(Length::Fixed(4))),
        );
        scene.add_child(root, "spacer", Style::default().fixed(10, 10))?;
        let panel = scene.add_child(root, "panel", Style::default().fixed(50, 50))?;
        let leaf = scene.add_child(panel, "leaf", Style::default().fixed(5, 5))?;
        scene.settle()?;
        assert_eq!(pos(&scene, panel), Point::new(4, 14));
        let before = scene.node(leaf).expect("leaf").screen_rect();
        assert_eq!(before, Rect::new(4, 14, 5, 5));

        scene.recalculate_hierarchy(panel)?;
        assert_eq!(pos(&scene, panel), Point::new(4, 14));
        assert_eq!(scene.node(leaf).expect("leaf").screen_rect(), before);
        Ok(())
    }

    #[test]
    fn available_child_content_area_lays_out_on_demand() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(300, 300));
        let root = scene.add(
            "root",
            Style::default()
                .fixed(200, 100)
                .padding(Edges::all(Length::Fixed(10))),
        );
        let inner = scene.add_child(
            root,
            "inner",
            Style::default().margin(Edges::all(Length::Fixed(5))),
        )?;
        assert_eq!(
            scene.available_child_content_area(inner)?,
            Expanse::new(170, 70)
        );
        assert_eq!(
            scene.available_child_content_area(root)?,
            Expanse::new(180, 80)
        );
        Ok(())
    }

    #[test]
    fn sweep_ceiling_skips_commit() -> Result<()> {
        let config = LayoutConfig {
            max_sweeps: 1,
            ..LayoutConfig::default()
        };
        let mut scene = Scene::new(Expanse::new(800, 600)).with_config(config);
        let root = scene.add(
            "root",
            Style::default()
                .width(SizeValue::FitContent)
                .height(SizeValue::FitContent),
        );
        scene.add_child(root, "a", Style::default().fixed(10, 20))?;
        scene.add_child(root, "b", Style::default().fixed(20, 20))?;
        let err = scene.recalculate_hierarchy(root);
        assert!(matches!(err, Err(Error::SweepLimit { limit: 1, .. })));
        assert!(!scene.node(root).expect("root").laid_out());
        Ok(())
    }

    #[test]
    fn failed_recalculation_does_not_drop_the_queue() -> Result<()> {
        let config = LayoutConfig {
            max_sweeps: 1,
            ..LayoutConfig::default()
        };
        let mut scene = Scene::new(Expanse::new(800, 600)).with_config(config);
        let bad = scene.add(
            "bad",
            Style::default()
                .width(SizeValue::FitContent)
                .height(SizeValue::FitContent),
        );
        scene.add_child(bad, "a", Style::default().fixed(10, 20))?;
        let good = scene.add("good", Style::default().fixed(30, 30));
        scene.queue_recalculation(bad);
        scene.queue_recalculation(good);

        let err = scene.run_pending();
        assert!(matches!(err, Err(Error::SweepLimit { limit: 1, .. })));
        assert!(!scene.node(bad).expect("bad").laid_out());
        assert!(scene.node(good).expect("good").laid_out());
        assert_eq!(size(&scene, good), Expanse::new(30, 30));
        Ok(())
    }

    #[test]
    fn recalculating_a_missing_widget_fails() -> Result<()> {
        let mut scene = Scene::new(Expanse::new(10, 10));
        let root = scene.add("root", Style::default());
        scene.remove_subtree(root)?;
        assert_eq!(
            scene.recalculate_hierarchy(root),
            Err(Error::WidgetNotFound(root))
        );
        Ok(())
    }
}
