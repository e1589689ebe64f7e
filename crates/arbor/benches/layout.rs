//! Layout benchmarks for nested flex trees and virtualized lists.

use std::sync::Arc;

use arbor::{
    DataValue, Length, MemoryTemplates, Orientation, Row, Scene, SizeValue, SourceId, Style,
    Template, TemplateNode, VecDataSource, WidgetId,
    geom::{Edges, Expanse},
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

/// Build a column of panels, each a row of growing cells.
fn nested_scene() -> (Scene, WidgetId) {
    let mut scene = Scene::new(Expanse::new(1920, 1080));
    let root = scene.add(
        "root",
        Style::default()
            .flex(Orientation::Vertical)
            .padding(Edges::all(Length::Fixed(4)))
            .gap(Length::Fixed(2)),
    );
    for p in 0..40 {
        let panel = scene
            .add_child(
                root,
                &format!("panel{p}"),
                Style::default()
                    .flex(Orientation::Horizontal)
                    .height(SizeValue::FitContent)
                    .gap(Length::Percent(1.0)),
            )
            .expect("Failed to add panel");
        for c in 0..25 {
            scene
                .add_child(
                    panel,
                    &format!("cell{c}"),
                    Style::default()
                        .grow((c % 3 + 1) as f32)
                        .height(SizeValue::Fixed(20))
                        .min_width(SizeValue::Fixed(10)),
                )
                .expect("Failed to add cell");
        }
    }
    (scene, root)
}

/// A full-screen list bound to `n` rows.
fn bound_list(n: i64) -> (Scene, WidgetId) {
    let mut templates = MemoryTemplates::default();
    templates.insert(
        "row",
        Template {
            root: TemplateNode::new("row", Style::default().height(SizeValue::Fixed(20))),
        },
    );
    let mut scene = Scene::new(Expanse::new(800, 600)).with_templates(Box::new(templates));
    let list = scene.add("list", Style::default().flex(Orientation::Vertical));
    let rows = (0..n)
        .map(|i| Row::default().with("n", DataValue::Int(i)))
        .collect();
    scene
        .bind_data(list, Arc::new(VecDataSource::new(SourceId(1), rows)), "row")
        .expect("Failed to bind data");
    scene.settle().expect("Failed to settle");
    (scene, list)
}

/// Recalculate a settled tree of a thousand flex cells.
fn benchmark_nested_flex(c: &mut Criterion) {
    c.bench_function("nested_flex_recalculate", |b| {
        let (mut scene, root) = nested_scene();
        b.iter(|| {
            scene
                .recalculate_hierarchy(root)
                .expect("Failed to recalculate");
            black_box(scene.node(root).map(|n| n.rect()));
        });
    });
}

/// Scroll a ten thousand row list, rebinding the window as it moves.
fn benchmark_virtual_scroll(c: &mut Criterion) {
    c.bench_function("virtual_list_scroll", |b| {
        let (mut scene, list) = bound_list(10_000);
        let mut pos = 0.0;
        b.iter(|| {
            pos = (pos + 137.0) % 150_000.0;
            let v = scene
                .set_virtual_scroll_position(list, pos)
                .expect("Failed to scroll");
            black_box(v);
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_nested_flex, benchmark_virtual_scroll
}
criterion_main!(benches);
