// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_graph::{Crop, Graph, NodeId, Nop, SolidColor};
use understory_projection::{Projection, ProjectionConfig, SplitPolicy};
use understory_region::Rect;

/// Color → crop → a chain of `depth` pass-through nodes.
fn build_chain(depth: usize) -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::new();
    let color = graph.add_node(SolidColor::rgba8([32, 64, 128, 255]));
    let crop = graph.add_node(Crop::new(Rect::new(0, 0, 1024, 1024)));
    graph
        .connect(color, "output", crop, "input")
        .expect("fresh pads");
    let mut last = crop;
    for _ in 0..depth {
        let next = graph.add_node(Nop);
        graph
            .connect(last, "output", next, "input")
            .expect("fresh pads");
        last = next;
    }
    (graph, color, last)
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_projection");
    group.sample_size(20);

    for policy in [SplitPolicy::Halve, SplitPolicy::TileAligned] {
        group.bench_function(format!("render_512x512({policy:?})"), |b| {
            b.iter_batched(
                || {
                    let (mut graph, _, out) = build_chain(4);
                    let config = ProjectionConfig::default().with_split_policy(policy);
                    let projection = Projection::new(&mut graph, out, config).expect("live node");
                    (graph, projection)
                },
                |(mut graph, mut projection)| {
                    projection.update_rect(Rect::new(0, 0, 512, 512));
                    black_box(projection.render(&mut graph));
                    (graph, projection)
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("invalidate_and_repair(64 damages)", |b| {
        b.iter_batched(
            || {
                let (mut graph, color, out) = build_chain(2);
                let mut projection = Projection::new(&mut graph, out, ProjectionConfig::default())
                    .expect("live node");
                projection.update_rect(Rect::new(0, 0, 512, 512));
                projection.render(&mut graph);
                (graph, color, projection)
            },
            |(mut graph, color, mut projection)| {
                for i in 0..64 {
                    let at = (i * 8) % 512;
                    graph
                        .invalidate(color, Rect::new(at, at, 16, 16))
                        .expect("live node");
                }
                projection.poll_dirty(&mut graph);
                projection.update_rect(Rect::new(0, 0, 512, 512));
                black_box(projection.render(&mut graph));
                (graph, projection)
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("processor_work(64x64 chunks)", |b| {
        b.iter_batched(
            || {
                let (mut graph, _, out) = build_chain(1);
                let projection = Projection::new(&mut graph, out, ProjectionConfig::default())
                    .expect("live node");
                (graph, projection)
            },
            |(mut graph, mut projection)| {
                let mut processor = projection.processor().with_chunk_area(64 * 64);
                processor.set_rectangle(Rect::new(0, 0, 256, 256));
                while processor.work(&mut graph) {}
                black_box(processor.progress());
                drop(processor);
                (graph, projection)
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
