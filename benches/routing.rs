use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use flowroute::bundling::{BundlingSettings, EdgeBundlingCalculator};
use flowroute::graph::{EdgeRecord, NodeKind, NodeRecord};
use flowroute::routing::{EdgeCalculator, PathQuality};

/// Grid of nodes with every node linked to its right neighbor and the one
/// diagonally below it.
fn fixture(columns: usize, rows: usize) -> (Vec<NodeRecord>, Vec<EdgeRecord>) {
    let mut nodes = Vec::new();
    for row in 0..rows {
        for col in 0..columns {
            let kind = if (row + col) % 3 == 0 {
                NodeKind::Conditional
            } else {
                NodeKind::Standard
            };
            nodes.push(NodeRecord::new(
                format!("n{row}_{col}"),
                100.0 + col as f64 * 260.0,
                100.0 + row as f64 * 180.0,
                kind,
            ));
        }
    }

    let mut edges = Vec::new();
    for row in 0..rows {
        for col in 0..columns.saturating_sub(1) {
            edges.push(EdgeRecord::new(
                format!("h{row}_{col}"),
                format!("n{row}_{col}"),
                format!("n{row}_{}", col + 1),
            ));
            if row + 1 < rows {
                edges.push(EdgeRecord::new(
                    format!("d{row}_{col}"),
                    format!("n{row}_{col}"),
                    format!("n{}_{}", row + 1, col + 1),
                ));
            }
        }
    }
    (nodes, edges)
}

// Group names are kept stable so results stay comparable across runs.
fn benches_routing(c: &mut Criterion) {
    let (nodes, edges) = fixture(8, 6);
    let lookup = |id: &str| nodes.iter().find(|n| n.id == id).cloned();

    {
        let mut group = c.benchmark_group("route.cold");
        for quality in [PathQuality::Fast, PathQuality::Balanced, PathQuality::Smooth] {
            let source = lookup("n0_0").expect("fixture node");
            let target = lookup("n5_7").expect("fixture node");
            group.bench_function(quality.as_str(), |b| {
                b.iter_batched(
                    || {
                        let mut calc = EdgeCalculator::default();
                        calc.set_nodes(&nodes);
                        calc
                    },
                    |mut calc| black_box(calc.calculate_path(&source, &target, quality).waypoints.len()),
                    BatchSize::SmallInput,
                )
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("route.cached");
        let mut calc = EdgeCalculator::default();
        calc.set_nodes(&nodes);
        let source = lookup("n0_0").expect("fixture node");
        let target = lookup("n5_7").expect("fixture node");
        calc.calculate_path(&source, &target, PathQuality::Balanced);
        group.bench_function("balanced", |b| {
            b.iter(|| black_box(calc.calculate_path(&source, &target, PathQuality::Balanced).found))
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("grid.rebuild");
        group.bench_function("set_nodes", |b| {
            let mut calc = EdgeCalculator::default();
            b.iter(|| calc.set_nodes(black_box(&nodes)))
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("bundle");
        let calc = EdgeBundlingCalculator::new(BundlingSettings {
            min_edges_for_bundle: 2,
            ..BundlingSettings::default()
        });
        group.bench_function("fixture", |b| {
            b.iter(|| black_box(calc.calculate_bundles(&edges, &nodes).len()))
        });
        group.finish();
    }
}

criterion_group!(benches, benches_routing);
criterion_main!(benches);
