use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use junction_control::ops::{ensure_node, refresh_node_geometry};
use junction_control::{parse_snapshot, write_snapshot, ControlMap, NetworkModel, RoadInfo};
use std::hint::black_box;

/// Quadratisches Straßen-Gitter mit 100 m Maschenweite; jeder Knoten
/// steht unter Kontrolle.
fn build_grid(side: usize) -> (NetworkModel, ControlMap) {
    let node_id = |row: usize, col: usize| (row * side + col + 1) as u16;

    let mut net = NetworkModel::new();
    for row in 0..side {
        for col in 0..side {
            net.add_node(
                node_id(row, col),
                Vec3::new(col as f32 * 100.0, 0.0, row as f32 * 100.0),
            );
        }
    }

    let mut segment = 10_000u16;
    for row in 0..side {
        for col in 0..side - 1 {
            net.add_segment(segment, node_id(row, col), node_id(row, col + 1), RoadInfo::default());
            segment += 1;
        }
    }
    for row in 0..side - 1 {
        for col in 0..side {
            net.add_segment(segment, node_id(row, col), node_id(row + 1, col), RoadInfo::default());
            segment += 1;
        }
    }

    let mut map = ControlMap::new();
    for id in 1..=(side * side) as u16 {
        ensure_node(&mut map, &net, id, None).expect("Gitter-Knoten muss steuerbar sein");
    }
    (net, map)
}

fn bench_snapshot_io(c: &mut Criterion) {
    let (net, map) = build_grid(10);
    let xml = write_snapshot(&map, &net).expect("Snapshot muss schreibbar sein");

    c.bench_function("snapshot_write_100_knoten", |b| {
        b.iter(|| {
            let xml = write_snapshot(black_box(&map), &net).expect("write fehlgeschlagen");
            black_box(xml.len())
        })
    });

    c.bench_function("snapshot_parse_100_knoten", |b| {
        b.iter(|| {
            let snapshot = parse_snapshot(black_box(&xml)).expect("parse fehlgeschlagen");
            black_box(snapshot.nodes.len())
        })
    });
}

fn bench_geometry_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_refresh");

    for &side in &[10usize, 20usize] {
        let (net, mut map) = build_grid(side);
        let node_ids = map.node_ids();

        group.bench_with_input(
            BenchmarkId::new("alle_knoten", side * side),
            &net,
            |b, net| {
                b.iter(|| {
                    for &node_id in &node_ids {
                        refresh_node_geometry(&mut map, net, node_id);
                    }
                    black_box(map.segment_end_count())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(core_benches, bench_snapshot_io, bench_geometry_refresh);
criterion_main!(core_benches);
