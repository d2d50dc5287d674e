use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spatial_kd::Tree;

fn grid_points(n_per_axis: usize) -> Vec<f32> {
    let mut pts = Vec::with_capacity(n_per_axis * n_per_axis * n_per_axis * 3);
    for x in 0..n_per_axis {
        for y in 0..n_per_axis {
            for z in 0..n_per_axis {
                pts.push(x as f32);
                pts.push(y as f32);
                pts.push(z as f32);
            }
        }
    }
    pts
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_data");
    for n_per_axis in [4usize, 8, 16] {
        let pts = grid_points(n_per_axis);
        let n = pts.len() / 3;
        group.bench_with_input(BenchmarkId::from_parameter(n), &pts, |b, pts| {
            b.iter(|| {
                let mut tree = Tree::init(3, 16).unwrap();
                tree.set_data(black_box(pts)).unwrap();
                black_box(&tree);
            });
        });
    }
    group.finish();
}

fn bench_all_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_pairs");
    for n_per_axis in [4usize, 8, 16] {
        let pts = grid_points(n_per_axis);
        let n = pts.len() / 3;
        let mut tree = Tree::init(3, 16).unwrap();
        tree.set_data(&pts).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &tree, |b, _| {
            b.iter(|| {
                let mut tree = Tree::init(3, 16).unwrap();
                tree.set_data(&pts).unwrap();
                tree.all_pairs(black_box(1.5)).unwrap();
                black_box(tree.neighbor_count());
            });
        });
    }
    group.finish();
}

fn bench_all_pairs_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_pairs_sweep");
    for n_per_axis in [4usize, 8, 16] {
        let pts = grid_points(n_per_axis);
        let n = pts.len() / 3;
        group.bench_with_input(BenchmarkId::from_parameter(n), &pts, |b, pts| {
            b.iter(|| {
                let mut tree = Tree::init(3, 16).unwrap();
                tree.set_data(pts).unwrap();
                tree.all_pairs_sweep(black_box(1.5)).unwrap();
                black_box(tree.neighbor_count());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_all_pairs, bench_all_pairs_sweep);
criterion_main!(benches);
