use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{Coord, LineString};
use incline::{
    dem::{GeoTransform, Raster},
    InclineCalculator, Method,
};

const CELL: f64 = 1.0 / 10800.0;

/// Synthetic 1/3 arc-second tile of rolling terrain near Seattle.
fn tile() -> Raster {
    let origin = Coord {
        x: -122.4,
        y: 47.7,
    };
    let transform = GeoTransform::north_up(origin, CELL, CELL).unwrap();
    let samples = (0..512 * 512)
        .map(|i| {
            let (row, col) = ((i / 512) as f32, (i % 512) as f32);
            100.0 + 20.0 * (row / 40.0).sin() + 15.0 * (col / 25.0).cos()
        })
        .collect();
    Raster::new(512, 512, samples, transform, Some(-9999.0)).unwrap()
}

fn edges() -> Vec<LineString> {
    (0..1000)
        .map(|i| {
            let (row, col) = (f64::from(i / 40) * 20.0 + 5.3, f64::from(i % 40) * 12.0 + 3.7);
            let at = |c: f64, r: f64| Coord {
                x: -122.4 + c * CELL,
                y: 47.7 - r * CELL,
            };
            LineString::from(vec![at(col, row), at(col + 6.2, row + 3.1)])
        })
        .collect()
}

fn infer_incline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Infer Incline");
    let raster = tile();
    let edges = edges();

    for method in [Method::Idw, Method::Bilinear, Method::Spline] {
        let calc = InclineCalculator::builder().method(method).build().unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(method),
            &(calc, &raster, &edges),
            |b, (calc, raster, edges)| {
                b.iter(|| {
                    edges
                        .iter()
                        .filter_map(|line| calc.infer_incline(line, raster).unwrap())
                        .count()
                })
            },
        );
    }
}

criterion_group!(benches, infer_incline);
criterion_main!(benches);
