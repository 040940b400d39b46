use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use tileworld_common::{MapObject, TileType};
use tileworld_kernel::MapOrchestrator;
use tileworld_store::{InMemorySpatialStore, LinearCoordinateConverter};

fn populated(size: i32, spacing: i32) -> MapOrchestrator {
    let map = MapOrchestrator::build(
        size,
        size,
        1,
        TileType::Plain,
        Arc::new(InMemorySpatialStore::new()),
        Arc::new(LinearCoordinateConverter::default()),
    )
    .expect("map builds");
    for y in (0..size - 2).step_by(spacing as usize) {
        for x in (0..size - 2).step_by(spacing as usize) {
            let obj = MapObject::new(format!("o-{x}-{y}"), x, y, 2, 2);
            map.try_place_object(&obj, None).expect("store works");
        }
    }
    map
}

fn bench_place(size: i32, spacing: i32) {
    let start = Instant::now();
    let map = populated(size, spacing);
    let elapsed = start.elapsed();
    let count = map
        .get_objects_in_area(0, 0, size - 1, size - 1)
        .map(|v| v.len())
        .unwrap_or(0);
    println!("  place {count} objects on {size}x{size}: total {elapsed:?}");
}

fn bench_object_at(size: i32, spacing: i32, iterations: usize) {
    let map = populated(size, spacing);
    let start = Instant::now();
    for i in 0..iterations {
        let x = ((i * 7919) % size as usize) as i32;
        let y = ((i * 104_729) % size as usize) as i32;
        let _ = black_box(map.get_object_at(black_box(x), black_box(y)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  object at point ({size}x{size}, {iterations} iters): {per_iter:?}/iter");
}

fn bench_area(size: i32, spacing: i32, area: i32, iterations: usize) {
    let map = populated(size, spacing);
    let start = Instant::now();
    for i in 0..iterations {
        let x = ((i * 31) % (size - area) as usize) as i32;
        let _ = black_box(map.get_objects_in_area(x, x, x + area - 1, x + area - 1));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  objects in {area}x{area} area ({size}x{size}, {iterations} iters): {per_iter:?}/iter");
}

fn main() {
    println!("=== Object Query Benchmarks (in-memory store) ===\n");

    println!("Placement:");
    bench_place(100, 4);
    bench_place(300, 4);

    println!("\nPoint lookup:");
    bench_object_at(100, 4, 10_000);
    bench_object_at(300, 4, 10_000);

    println!("\nArea query:");
    bench_area(300, 4, 8, 1_000);
    bench_area(300, 4, 64, 100);

    println!("\n=== Done ===");
}
