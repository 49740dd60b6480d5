// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_region::{Rect, Region};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_i32(&mut self, upper_exclusive: i32) -> i32 {
        (self.next_u32() % upper_exclusive as u32) as i32
    }

    fn rect(&mut self, canvas: i32, max_side: i32) -> Rect {
        Rect::new(
            self.gen_range_i32(canvas),
            self.gen_range_i32(canvas),
            1 + self.gen_range_i32(max_side),
            1 + self.gen_range_i32(max_side),
        )
    }
}

fn random_rects(n: usize, canvas: i32, max_side: i32, seed: u64) -> Vec<Rect> {
    let mut rng = Lcg::new(seed);
    (0..n).map(|_| rng.rect(canvas, max_side)).collect()
}

fn bench_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_region");
    group.sample_size(50);

    for &n in &[64_usize, 512] {
        let rects = random_rects(n, 2048, 256, 0x5EED_0000_0000_0001);
        group.bench_function(format!("add_rect(n={n})"), |b| {
            b.iter(|| {
                let mut region = Region::new();
                for r in &rects {
                    region.add_rect(*r);
                }
                black_box(region)
            });
        });

        let holes = random_rects(n, 2048, 64, 0x5EED_0000_0000_0002);
        group.bench_function(format!("subtract_rect(n={n})"), |b| {
            b.iter_batched(
                || Region::from_rect(Rect::new(0, 0, 2048, 2048)),
                |mut region| {
                    for r in &holes {
                        region.subtract_rect(*r);
                    }
                    black_box(region)
                },
                BatchSize::SmallInput,
            );
        });

        let region: Region = rects.iter().copied().collect();
        group.bench_function(format!("rect_in(n={n})"), |b| {
            b.iter(|| {
                for r in &holes {
                    black_box(region.rect_in(*r));
                }
            });
        });
    }

    // Many small damage rects folding into one valid region, as a projection
    // sees after a long session of edits.
    let damage = random_rects(2_000, 4096, 32, 0x5EED_0000_0000_0003);
    group.bench_function("damage_fold(n=2000)", |b| {
        b.iter(|| {
            let mut valid = Region::from_rect(Rect::new(0, 0, 4096, 4096));
            let mut stale = Region::new();
            for r in &damage {
                stale.add_rect(*r);
            }
            valid.subtract_region(&stale.intersect_region(&valid));
            black_box(valid.area())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_region);
criterion_main!(benches);
