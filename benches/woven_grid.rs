use criterion::{black_box, criterion_group, criterion_main, Criterion};

use knotwork::{
    generators::{rosette, woven_grid},
    CrossingPoints, KnotEffect,
};

fn find_crossings(c: &mut Criterion) {
    let straight = woven_grid(10, 10.0, 0.0);
    let wavy = woven_grid(10, 10.0, 2.0);

    c.bench_function("crossings: straight grid", |b| {
        b.iter(|| black_box(CrossingPoints::build(&straight)))
    });
    c.bench_function("crossings: wavy grid", |b| {
        b.iter(|| black_box(CrossingPoints::build(&wavy)))
    });
}

fn carve(c: &mut Criterion) {
    let paths = woven_grid(10, 10.0, 2.0);
    let widths = vec![1.0; paths.len()];
    let mut effect = KnotEffect::default();
    effect
        .before_effect(paths.clone(), widths.clone(), &[])
        .unwrap();

    c.bench_function("carve: wavy grid", |b| {
        b.iter(|| black_box(effect.do_effect(&paths).unwrap()))
    });

    let rose = vec![rosette(12, 50.0)];
    let mut effect = KnotEffect::default();
    effect.before_effect(rose.clone(), vec![1.0], &[]).unwrap();
    c.bench_function("carve: rosette", |b| {
        b.iter(|| black_box(effect.do_effect(&rose).unwrap()))
    });
}

fn full_pipeline(c: &mut Criterion) {
    let paths = woven_grid(10, 10.0, 2.0);
    let widths = vec![1.0; paths.len()];
    let mut effect = KnotEffect::default();
    let persisted = effect
        .before_effect(paths.clone(), widths.clone(), &[])
        .unwrap();

    c.bench_function("rebuild and carve: wavy grid", |b| {
        b.iter(|| {
            let mut effect = KnotEffect::default();
            effect
                .before_effect(paths.clone(), widths.clone(), &persisted)
                .unwrap();
            black_box(effect.do_effect(&paths).unwrap())
        })
    });
}

criterion_group!(benches, find_crossings, carve, full_pipeline);
criterion_main!(benches);
