use std::time::Instant;

use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use fastrand::Rng;
use mbr_tree::{Calculator2D, Entry, Envelope, Space, SplitPolicy, Tree};

fn random_rects(rng: &mut Rng, count: u64) -> Vec<Envelope> {
    (0..count)
        .map(|_| {
            let (x, y) = (rng.f64() * 10_000., rng.f64() * 10_000.);
            let (w, h) = (rng.f64() * 20., rng.f64() * 20.);
            Envelope::new([x, y], [x + w, y + h]).unwrap()
        })
        .collect()
}

fn new_tree<const MAX: u32>(policy: SplitPolicy) -> Tree<u64, Calculator2D> {
    Tree::new(MAX, Space::cartesian(2), Calculator2D, policy).unwrap()
}

/* ---------------------------------------- Insert Delete --------------------------------------- */

fn insert_delete<const MAX: u32>(c: &mut Bencher, policy: SplitPolicy) {
    c.iter_custom(|iters| {
        let mut rng = Rng::with_seed(0);
        let mut tree = new_tree::<MAX>(policy);
        let rects = random_rects(&mut rng, iters);

        let now = Instant::now();

        for (id, r) in rects.iter().enumerate() {
            tree.insert(r.clone(), id as u64).unwrap();
        }

        for (id, r) in rects.iter().enumerate() {
            tree.delete(r, &(id as u64)).unwrap();
        }

        now.elapsed()
    });
}

fn bench_insert_delete(c: &mut Criterion) {
    let mut c = c.benchmark_group("insert-delete");
    c.bench_function("linear-8", |b| insert_delete::<8>(b, SplitPolicy::Linear));
    c.bench_function("linear-32", |b| insert_delete::<32>(b, SplitPolicy::Linear));
    c.bench_function("quadratic-8", |b| insert_delete::<8>(b, SplitPolicy::Quadratic));
    c.bench_function("quadratic-32", |b| insert_delete::<32>(b, SplitPolicy::Quadratic));
    c.finish();
}

/* -------------------------------------------- Search ------------------------------------------ */

fn search<const MAX: u32>(c: &mut Bencher, policy: SplitPolicy) {
    let mut rng = Rng::with_seed(1);
    let mut tree = new_tree::<MAX>(policy);

    for (id, r) in random_rects(&mut rng, 20_000).into_iter().enumerate() {
        tree.insert(r, id as u64).unwrap();
    }

    let queries = random_rects(&mut rng, 1_000);
    let mut hits: Vec<&Entry<u64>> = Vec::with_capacity(256);

    c.iter(|| {
        let mut total = 0;

        for q in &queries {
            hits.clear();
            tree.search(q, &mut hits).unwrap();
            total += hits.len();
        }

        total
    });
}

fn bench_search(c: &mut Criterion) {
    let mut c = c.benchmark_group("search");
    c.bench_function("linear-8", |b| search::<8>(b, SplitPolicy::Linear));
    c.bench_function("quadratic-8", |b| search::<8>(b, SplitPolicy::Quadratic));
    c.bench_function("quadratic-32", |b| search::<32>(b, SplitPolicy::Quadratic));
    c.finish();
}

criterion_group!(benches, bench_insert_delete, bench_search);
criterion_main!(benches);
