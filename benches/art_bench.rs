//! Overall throughput benches for inserts and lookups over random key
//! populations, plus a threaded read-mostly scenario. Here to quickly test
//! for regressions.

use std::thread;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, rng};

use cart::ConcurrentAdaptiveRadixTree;

// Tree sizes for the benches that measure retrievals.
const TREE_SIZES: [u64; 3] = [1 << 14, 1 << 17, 1 << 20];

fn gen_keys(l1_prefix: usize, l2_prefix: usize, suffix: usize) -> Vec<String> {
    let mut keys = Vec::new();
    let chars: Vec<char> = ('a'..='z').collect();
    let mut rng = rng();
    for l1 in chars.iter() {
        let level1 = l1.to_string().repeat(l1_prefix);
        for l2 in chars.iter() {
            let level2 = l2.to_string().repeat(l2_prefix);
            for _ in 0..8 {
                let tail: String = (0..suffix)
                    .map(|_| chars[rng.random_range(0..chars.len())])
                    .collect();
                keys.push(format!("{level1}{level2}{tail}"));
            }
        }
    }
    keys
}

pub fn rand_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_insert");
    group.throughput(Throughput::Elements(1));

    let keys = gen_keys(3, 2, 3);
    group.bench_function("string_keys", |b| {
        let tree = ConcurrentAdaptiveRadixTree::<u64>::new();
        let mut rng = rng();
        b.iter(|| {
            let idx = rng.random_range(0..keys.len());
            tree.insert(&keys[idx], idx as u64);
        })
    });

    group.finish();
}

pub fn rand_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_search");
    group.throughput(Throughput::Elements(1));

    for size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, size| {
            let tree = ConcurrentAdaptiveRadixTree::<u64>::new();
            for i in 0..*size {
                tree.insert(i.to_be_bytes().map(|byte| byte & 0x7F), i);
            }
            let mut rng = rng();
            b.iter(|| {
                let i = rng.random_range(0..*size);
                criterion::black_box(tree.search(i.to_be_bytes().map(|byte| byte & 0x7F)));
            })
        });
    }

    group.finish();
}

pub fn read_mostly_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_mostly_threaded");
    let keys = gen_keys(2, 2, 4);

    group.bench_function("7r1w", |b| {
        let tree = ConcurrentAdaptiveRadixTree::<u64>::new();
        for (i, key) in keys.iter().enumerate() {
            tree.insert(key, i as u64);
        }
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..7 {
                    let tree = &tree;
                    let keys = &keys;
                    s.spawn(move || {
                        let mut rng = rng();
                        for _ in 0..1_000 {
                            let idx = rng.random_range(0..keys.len());
                            criterion::black_box(tree.search(&keys[idx]));
                        }
                    });
                }
                let tree = &tree;
                let keys = &keys;
                s.spawn(move || {
                    let mut rng = rng();
                    for n in 0..1_000u64 {
                        let idx = rng.random_range(0..keys.len());
                        tree.insert(&keys[idx], n);
                    }
                });
            });
        })
    });

    group.finish();
}

criterion_group!(benches, rand_insert, rand_search, read_mostly_threaded);
criterion_main!(benches);
