use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use reeltrack::context::RunContext;
use reeltrack::reconcile;
use reeltrack::scan;
use reeltrack::store::Store;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixture generator for media library layouts
mod fixtures {
    use super::*;

    /// Create `count` media files spread across a few collection folders,
    /// with some non-media noise alongside.
    pub fn create_library(base: &Path, count: usize) -> std::io::Result<()> {
        for i in 0..count {
            let collection = base.join(format!("collection-{}", i % 8));
            fs::create_dir_all(&collection)?;
            fs::write(collection.join(format!("Title-{i}.2021.1080p.mkv")), "")?;

            if i % 4 == 0 {
                fs::write(collection.join(format!("Title-{i}.nfo")), "notes")?;
            }
        }

        Ok(())
    }

    pub fn media_paths(count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| PathBuf::from(format!("/library/collection-{}/Title-{i}.mkv", i % 8)))
            .collect()
    }
}

fn open_context(dir: &TempDir) -> RunContext {
    let store = Store::open(&dir.path().join("movies.db")).unwrap();
    RunContext::new(store, vec![PathBuf::from("/library")])
}

/// Benchmark: walking a library tree
fn bench_scan_library(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_library");

    for count in [100, 1_000] {
        group.bench_with_input(BenchmarkId::new("files", count), &count, |b, &count| {
            let temp_dir = TempDir::new().unwrap();
            fixtures::create_library(temp_dir.path(), count).unwrap();

            b.iter(|| {
                let found = scan::scan(black_box(temp_dir.path())).unwrap();
                black_box(found);
            });
        });
    }

    group.finish();
}

/// Benchmark: first run, every path is inserted
fn bench_first_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_first_run");
    group.sample_size(20);

    for count in [100, 1_000] {
        group.bench_with_input(BenchmarkId::new("files", count), &count, |b, &count| {
            let paths = fixtures::media_paths(count);

            b.iter_batched(
                || {
                    let dir = TempDir::new().unwrap();
                    let ctx = open_context(&dir);
                    (dir, ctx)
                },
                |(_dir, ctx)| {
                    let result = reconcile::reconcile(&ctx, black_box(&paths)).unwrap();
                    black_box(result);
                },
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

/// Benchmark: unchanged library, every insert is a no-op
fn bench_idempotent_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_unchanged");

    for count in [100, 1_000] {
        group.bench_with_input(BenchmarkId::new("files", count), &count, |b, &count| {
            let dir = TempDir::new().unwrap();
            let ctx = open_context(&dir);
            let paths = fixtures::media_paths(count);
            reconcile::reconcile(&ctx, &paths).unwrap();

            b.iter(|| {
                let result = reconcile::reconcile(&ctx, black_box(&paths)).unwrap();
                assert!(result.new_names.is_empty(), "second pass should insert nothing");
                black_box(result);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scan_library,
    bench_first_reconcile,
    bench_idempotent_reconcile,
);

criterion_main!(benches);
