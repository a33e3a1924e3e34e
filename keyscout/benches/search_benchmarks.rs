use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyscout::{search, SearchConfig, Strategy};
use std::{fs::File, io::Write, num::NonZeroUsize};
use tempfile::tempdir;

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    lines_per_file: usize,
) -> std::io::Result<()> {
    for i in 0..file_count {
        let file_path = dir.path().join(format!("test_{}.txt", i));
        let mut file = File::create(file_path)?;
        for j in 0..lines_per_file {
            writeln!(
                file,
                "Line {} of file {}: the quick brown fox jumps over the lazy dog",
                j, i
            )?;
        }
        if i % 2 == 0 {
            writeln!(file, "TODO: follow up on file {}", i)?;
        }
    }
    Ok(())
}

fn create_base_config(dir: &tempfile::TempDir, strategy: Strategy) -> SearchConfig {
    SearchConfig {
        worker_count: NonZeroUsize::new(4).unwrap(),
        strategy,
        ..SearchConfig::new(dir.path(), vec!["todo", "fox", "missing"])
    }
}

fn bench_strategies(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 200, 200).unwrap();

    let mut group = c.benchmark_group("Strategy");
    for strategy in [Strategy::Shared, Strategy::Isolated] {
        let config = create_base_config(&dir, strategy);
        group.bench_with_input(
            BenchmarkId::from_parameter(strategy),
            &config,
            |b, config| {
                b.iter(|| black_box(search(config).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_worker_scaling(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 200, 200).unwrap();

    let mut group = c.benchmark_group("Worker Scaling");
    for workers in [1, 2, 4, 8] {
        for strategy in [Strategy::Shared, Strategy::Isolated] {
            let config = SearchConfig {
                worker_count: NonZeroUsize::new(workers).unwrap(),
                ..create_base_config(&dir, strategy)
            };
            group.bench_function(format!("{}_{}", strategy, workers), |b| {
                b.iter(|| black_box(search(&config).unwrap()));
            });
        }
    }
    group.finish();
}

fn bench_early_exit(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 20, 20_000).unwrap();

    let mut group = c.benchmark_group("Early Exit");
    // "fox" is on the first line; "missing" forces a full read
    for keywords in [vec!["fox"], vec!["fox", "missing"]] {
        let config = SearchConfig {
            worker_count: NonZeroUsize::new(4).unwrap(),
            ..SearchConfig::new(dir.path(), keywords.clone())
        };
        group.bench_function(keywords.join("+"), |b| {
            b.iter(|| black_box(search(&config).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_strategies,
    bench_worker_scaling,
    bench_early_exit
);
criterion_main!(benches);
