use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hastemap::config::HasteConfig;
use hastemap::core::HasteMapBuilder;
use std::path::Path;

fn write_tree(dir: &Path, files: usize) {
    std::fs::create_dir_all(dir).unwrap();
    for i in 0..files {
        let content = format!(
            r#"/**
 * @providesModule Mod{}
 */
const next = require('Mod{}');
import shared from 'Shared{}';

export function render{}() {{
    return next.process(shared);
}}
"#,
            i,
            (i + 1) % files,
            i % 7,
            i
        );
        std::fs::write(dir.join(format!("mod_{}.js", i)), content).unwrap();
    }
}

fn benchmark_cold_builds(c: &mut Criterion) {
    let mut group = c.benchmark_group("haste_build");

    // Create test trees with sample modules
    let small_dir = std::env::temp_dir().join("hastemap_bench_small");
    write_tree(&small_dir, 30);

    group.bench_function("small_tree_cold", |b| {
        b.iter(|| {
            let config = HasteConfig::new(vec![black_box(small_dir.clone())]);
            let result = HasteMapBuilder::new(config).build();
            black_box(result)
        });
    });

    let large_dir = std::env::temp_dir().join("hastemap_bench_large");
    write_tree(&large_dir, 200);

    group.bench_function("large_tree_cold", |b| {
        b.iter(|| {
            let config = HasteConfig::new(vec![black_box(large_dir.clone())]);
            let result = HasteMapBuilder::new(config).build();
            black_box(result)
        });
    });

    group.finish();
}

fn benchmark_warm_rebuilds(c: &mut Criterion) {
    use tempfile::TempDir;

    let mut group = c.benchmark_group("haste_incremental");

    let tree = TempDir::new().unwrap();
    write_tree(tree.path(), 100);
    let cache_dir = TempDir::new().unwrap();
    let config = HasteConfig::new(vec![tree.path().to_path_buf()])
        .with_cache_dir(cache_dir.path().to_path_buf());

    // Prime the cache so every iteration reuses all records
    HasteMapBuilder::new(config.clone())
        .with_cache()
        .build()
        .unwrap();

    group.bench_function("warm_rebuild", |b| {
        b.iter(|| {
            let builder = HasteMapBuilder::new(black_box(config.clone())).with_cache();
            let result = builder.build();
            black_box(result)
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_cold_builds, benchmark_warm_rebuilds);
criterion_main!(benches);
