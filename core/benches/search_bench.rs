use criterion::{criterion_group, criterion_main, Criterion};
use recsearch_core::{Record, SearchIndex, SearchParams};

fn corpus() -> Vec<Record> {
    (0..500)
        .map(|i| {
            Record::new()
                .with("title", format!("Product {i} manual"))
                .with("body", format!("Setup guide number {i} covering installation, warranty and returns for model {}", i % 37))
                .with("tags", vec!["manual".to_string(), format!("series{}", i % 11)])
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let records = corpus();
    c.bench_function("fit_500", |b| b.iter(|| SearchIndex::default().ingest(records.clone())));
}

fn bench_search(c: &mut Criterion) {
    let mut index = SearchIndex::default();
    index.ingest(corpus());
    let params = SearchParams::new(10, 0.0);
    c.bench_function("search_500", |b| b.iter(|| index.search("warranty returns series3", &params)));
}

criterion_group!(benches, bench_fit, bench_search);
criterion_main!(benches);
