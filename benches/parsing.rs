//! Benchmarks for block parsing and serialization.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use jotmark::document::{parse, serialize};

fn large_note(sections: usize) -> String {
    let mut md = String::new();
    for i in 1..=sections {
        md.push_str(&format!("## Section {i}\n"));
        md.push_str("Some body text with **bold** and a [link](https://example.com).\n");
        md.push_str("- first item\n  - nested item\n");
        md.push_str(&format!("{i}. numbered\n"));
        md.push_str("- [ ] open task\n- [x] done task\n");
        md.push_str("> quoted line\n\n");
    }
    md
}

fn bench_parse_simple(c: &mut Criterion) {
    let md = "# Hello\n\nWorld";
    c.bench_function("parse_simple", |b| b.iter(|| parse(black_box(md))));
}

fn bench_parse_large(c: &mut Criterion) {
    let md = large_note(500);
    c.bench_function("parse_large", |b| b.iter(|| parse(black_box(&md))));
}

fn bench_serialize_large(c: &mut Criterion) {
    let blocks = parse(&large_note(500));
    c.bench_function("serialize_large", |b| {
        b.iter(|| serialize(black_box(&blocks)))
    });
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_large,
    bench_serialize_large
);
criterion_main!(benches);
