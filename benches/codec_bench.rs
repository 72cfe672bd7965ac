use criterion::{black_box, criterion_group, criterion_main, Criterion};
use huffman_codec::artifact::{read_table, write_table};
use huffman_codec::{decode_with_table, decode_with_tree, encode, Codebook};

fn sample_text() -> String {
    "The quick brown fox jumps over the lazy dog; pack my box with five dozen liquor jugs.\n"
        .repeat(200)
}

fn bench_build(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("build_codebook", |b| {
        b.iter(|| Codebook::from_symbols(black_box(&text).chars()))
    });
}

fn bench_coding(c: &mut Criterion) {
    let mut group = c.benchmark_group("coding");
    let text = sample_text();
    let codebook = Codebook::from_symbols(text.chars());
    let bits = codebook.encode(text.chars()).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| encode(black_box(&text).chars(), codebook.table()).unwrap())
    });
    group.bench_function("decode_tree_walk", |b| {
        b.iter(|| decode_with_tree(black_box(&bits), codebook.tree()).unwrap())
    });
    group.bench_function("decode_prefix_match", |b| {
        b.iter(|| decode_with_table(black_box(&bits), codebook.table()).unwrap())
    });
    group.finish();
}

fn bench_artifact(c: &mut Criterion) {
    let text = sample_text();
    let codebook = Codebook::from_symbols(text.chars());
    let written = write_table(codebook.table());

    c.bench_function("read_table", |b| {
        b.iter(|| read_table::<char>(black_box(&written)).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_coding, bench_artifact);
criterion_main!(benches);
