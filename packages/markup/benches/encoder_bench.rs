use criterion::{black_box, criterion_group, criterion_main, Criterion};
use psikit_markup::{encode, CDataPolicy, DefaultEscapes, EncodeOptions, TextEncodingPolicy};

fn encode_plain_text(c: &mut Criterion) {
    let source = "The quick brown fox jumps over the lazy dog. ".repeat(200);

    c.bench_function("encode_plain_text", |b| {
        b.iter(|| encode(black_box(&source)))
    });
}

fn encode_markup_heavy(c: &mut Criterion) {
    let source = "<div class=\"a\">x &amp; y</div>\u{A0}".repeat(200);

    c.bench_function("encode_markup_heavy", |b| {
        b.iter(|| encode(black_box(&source)))
    });

    let ascii = EncodeOptions::ascii_only();
    c.bench_function("encode_ascii_only", |b| {
        b.iter(|| ascii.encode(black_box(&source)))
    });

    let cdata = CDataPolicy::<DefaultEscapes>::default();
    c.bench_function("encode_cdata", |b| {
        b.iter(|| cdata.encode(black_box(&source)))
    });
}

criterion_group!(benches, encode_plain_text, encode_markup_heavy);
criterion_main!(benches);
