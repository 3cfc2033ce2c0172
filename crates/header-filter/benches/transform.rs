use criterion::{black_box, criterion_group, criterion_main, Criterion};
use header_filter::HeaderFilter;
use message_core::{Message, MessageBuilder};

fn message(n: usize) -> Message<&'static str> {
    (0..n)
        .fold(MessageBuilder::with_payload("bench"), |b, i| b.header(format!("h-{i}"), i))
        .correlation_id("c")
        .reply_channel("r")
        .build()
}

fn bench_transform(c: &mut Criterion) {
    let m = message(32);
    let exact = HeaderFilter::exact(["h-1", "h-7", "h-30", "missing"]).unwrap();
    let pattern = HeaderFilter::pattern(["h-1*", "*Channel"]).unwrap();

    c.bench_function("transform_exact_32", |b| b.iter(|| exact.transform(black_box(&m))));
    c.bench_function("transform_pattern_32", |b| b.iter(|| pattern.transform(black_box(&m))));
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
