use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kokuseki_core::tokenizer::{convert, restore};

fn bench_tokenizer(c: &mut Criterion) {
    let names = vec![
        "Kyubyong Park",
        "Kim Jong-un",
        "Jean-Claude Van Damme",
        "山田太郎",
        "Mikael Andersson",
    ];

    c.bench_function("convert_single", |b| {
        b.iter(|| convert(black_box(names[0])));
    });

    c.bench_function("convert_restore_batch_5", |b| {
        b.iter(|| {
            for name in &names {
                let encoded = convert(black_box(name));
                let _ = restore(black_box(&encoded));
            }
        });
    });
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
