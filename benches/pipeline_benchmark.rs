use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cyberaudit::{normalize, pad_sequence, SessionHistory, PADDING_VALUE, SEQUENCE_LENGTH};

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Normalization");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    // Short comment, no noise
    group.bench_function("plain_comment", |b| b.iter(|| {
        normalize(black_box("Have a nice day"))
    }));

    // Mentions, URLs and punctuation mixed in
    group.bench_function("noisy_comment", |b| b.iter(|| {
        normalize(black_box(
            "@someone LOL!!! look at this http://t.co/abc123 you are SO dumb, \
             seriously... www.example.com #loser @another_one"
        ))
    }));

    // Long comment (~300 words)
    let long_comment = "Nobody likes you, go back to where you came from! ".repeat(30);
    group.bench_function("long_comment", |b| b.iter(|| {
        normalize(black_box(&long_comment))
    }));

    group.finish();
}

fn bench_padding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Padding");

    let short: Vec<u32> = (1..=12).collect();
    let long: Vec<u32> = (1..=400).collect();
    group.bench_function("pad_short", |b| b.iter(|| {
        pad_sequence(black_box(&short), SEQUENCE_LENGTH, PADDING_VALUE)
    }));
    group.bench_function("truncate_long", |b| b.iter(|| {
        pad_sequence(black_box(&long), SEQUENCE_LENGTH, PADDING_VALUE)
    }));

    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("History");
    group.sample_size(50);

    // Scaling with session length
    for &rows in &[10usize, 100, 1000] {
        let mut history = SessionHistory::new();
        for i in 0..rows {
            let label = if i % 3 == 0 { "GENDER" } else { "NOT_CYBERBULLYING" };
            history.append(format!("comment number {}, with a comma", i), label);
        }

        group.bench_function(format!("export_csv_{}", rows), |b| b.iter(|| {
            black_box(&history).export_csv()
        }));
        group.bench_function(format!("distribution_{}", rows), |b| b.iter(|| {
            black_box(&history).distribution()
        }));
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalization,
    bench_padding,
    bench_history
);
criterion_main!(benches);
