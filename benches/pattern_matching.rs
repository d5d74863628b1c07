use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use vedic_lore::extractor::confidence::ConfidenceWeights;
use vedic_lore::RuleExtractor;

fn sentences() -> Vec<&'static str> {
    vec![
        "Mars in the 7th house causes discord in marriage.",
        "For Leo ascendant, Mars in the 9th house brings fortune through courage.",
        "The lord of the 7th in the 2nd house gives wealth through spouse.",
        "Saturn aspects Jupiter from the 10th house and delays recognition.",
        "Venus in Swati nakshatra indicates artistic refinement.",
        "Gajakesari Yoga gives wealth and fame when Jupiter and Moon are in kendra.",
        "Mars situated together with the 7th house region brings change.",
        "The weather today is pleasant and mild, with clear skies.",
    ]
}

fn bench_single_sentence(c: &mut Criterion) {
    let extractor = RuleExtractor::new(ConfidenceWeights::default(), 0.3);
    c.bench_function("extract_basic_placement", |b| {
        b.iter(|| extractor.extract("Mars in the 7th house causes discord in marriage.").unwrap());
    });
}

fn bench_sentence_battery(c: &mut Criterion) {
    let extractor = RuleExtractor::new(ConfidenceWeights::default(), 0.3);
    let sentences = sentences();
    c.bench_function("extract_mixed_sentence_battery", |b| {
        b.iter(|| {
            for s in &sentences {
                extractor.extract(s).unwrap();
            }
        });
    });
}

fn bench_scaling_with_document_size(c: &mut Criterion) {
    let extractor = RuleExtractor::new(ConfidenceWeights::default(), 0.3);
    let mut group = c.benchmark_group("document_scaling");

    for size in [50usize, 500, 5_000] {
        let sentences = sentences();
        let document: Vec<&str> = (0..size).map(|i| sentences[i % sentences.len()]).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &document, |b, document| {
            b.iter(|| {
                for s in document {
                    extractor.extract(s).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_sentence, bench_sentence_battery, bench_scaling_with_document_size);
criterion_main!(benches);
