use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gff3_tidy::description::product_is_informative;
use gff3_tidy::{CategoryTable, Feature, Normalizer};

fn genes(count: usize) -> Vec<Feature> {
    (0..count)
        .map(|idx| {
            let id = if idx % 3 == 0 {
                format!("gene-{idx}")
            } else {
                format!("LOREMIPSUM{idx}")
            };
            let mut gene = Feature::new("gene", &id);
            for transcript in 1..=3 {
                gene = gene.with_child(
                    Feature::new("mRNA", &format!("{id}-R{transcript}")).with_child(
                        Feature::new("CDS", &format!("cds-{id}-P{transcript}"))
                            .with_qualifier("product", "putative DNA helicase"),
                    ),
                );
            }
            gene
        })
        .collect()
}

fn normalize_benchmark(c: &mut Criterion) {
    let table = CategoryTable::default();
    let features = genes(2_000);
    c.bench_function("normalize 2000 genes", |b| {
        b.iter(|| {
            let mut features = features.clone();
            let mut normalizer = Normalizer::new(&table);
            normalizer
                .normalize(black_box(&mut features))
                .expect("the generated genes are valid");
            normalizer.graph().len()
        })
    });
}

fn informative_benchmark(c: &mut Criterion) {
    let products = [
        "hypothetical protein PROTID12345",
        "conserved hypothetical protein, putative",
        "conserved hypothetical transmembrane protein",
        "DNA polymerase III subunit alpha",
    ];
    c.bench_function("product is informative", |b| {
        b.iter(|| {
            products
                .iter()
                .filter(|product| product_is_informative(black_box(product), Some("PROTID12345")))
                .count()
        })
    });
}

criterion_group! {
    name = normalize;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(10));
    targets = normalize_benchmark, informative_benchmark
}
criterion_main!(normalize);
