use gff3_tidy::{Category, CategoryTable, Feature, IdAllocator, Normalizer, Qualifiers};

fn print_feature(feature: &Feature, depth: usize) {
    let description = feature.qualifiers().first("description").unwrap_or("-");
    println!(
        "{}{}\t{}\t{}",
        "  ".repeat(depth),
        feature.kind(),
        feature.id(),
        description
    );
    for child in feature.sub_features() {
        print_feature(child, depth + 1);
    }
}

fn main() {
    simple_logger::init_with_level(log::Level::Debug).unwrap();

    let table = CategoryTable::default();

    let mut attributes = Qualifiers::new();
    attributes.set("ID", "gene-LOREMIPSUM1");
    attributes.set("Name", "polC");
    let first_gene = match Feature::from_qualifiers("gene", attributes) {
        Ok(gene) => gene,
        Err(err) => {
            eprintln!("Invalid gene: {err}");
            std::process::exit(1);
        }
    };

    let mut features = vec![
        first_gene.with_child(
            Feature::new("mRNA", "LOREMIPSUM1-RA")
                .with_child(Feature::new("exon", "LOREMIPSUM1-RA-E1"))
                .with_child(
                    Feature::new("CDS", "cds-LOREMIPSUM1-PA")
                        .with_qualifier("product", "DNA polymerase III subunit alpha"),
                ),
        ),
        Feature::new("gene", "gene-2")
            .with_qualifier("Dbxref", "GeneID:000002")
            .with_child(
                Feature::new("mRNA", "tr2")
                    .with_child(
                        Feature::new("CDS", "cds:2").with_qualifier("product", "hypothetical protein"),
                    ),
            ),
        Feature::new("pseudogene", "tRNA-Leu").with_child(
            Feature::new("pseudogenic_transcript", "tRNA-Leu-RA")
                .with_child(Feature::new("CDS", "tRNA-Leu")),
        ),
        Feature::new("gene", "ctg1:100..200").with_child(Feature::new("mRNA", "ctg1:100..200")),
    ];

    let allocator = IdAllocator::default().with_prefix("DEMO_");
    let mut normalizer = Normalizer::new(&table).with_allocator(allocator);
    if let Err(err) = normalizer.normalize(&mut features) {
        eprintln!("Normalization failed: {err}");
        std::process::exit(1);
    }

    for feature in &features {
        print_feature(feature, 0);
    }

    let graph = normalizer.into_graph();
    for category in [Category::Gene, Category::Transcript, Category::Translation] {
        let count = graph.get_features(&category).map(|arena| arena.len()).unwrap_or(0);
        println!("{category}: {count}");
    }
}
