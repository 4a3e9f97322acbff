//! One normalization run over the features of a genome record
use tracing::{debug, trace};

use crate::category::{Category, CategoryTable};
use crate::feature::Feature;
use crate::graph::AnnotationGraph;
use crate::stable_id::IdAllocator;
use crate::{AnnotationError, AnnotationResult};

const DESCRIPTION_KEY: &str = "description";

/// Normalizes the stable ids and descriptions of a parsed GFF3 record
///
/// A `Normalizer` owns the [`IdAllocator`] and the [`AnnotationGraph`] of a
/// single run. Use a new instance for every record or file, instances are
/// independent of each other and can be used on different threads.
///
/// [`Normalizer::normalize`] runs these steps:
/// 1. Genes get a valid stable id ([`IdAllocator::normalize_gene_id`]).
///    Transcripts with an invalid id are renamed `<gene_id>_t<n>`,
///    translations are normalized and renamed `<transcript_id>_cds` if
///    needed ([`IdAllocator::normalize_pseudogene_translation_ids`] for
///    pseudogenes).
/// 2. All features are indexed in the graph, features of unregistered
///    categories (e.g. exons) are skipped.
/// 3. Descriptions are transferred up the hierarchy and written back into the
///    `description` qualifier of genes and transcripts. A non-informative
///    description (e.g. `hypothetical protein`) is replaced if a child has a
///    better one.
///
/// # Examples
///
/// ```
/// use gff3_tidy::{Category, CategoryTable, Feature, Normalizer};
///
/// let table = CategoryTable::default();
/// let mut features = vec![Feature::new("gene", "bad")
///     .with_qualifier("Dbxref", "GeneID:000001")
///     .with_child(Feature::new("mRNA", "bad_t"))];
///
/// let mut normalizer = Normalizer::new(&table);
/// normalizer.normalize(&mut features).unwrap();
///
/// assert_eq!(features[0].id(), "GeneID_000001");
/// assert_eq!(features[0].sub_features()[0].id(), "GeneID_000001_t1");
///
/// let graph = normalizer.into_graph();
/// assert_eq!(graph.get_features(&Category::Transcript).unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct Normalizer<'a> {
    table: &'a CategoryTable,
    allocator: IdAllocator,
    graph: AnnotationGraph,
}

impl<'a> Normalizer<'a> {
    /// Constructs a normalizer with a default allocator and graph
    pub fn new(table: &'a CategoryTable) -> Self {
        Self {
            table,
            allocator: IdAllocator::default(),
            graph: AnnotationGraph::default(),
        }
    }

    /// Replaces the allocator, e.g. to use another prefix
    #[must_use]
    pub fn with_allocator(mut self, allocator: IdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Replaces the graph, e.g. to register custom categories
    #[must_use]
    pub fn with_graph(mut self, graph: AnnotationGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn allocator(&self) -> &IdAllocator {
        &self.allocator
    }

    pub fn graph(&self) -> &AnnotationGraph {
        &self.graph
    }

    /// Consumes the normalizer and returns the populated graph
    pub fn into_graph(self) -> AnnotationGraph {
        self.graph
    }

    /// Normalizes `features` in place and indexes them
    ///
    /// Sub-features of the same type that repeat the id of an earlier sibling
    /// (the segments of a multi-exon CDS) are indexed once. Repeated ids of
    /// top-level features are an error.
    ///
    /// # Errors
    ///
    /// The first error of any step is returned, the features may be partially
    /// normalized in that case:
    /// - [`AnnotationError::UnknownCategory`] for a raw type missing from the table
    /// - [`AnnotationError::InvalidIdentifier`] or
    ///   [`AnnotationError::DuplicateIdentifier`] if a gene id cannot be fixed
    /// - [`AnnotationError::DuplicateIdentifier`],
    ///   [`AnnotationError::MissingParent`] or
    ///   [`AnnotationError::InvalidHierarchy`] if the tree cannot be indexed
    pub fn normalize(&mut self, features: &mut [Feature]) -> AnnotationResult<()> {
        for feature in features.iter_mut() {
            if self.table.category(feature.kind())? == &Category::Gene {
                self.normalize_gene(feature)?;
            }
            self.index(feature, None)?;
        }

        self.graph.transfer_descriptions();

        for feature in features.iter_mut() {
            self.write_descriptions(feature)?;
        }
        Ok(())
    }

    fn normalize_gene(&mut self, gene: &mut Feature) -> AnnotationResult<()> {
        let table = self.table;
        let gene_id = self.allocator.normalize_gene_id(gene)?;
        if gene_id != gene.id() {
            gene.rename(gene_id.clone());
        }

        let mut ordinal = 0;
        for transcript in gene.sub_features_mut() {
            if table.category(transcript.kind())? != &Category::Transcript {
                continue;
            }
            ordinal += 1;
            if !self.allocator.is_valid(transcript.id()) {
                let transcript_id = IdAllocator::normalize_transcript_id(&gene_id, ordinal);
                debug!("Transcript id {} -> {transcript_id}", transcript.id());
                transcript.rename(transcript_id);
            }
        }

        if gene.is_pseudogene() {
            self.allocator
                .normalize_pseudogene_translation_ids(gene, table)
        } else {
            self.allocator.normalize_translation_ids(gene, table)
        }
    }

    /// Adds `feature` and its sub-features to the graph
    fn index(&mut self, feature: &Feature, parent: Option<(&Category, &str)>) -> AnnotationResult<()> {
        let table = self.table;
        let category = table.category(feature.kind())?;
        if !self.graph.has_category(category) {
            trace!("Skipping {} {}", feature.kind(), feature.id());
            return Ok(());
        }

        let parent_id = match parent {
            Some((parent_category, parent_id)) => {
                if category.parent_category().as_ref() != Some(parent_category) {
                    return Err(AnnotationError::InvalidHierarchy(format!(
                        "{category} {} cannot be a child of {parent_category} {parent_id}",
                        feature.id()
                    )));
                }
                Some(parent_id)
            }
            None => None,
        };
        self.graph.add_feature(feature, category, parent_id)?;

        let children = feature.sub_features();
        for (idx, child) in children.iter().enumerate() {
            // segments of a multi-exon CDS share their id
            let segment = children[..idx]
                .iter()
                .any(|sibling| sibling.kind() == child.kind() && sibling.id() == child.id());
            if segment {
                trace!("Skipping segment of {} {}", child.kind(), child.id());
                continue;
            }
            self.index(child, Some((category, feature.id())))?;
        }
        Ok(())
    }

    /// Copies the descriptions of genes and transcripts back to the features
    ///
    /// The `description` qualifier is replaced if the record holds another
    /// text, e.g. a non-informative description that was filled from a child.
    /// Features without a record description are left unchanged.
    fn write_descriptions(&self, feature: &mut Feature) -> AnnotationResult<()> {
        let category = self.table.category(feature.kind())?;
        if !matches!(category, Category::Gene | Category::Transcript) {
            return Ok(());
        }

        let description = self
            .graph
            .get_record(category, feature.id())
            .and_then(|record| record.description());
        if let Some(description) = description {
            if feature.qualifiers().first(DESCRIPTION_KEY) != Some(description) {
                trace!("Description of {}: {description}", feature.id());
                feature.qualifiers_mut().set(DESCRIPTION_KEY, description);
            }
        }

        for child in feature.sub_features_mut() {
            self.write_descriptions(child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn gene(id: &str) -> Feature {
        Feature::new("gene", id).with_child(
            Feature::new("mRNA", &format!("{id}-RA"))
                .with_child(Feature::new("exon", &format!("{id}-RA-E1")))
                .with_child(
                    Feature::new("CDS", &format!("cds-{id}-PA"))
                        .with_qualifier("product", "DNA polymerase"),
                ),
        )
    }

    #[test]
    fn valid_tree() {
        let table = CategoryTable::default();
        let mut features = vec![gene("LOREMIPSUM1")];
        let mut normalizer = Normalizer::new(&table);
        normalizer.normalize(&mut features).unwrap();

        let gene = &features[0];
        assert_eq!(gene.id(), "LOREMIPSUM1");
        assert!(!gene.qualifiers().contains("ID"));
        assert_eq!(gene.qualifiers().first("description"), Some("DNA polymerase"));

        let transcript = &gene.sub_features()[0];
        assert_eq!(transcript.id(), "LOREMIPSUM1-RA");
        assert_eq!(
            transcript.qualifiers().first("description"),
            Some("DNA polymerase")
        );
        assert_eq!(transcript.sub_features()[1].id(), "LOREMIPSUM1-PA");

        let graph = normalizer.graph();
        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph
                .get_parent(&Category::Transcript, "LOREMIPSUM1-PA")
                .unwrap(),
            "LOREMIPSUM1-RA"
        );
    }

    #[test]
    fn renamed_tree() {
        let table = CategoryTable::default();
        let mut features = vec![Feature::new("gene", "gene-abc").with_child(
            Feature::new("mRNA", "abc")
                .with_child(Feature::new("CDS", "cds:abc")),
        )];
        let mut normalizer = Normalizer::new(&table);
        normalizer.normalize(&mut features).unwrap();

        let gene = &features[0];
        assert_eq!(gene.id(), "TMP_1");
        assert_eq!(gene.qualifiers().first("ID"), Some("TMP_1"));
        let transcript = &gene.sub_features()[0];
        assert_eq!(transcript.id(), "TMP_1_t1");
        assert_eq!(transcript.qualifiers().first("ID"), Some("TMP_1_t1"));
        assert_eq!(transcript.sub_features()[0].id(), "TMP_1_t1_cds");
        assert!(normalizer
            .graph()
            .get_record(&Category::Translation, "TMP_1_t1_cds")
            .is_some());
    }

    #[test]
    fn pseudogene_translation() {
        let table = CategoryTable::default();
        let mut features = vec![Feature::new("pseudogene", "LOREMIPSUM2").with_child(
            Feature::new("pseudogenic_transcript", "LOREMIPSUM2-RA")
                .with_child(Feature::new("CDS", "cds-LOREMIPSUM2")),
        )];
        let mut normalizer = Normalizer::new(&table);
        normalizer.normalize(&mut features).unwrap();

        let cds = &features[0].sub_features()[0].sub_features()[0];
        assert_eq!(cds.id(), "LOREMIPSUM2-RA_cds");
        let gene = normalizer
            .graph()
            .get_record(&Category::Gene, "LOREMIPSUM2")
            .unwrap();
        assert!(gene.is_pseudogene());
    }

    #[test]
    fn non_informative_description_is_replaced() {
        let table = CategoryTable::default();
        let mut features =
            vec![gene("LOREMIPSUM1").with_qualifier("description", "hypothetical protein")];
        let mut normalizer = Normalizer::new(&table);
        normalizer.normalize(&mut features).unwrap();

        let record = normalizer
            .graph()
            .get_record(&Category::Gene, "LOREMIPSUM1")
            .unwrap();
        assert_eq!(record.description(), Some("DNA polymerase"));
        assert_eq!(
            features[0].qualifiers().get("description").unwrap(),
            ["DNA polymerase"]
        );
    }

    #[test]
    fn cds_segments_are_indexed_once() {
        let table = CategoryTable::default();
        let mut features = vec![Feature::new("gene", "LOREMIPSUM1").with_child(
            Feature::new("mRNA", "LOREMIPSUM1-RA")
                .with_child(
                    Feature::new("CDS", "cds-LOREMIPSUM1-PA").with_qualifier("product", "Kinase"),
                )
                .with_child(
                    Feature::new("CDS", "cds-LOREMIPSUM1-PA").with_qualifier("product", "Kinase"),
                ),
        )];
        let mut normalizer = Normalizer::new(&table);
        normalizer.normalize(&mut features).unwrap();

        let segments = features[0].sub_features()[0].sub_features();
        assert_eq!(segments[0].id(), "LOREMIPSUM1-PA");
        assert_eq!(segments[1].id(), "LOREMIPSUM1-PA");

        let graph = normalizer.graph();
        assert_eq!(graph.get_features(&Category::Translation).unwrap().len(), 1);
        assert_eq!(
            graph.children(&Category::Transcript, "LOREMIPSUM1-RA").unwrap(),
            ["LOREMIPSUM1-PA"]
        );
        assert_eq!(features[0].qualifiers().first("description"), Some("Kinase"));
    }

    #[test]
    fn existing_description_is_kept() {
        let table = CategoryTable::default();
        let mut features =
            vec![gene("LOREMIPSUM1").with_qualifier("description", "Polymerase gene")];
        let mut normalizer = Normalizer::new(&table);
        normalizer.normalize(&mut features).unwrap();
        assert_eq!(
            features[0].qualifiers().get("description").unwrap(),
            ["Polymerase gene"]
        );
    }

    #[test]
    fn unknown_raw_type() {
        let table = CategoryTable::default();
        let mut features = vec![Feature::new("foobar", "LOREMIPSUM1")];
        let mut normalizer = Normalizer::new(&table);
        assert_eq!(
            normalizer.normalize(&mut features),
            Err(AnnotationError::UnknownCategory("foobar".to_string()))
        );
    }

    #[test]
    fn translation_below_gene() {
        let table = CategoryTable::default();
        let mut features = vec![
            Feature::new("gene", "LOREMIPSUM1").with_child(Feature::new("CDS", "LOREMIPSUM1-PA"))
        ];
        let mut normalizer = Normalizer::new(&table);
        assert!(matches!(
            normalizer.normalize(&mut features),
            Err(AnnotationError::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn duplicate_genes() {
        let table = CategoryTable::default();
        let mut features = vec![gene("LOREMIPSUM1"), gene("LOREMIPSUM1")];
        let mut normalizer = Normalizer::new(&table);
        assert!(matches!(
            normalizer.normalize(&mut features),
            Err(AnnotationError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn custom_categories_are_indexed_when_registered() {
        let table = CategoryTable::default();
        let mut graph = AnnotationGraph::default();
        graph.register_category(Category::custom("exon"));

        let mut features = vec![
            Feature::new("exon", "LOREMIPSUM1-E1"),
            Feature::new("transposable_element", "TE_000001"),
        ];
        let mut normalizer = Normalizer::new(&table).with_graph(graph);
        normalizer.normalize(&mut features).unwrap();

        let graph = normalizer.into_graph();
        assert_eq!(graph.get_features(&Category::custom("exon")).unwrap().len(), 1);
        assert_eq!(
            graph
                .get_features(&Category::TransposableElement)
                .unwrap()
                .len(),
            1
        );
    }
}
