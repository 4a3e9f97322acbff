use std::collections::HashSet;

use tracing::debug;

use crate::category::{Category, CategoryTable};
use crate::feature::Feature;
use crate::stable_id::IdValidator;
use crate::{AnnotationError, AnnotationResult, DEFAULT_ID_PREFIX, MAX_ID_DUPLICATES};

const GENE_PREFIXES: [&str; 2] = ["gene-", "gene:"];
const TRANSLATION_PREFIXES: [&str; 2] = ["cds-", "cds:"];
const GENE_ID_DB: &str = "GeneID";

/// Checks, repairs and generates stable identifiers
///
/// One allocator is used for one normalization run. It keeps
/// - a counter for generated identifiers (`TMP_1`, `TMP_2`, ...)
/// - the identifiers derived from `GeneID` cross references, to keep them unique
///
/// # Examples
///
/// ```
/// use gff3_tidy::{Feature, IdAllocator};
///
/// let mut ids = IdAllocator::default();
/// assert_eq!(ids.generate_id(), "TMP_1");
/// assert_eq!(ids.generate_id(), "TMP_2");
///
/// let gene = Feature::new("gene", "gene-LOREMIPSUM1");
/// assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "LOREMIPSUM1");
/// ```
#[derive(Debug, Clone)]
pub struct IdAllocator {
    validator: IdValidator,
    prefix: String,
    current_id_number: u64,
    make_missing_stable_ids: bool,
    loaded_ids: HashSet<String>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            validator: IdValidator::default(),
            prefix: DEFAULT_ID_PREFIX.to_string(),
            current_id_number: 0,
            make_missing_stable_ids: true,
            loaded_ids: HashSet::new(),
        }
    }
}

impl IdAllocator {
    /// Sets the prefix of generated identifiers
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Replaces the validator
    #[must_use]
    pub fn with_validator(mut self, validator: IdValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Allows or forbids replacing invalid gene ids by generated ones
    #[must_use]
    pub fn with_make_missing_stable_ids(mut self, make_missing_stable_ids: bool) -> Self {
        self.make_missing_stable_ids = make_missing_stable_ids;
        self
    }

    pub fn validator(&self) -> &IdValidator {
        &self.validator
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    pub fn make_missing_stable_ids(&self) -> bool {
        self.make_missing_stable_ids
    }

    pub fn set_make_missing_stable_ids(&mut self, make_missing_stable_ids: bool) {
        self.make_missing_stable_ids = make_missing_stable_ids;
    }

    /// Mutable access to the validator, e.g. to change the minimum length
    pub fn validator_mut(&mut self) -> &mut IdValidator {
        &mut self.validator
    }

    /// Returns `true` if `candidate` is acceptable, see [`IdValidator`]
    pub fn is_valid(&self, candidate: &str) -> bool {
        self.validator.is_valid(candidate)
    }

    /// Returns a new identifier made of the prefix and an incremented number
    pub fn generate_id(&mut self) -> String {
        self.current_id_number += 1;
        format!("{}{}", self.prefix, self.current_id_number)
    }

    /// Removes the first of `prefixes` that `id` starts with
    ///
    /// Only one prefix is removed, even if the remainder starts with
    /// another one of the list.
    ///
    /// # Examples
    ///
    /// ```
    /// use gff3_tidy::IdAllocator;
    ///
    /// let id = IdAllocator::strip_known_prefixes("LOREM-IPSUM1", &["LOREM-", "IPSUM"]);
    /// assert_eq!(id, "IPSUM1");
    /// ```
    pub fn strip_known_prefixes<'a>(id: &'a str, prefixes: &[&str]) -> &'a str {
        prefixes
            .iter()
            .find_map(|prefix| id.strip_prefix(prefix))
            .unwrap_or(id)
    }

    /// Formats the identifier of the `ordinal`th transcript of a gene
    ///
    /// # Note
    ///
    /// The same ordinal always produces the same identifier, it is up to
    /// the caller to use distinct ordinals.
    pub fn normalize_transcript_id(gene_id: &str, ordinal: usize) -> String {
        format!("{gene_id}_t{ordinal}")
    }

    /// Removes the `cds-` or `cds:` prefix of a translation identifier
    ///
    /// Returns an empty `String` if the remaining identifier is not valid,
    /// meaning that the caller must create a new one.
    pub fn normalize_translation_id(&self, raw_id: &str) -> String {
        let id = Self::strip_known_prefixes(raw_id, &TRANSLATION_PREFIXES);
        if self.validator.is_valid(id) {
            id.to_string()
        } else {
            String::new()
        }
    }

    /// Returns a valid stable identifier for `gene`
    ///
    /// The `gene-` and `gene:` prefixes are removed. If the remainder is not
    /// valid, the identifier is derived from a `GeneID` cross reference
    /// (`GeneID_<value>`, suffixed with `_2`, `_3`, ... if already used in
    /// this run) or, if allowed, generated with [`IdAllocator::generate_id`].
    ///
    /// # Errors
    ///
    /// - [`AnnotationError::DuplicateIdentifier`] if the `GeneID` derived
    ///   identifier cannot be made unique
    /// - [`AnnotationError::InvalidIdentifier`] if no identifier can be derived
    ///   and generating new ones is disabled
    /// - [`AnnotationError::MalformedQualifier`] for unparsable cross references
    pub fn normalize_gene_id(&mut self, gene: &Feature) -> AnnotationResult<String> {
        let gene_id = Self::strip_known_prefixes(gene.id(), &GENE_PREFIXES);
        if self.validator.is_valid(gene_id) {
            return Ok(gene_id.to_string());
        }
        debug!("Gene id is not valid: {gene_id}");

        let xrefs = gene.qualifiers().xrefs()?;
        if let Some(xref) = xrefs.iter().find(|xref| xref.db() == GENE_ID_DB) {
            let new_id = self.unique_gene_id(&format!("{}_{}", xref.db(), xref.value()))?;
            debug!("Using GeneID {new_id} for stable_id instead of {}", gene.id());
            return Ok(new_id);
        }

        if self.make_missing_stable_ids {
            let new_id = self.generate_id();
            debug!("New id: {gene_id} -> {new_id}");
            return Ok(new_id);
        }
        Err(AnnotationError::InvalidIdentifier(gene.id().to_string()))
    }

    /// Returns `base` or the first free `base_<n>` and marks it as used
    fn unique_gene_id(&mut self, base: &str) -> AnnotationResult<String> {
        let mut candidate = base.to_string();
        let mut number = 1;
        while self.loaded_ids.contains(&candidate) {
            number += 1;
            if number > MAX_ID_DUPLICATES {
                return Err(AnnotationError::DuplicateIdentifier(format!(
                    "{base} (up to {candidate})"
                )));
            }
            candidate = format!("{base}_{number}");
        }
        self.loaded_ids.insert(candidate.clone());
        Ok(candidate)
    }

    /// Makes sure the translations of a pseudogene have their own identifier
    ///
    /// Every translation below a transcript of `gene` is normalized with
    /// [`IdAllocator::normalize_translation_id`]. If that fails or returns
    /// the identifier of the gene itself, the translation is renamed to
    /// `<transcript_id>_cds` and the `ID` qualifier is updated.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::UnknownCategory`] if a sub-feature has a raw type
    /// missing from `table`
    pub fn normalize_pseudogene_translation_ids(
        &self,
        gene: &mut Feature,
        table: &CategoryTable,
    ) -> AnnotationResult<()> {
        self.normalize_translations(gene, table, true)
    }

    /// Normalizes the translation identifiers of a (non-pseudo) gene
    ///
    /// Same as [`IdAllocator::normalize_pseudogene_translation_ids`], except
    /// that a translation may share its identifier with the gene.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::UnknownCategory`] if a sub-feature has a raw type
    /// missing from `table`
    pub fn normalize_translation_ids(
        &self,
        gene: &mut Feature,
        table: &CategoryTable,
    ) -> AnnotationResult<()> {
        self.normalize_translations(gene, table, false)
    }

    fn normalize_translations(
        &self,
        gene: &mut Feature,
        table: &CategoryTable,
        distinct_from_gene: bool,
    ) -> AnnotationResult<()> {
        let gene_id = gene.id().to_string();
        for transcript in gene.sub_features_mut() {
            if table.category(transcript.kind())? != &Category::Transcript {
                continue;
            }
            let transcript_id = transcript.id().to_string();
            for feat in transcript.sub_features_mut() {
                if table.category(feat.kind())? != &Category::Translation {
                    continue;
                }
                let new_id = self.normalize_translation_id(feat.id());
                if new_id.is_empty() || (distinct_from_gene && new_id == gene_id) {
                    let replacement = format!("{transcript_id}_cds");
                    debug!("Translation id {} -> {replacement}", feat.id());
                    feat.rename(replacement);
                } else {
                    feat.set_id(new_id);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pseudogene(gene_id: &str, cds_id: &str) -> Feature {
        Feature::new("pseudogene", gene_id).with_child(
            Feature::new("pseudogenic_transcript", "LOREMIPSUM1_t1")
                .with_child(Feature::new("exon", "LOREMIPSUM1_e1"))
                .with_child(Feature::new("CDS", cds_id)),
        )
    }

    fn first_translation(gene: &Feature) -> &Feature {
        &gene.sub_features()[0].sub_features()[1]
    }

    #[test]
    fn generate_ids() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.generate_id(), "TMP_1");
        assert_eq!(ids.generate_id(), "TMP_2");

        let mut ids = IdAllocator::default().with_prefix("MYPREF_");
        assert_eq!(ids.generate_id(), "MYPREF_1");
        assert_eq!(ids.generate_id(), "MYPREF_2");
    }

    #[test]
    fn strip_prefixes() {
        let id = "LOREM-IPSUM1";
        assert_eq!(IdAllocator::strip_known_prefixes(id, &[]), "LOREM-IPSUM1");
        assert_eq!(
            IdAllocator::strip_known_prefixes(id, &["DOLOR"]),
            "LOREM-IPSUM1"
        );
        assert_eq!(IdAllocator::strip_known_prefixes(id, &["LOREM-"]), "IPSUM1");
        assert_eq!(
            IdAllocator::strip_known_prefixes(id, &["LOREM-", "IPSUM"]),
            "IPSUM1"
        );
        assert_eq!(
            IdAllocator::strip_known_prefixes("gene-gene-ABCDEFG", &["gene-"]),
            "gene-ABCDEFG"
        );
    }

    #[test]
    fn translation_ids() {
        let ids = IdAllocator::default();
        assert_eq!(ids.normalize_translation_id("LOREM-IPSUM1"), "LOREM-IPSUM1");
        assert_eq!(
            ids.normalize_translation_id("cds-LOREM-IPSUM1"),
            "LOREM-IPSUM1"
        );
        assert_eq!(
            ids.normalize_translation_id("cds:LOREM-IPSUM1"),
            "LOREM-IPSUM1"
        );
        assert_eq!(ids.normalize_translation_id("bad"), "");
        assert_eq!(ids.normalize_translation_id("cds:bad..id"), "");
    }

    #[test]
    fn transcript_ids() {
        assert_eq!(
            IdAllocator::normalize_transcript_id("LOREM-IPSUM1", 1),
            "LOREM-IPSUM1_t1"
        );
        assert_eq!(
            IdAllocator::normalize_transcript_id("LOREM-IPSUM1", 2),
            "LOREM-IPSUM1_t2"
        );
        // duplicate ordinals are not detected
        assert_eq!(
            IdAllocator::normalize_transcript_id("LOREM-IPSUM1", 1),
            IdAllocator::normalize_transcript_id("LOREM-IPSUM1", 1)
        );
    }

    #[test]
    fn gene_id_ok() {
        let mut ids = IdAllocator::default();
        let gene = Feature::new("gene", "LOREMIPSUM1");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "LOREMIPSUM1");

        let gene = Feature::new("gene", "gene:LOREMIPSUM1");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "LOREMIPSUM1");
    }

    #[test]
    fn gene_id_is_idempotent() {
        let mut ids = IdAllocator::default();
        let mut gene = Feature::new("gene", "gene-LOREMIPSUM1");
        let first = ids.normalize_gene_id(&gene).unwrap();
        gene.set_id(first.clone());
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), first);
    }

    #[test]
    fn gene_id_generated() {
        let mut ids = IdAllocator::default();
        let gene = Feature::new("gene", "gene-bad");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "TMP_1");

        let gene = Feature::new("gene", "bad").with_qualifier("Dbxref", "UniProt:P12345");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "TMP_2");
    }

    #[test]
    fn gene_id_invalid() {
        let mut ids = IdAllocator::default().with_make_missing_stable_ids(false);
        let gene = Feature::new("gene", "gene-bad");
        assert_eq!(
            ids.normalize_gene_id(&gene),
            Err(AnnotationError::InvalidIdentifier("gene-bad".to_string()))
        );
    }

    #[test]
    fn gene_id_from_gene_id_xref() {
        let mut ids = IdAllocator::default().with_make_missing_stable_ids(false);
        let gene = Feature::new("gene", "bad")
            .with_qualifier("Dbxref", "UniProt:P12345")
            .with_qualifier("Dbxref", "GeneID:000001");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "GeneID_000001");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "GeneID_000001_2");
        assert_eq!(ids.normalize_gene_id(&gene).unwrap(), "GeneID_000001_3");
    }

    #[test]
    fn gene_id_too_many_duplicates() {
        let mut ids = IdAllocator::default();
        let gene = Feature::new("gene", "bad").with_qualifier("Dbxref", "GeneID:000001");
        for _ in 0..MAX_ID_DUPLICATES {
            assert!(ids.normalize_gene_id(&gene).is_ok());
        }
        assert!(matches!(
            ids.normalize_gene_id(&gene),
            Err(AnnotationError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn gene_id_malformed_xref() {
        let mut ids = IdAllocator::default();
        let gene = Feature::new("gene", "bad").with_qualifier("Dbxref", "GeneID");
        assert!(matches!(
            ids.normalize_gene_id(&gene),
            Err(AnnotationError::MalformedQualifier { .. })
        ));
    }

    #[test]
    fn pseudogene_good_id() {
        let ids = IdAllocator::default();
        let table = CategoryTable::default();
        let mut gene = pseudogene("LOREMIPSUM1", "cds-LOREMIPSUM1_p1");
        ids.normalize_pseudogene_translation_ids(&mut gene, &table)
            .unwrap();
        let cds = first_translation(&gene);
        assert_eq!(cds.id(), "LOREMIPSUM1_p1");
        assert!(!cds.qualifiers().contains("ID"));
    }

    #[test]
    fn pseudogene_invalid_id() {
        let ids = IdAllocator::default();
        let table = CategoryTable::default();
        let mut gene = pseudogene("LOREMIPSUM1", "cds:bad");
        ids.normalize_pseudogene_translation_ids(&mut gene, &table)
            .unwrap();
        let cds = first_translation(&gene);
        assert_eq!(cds.id(), "LOREMIPSUM1_t1_cds");
        assert_eq!(cds.qualifiers().first("ID"), Some("LOREMIPSUM1_t1_cds"));
    }

    #[test]
    fn pseudogene_same_id_as_gene() {
        let ids = IdAllocator::default();
        let table = CategoryTable::default();
        let mut gene = pseudogene("LOREMIPSUM1", "cds-LOREMIPSUM1");
        ids.normalize_pseudogene_translation_ids(&mut gene, &table)
            .unwrap();
        assert_eq!(first_translation(&gene).id(), "LOREMIPSUM1_t1_cds");

        // regular genes may share the id
        let mut gene = pseudogene("LOREMIPSUM1", "cds-LOREMIPSUM1");
        ids.normalize_translation_ids(&mut gene, &table).unwrap();
        assert_eq!(first_translation(&gene).id(), "LOREMIPSUM1");
    }

    #[test]
    fn pseudogene_without_translation() {
        let ids = IdAllocator::default();
        let table = CategoryTable::default();
        let mut gene = Feature::new("pseudogene", "LOREMIPSUM1")
            .with_child(Feature::new("pseudogenic_transcript", "LOREMIPSUM1_t1"));
        let expected = gene.clone();
        ids.normalize_pseudogene_translation_ids(&mut gene, &table)
            .unwrap();
        assert_eq!(gene, expected);
    }

    #[test]
    fn pseudogene_unknown_type() {
        let ids = IdAllocator::default();
        let table = CategoryTable::default();
        let mut gene = Feature::new("pseudogene", "LOREMIPSUM1")
            .with_child(Feature::new("foobar", "LOREMIPSUM1_t1"));
        assert_eq!(
            ids.normalize_pseudogene_translation_ids(&mut gene, &table),
            Err(AnnotationError::UnknownCategory("foobar".to_string()))
        );
    }

    #[test]
    fn change_configuration() {
        let mut ids = IdAllocator::default();
        ids.set_prefix("LOREM_");
        ids.validator_mut().set_min_id_length(3);
        assert_eq!(ids.generate_id(), "LOREM_1");
        assert!(ids.is_valid("abc"));

        ids.set_make_missing_stable_ids(false);
        assert!(!ids.make_missing_stable_ids());
        assert_eq!(
            ids.normalize_gene_id(&Feature::new("gene", "gene-1")),
            Err(AnnotationError::InvalidIdentifier("gene-1".to_string()))
        );
    }
}
