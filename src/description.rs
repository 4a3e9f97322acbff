//! Descriptions of genes, transcripts and translations
//!
//! Provider annotations often describe only the translation (`product=...`)
//! while the database needs a description on the gene as well.
//! [`transfer_descriptions`] copies informative descriptions up the
//! hierarchy, [`product_is_informative`] decides what counts as informative.
use tracing::debug;

use crate::category::Category;
use crate::graph::AnnotationGraph;

/// Words that do not describe the function of a feature
const NON_INFORMATIVE_WORDS: [&str; 23] = [
    "hypothetical",
    "putative",
    "uncharacterized",
    "uncharacterised",
    "unspecified",
    "unknown",
    "conserved",
    "predicted",
    "probable",
    "possible",
    "fragment",
    "partial",
    "variant",
    "isoform",
    "product",
    "function",
    "protein",
    "gene",
    "transcript",
    "rna",
    "of",
    "the",
    "with",
];

/// Alphanumeric words of `text`, punctuation, `_` and `-` act as separators
fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Words that may be followed by a number (`variant 2`, `isoform X1`)
const NUMBERED_WORDS: [&str; 2] = ["variant", "isoform"];

/// `2` or `x2`, the suffix of a numbered variant
fn is_variant_number(word: &str) -> bool {
    let digits = word.strip_prefix('x').unwrap_or(word);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_boilerplate(word: &str, previous: Option<&str>) -> bool {
    NON_INFORMATIVE_WORDS.contains(&word)
        || (previous.is_some_and(|prev| NUMBERED_WORDS.contains(&prev)) && is_variant_number(word))
}

/// Returns `true` if `description` says more than boilerplate
///
/// A description is not informative if it is empty or only consists of
/// - generic words like `hypothetical protein`, `unknown function`,
///   `conserved`, `putative` and numbered suffixes like `variant 2` or
///   `isoform X1`
/// - the identifier of the feature itself (case insensitive)
///
/// Punctuation, `_` and `-` only separate words and are otherwise ignored.
///
/// # Examples
///
/// ```
/// use gff3_tidy::description::product_is_informative;
///
/// assert!(product_is_informative("conserved hypothetical transmembrane protein", None));
/// assert!(!product_is_informative("hypothetical protein", None));
/// assert!(!product_is_informative("PROTID12345", Some("PROTID12345")));
/// ```
pub fn product_is_informative(description: &str, feature_id: Option<&str>) -> bool {
    let mut description = description.to_lowercase();
    if let Some(feature_id) = feature_id.filter(|id| !id.is_empty()) {
        description = description.replace(&feature_id.to_lowercase(), " ");
    }
    let words = words(&description);
    words.iter().enumerate().any(|(idx, word)| {
        let previous = idx.checked_sub(1).map(|prev| words[prev]);
        !is_boilerplate(word, previous)
    })
}

/// Returns the description of a record if it is informative
fn informative_description(
    graph: &AnnotationGraph,
    category: &Category,
    id: &str,
) -> Option<String> {
    graph
        .get_record(category, id)
        .and_then(|record| record.description())
        .filter(|description| product_is_informative(description, Some(id)))
        .map(str::to_string)
}

/// Fills missing gene and transcript descriptions in one pass over all genes
///
/// For every transcript of a gene:
/// - a transcript without description takes the first informative
///   description of its translations
/// - a gene without description takes the informative description of the
///   transcript or, failing that, of the transcript's translations
///
/// Existing non-empty descriptions are never overwritten. Genes are visited in
/// identifier order, transcripts and translations in the order they were
/// linked.
pub fn transfer_descriptions(graph: &mut AnnotationGraph) {
    let gene_ids = match graph.get_features(&Category::Gene) {
        Ok(genes) => genes.ids(),
        Err(_) => return,
    };

    for gene_id in gene_ids {
        let transcript_ids = graph
            .children(&Category::Gene, &gene_id)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        for transcript_id in transcript_ids {
            let Some(transcript) = graph.get_record(&Category::Transcript, &transcript_id) else {
                continue;
            };
            let transcript_has_description = transcript.has_description();
            let translation_description = transcript
                .children()
                .iter()
                .find_map(|id| informative_description(graph, &Category::Translation, id));

            let mut transcript_description =
                informative_description(graph, &Category::Transcript, &transcript_id);

            if !transcript_has_description {
                if let Some(description) = &translation_description {
                    debug!("Transfer description from translation to {transcript_id}: {description}");
                    if let Some(record) = graph.get_record_mut(&Category::Transcript, &transcript_id) {
                        record.set_description(description);
                    }
                    transcript_description = Some(description.clone());
                }
            }

            let gene_has_description = graph
                .get_record(&Category::Gene, &gene_id)
                .is_some_and(|gene| gene.has_description());
            if gene_has_description {
                continue;
            }
            if let Some(description) = transcript_description.or(translation_description) {
                debug!("Transfer description to gene {gene_id}: {description}");
                if let Some(record) = graph.get_record_mut(&Category::Gene, &gene_id) {
                    record.set_description(&description);
                }
            }
        }
    }
}
