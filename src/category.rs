//! Semantic categories of GFF3 features
//!
//! GFF3 uses many raw types for the same role (`mRNA`, `tRNA`, `lnc_RNA` are
//! all transcripts). The [`CategoryTable`] maps every raw type to exactly one
//! [`Category`], the hierarchy rules are defined on the categories.
use core::fmt::Debug;
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::{AnnotationError, AnnotationResult};

const GENE_TYPES: [&str; 4] = ["gene", "pseudogene", "ncRNA_gene", "pseudogene_fragment"];
const TRANSCRIPT_TYPES: [&str; 13] = [
    "mRNA",
    "transcript",
    "pseudogenic_transcript",
    "primary_transcript",
    "tRNA",
    "rRNA",
    "snRNA",
    "snoRNA",
    "scRNA",
    "ncRNA",
    "lnc_RNA",
    "miRNA",
    "misc_RNA",
];
const TRANSLATION_TYPES: [&str; 1] = ["CDS"];
const TRANSPOSABLE_TYPES: [&str; 1] = ["transposable_element"];
const EXON_TYPES: [&str; 1] = ["exon"];
const UTR_TYPES: [&str; 2] = ["five_prime_UTR", "three_prime_UTR"];

/// The normalized semantic role of a feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Gene,
    Transcript,
    Translation,
    TransposableElement,
    /// A caller-defined category without parent or child rules
    Custom(String),
}

impl Category {
    /// Shortcut to build a [`Category::Custom`]
    pub fn custom(name: &str) -> Self {
        Category::Custom(name.to_string())
    }

    /// The only category a record of `self` can be attached to
    ///
    /// Genes, transposable elements and custom categories are always roots.
    pub fn parent_category(&self) -> Option<Category> {
        match self {
            Category::Transcript => Some(Category::Gene),
            Category::Translation => Some(Category::Transcript),
            _ => None,
        }
    }

    /// The only category that can be attached below `self`
    pub fn child_category(&self) -> Option<Category> {
        match self {
            Category::Gene => Some(Category::Transcript),
            Category::Transcript => Some(Category::Translation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Gene => "gene",
            Category::Transcript => "transcript",
            Category::Translation => "translation",
            Category::TransposableElement => "transposable_element",
            Category::Custom(name) => name,
        }
    }
}

impl FromStr for Category {
    type Err = AnnotationError;
    /// Parses one of the built-in category names
    ///
    /// Custom categories must be built with [`Category::custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gene" => Ok(Category::Gene),
            "transcript" => Ok(Category::Transcript),
            "translation" => Ok(Category::Translation),
            "transposable_element" => Ok(Category::TransposableElement),
            _ => Err(AnnotationError::UnknownCategory(s.to_string())),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookup table from raw GFF3 types to [`Category`]
///
/// The [`Default`] table knows the usual gene, transcript, CDS and
/// transposable element types as well as exons and UTRs.
///
/// # Examples
///
/// ```
/// use gff3_tidy::{Category, CategoryTable};
///
/// let mut table = CategoryTable::default();
/// assert_eq!(table.category("mRNA").unwrap(), &Category::Transcript);
/// assert!(table.category("chromosome").is_err());
///
/// table.insert("chromosome", Category::custom("region"));
/// assert_eq!(table.category("chromosome").unwrap().as_str(), "region");
/// ```
#[derive(Debug, Clone)]
pub struct CategoryTable {
    inner: HashMap<String, Category>,
}

impl CategoryTable {
    /// Constructs an empty table
    pub fn empty() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Maps `raw_type` to `category`, replacing any previous mapping
    pub fn insert(&mut self, raw_type: &str, category: Category) {
        self.inner.insert(raw_type.to_string(), category);
    }

    /// Returns the category of a raw GFF3 type
    ///
    /// # Errors
    ///
    /// [`AnnotationError::UnknownCategory`] if the raw type is not in the table
    pub fn category(&self, raw_type: &str) -> AnnotationResult<&Category> {
        self.inner
            .get(raw_type)
            .ok_or_else(|| AnnotationError::UnknownCategory(raw_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for raw in GENE_TYPES {
            table.insert(raw, Category::Gene);
        }
        for raw in TRANSCRIPT_TYPES {
            table.insert(raw, Category::Transcript);
        }
        for raw in TRANSLATION_TYPES {
            table.insert(raw, Category::Translation);
        }
        for raw in TRANSPOSABLE_TYPES {
            table.insert(raw, Category::TransposableElement);
        }
        for raw in EXON_TYPES {
            table.insert(raw, Category::custom("exon"));
        }
        for raw in UTR_TYPES {
            table.insert(raw, Category::custom("utr"));
        }
        table
    }
}
