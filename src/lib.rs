//! Normalization of GFF3 gene models before they are loaded into a genome database
//!
//! The crate covers two closely related jobs:
//!
//! - **Stable IDs**: validate, repair or synthesize the identifiers of genes,
//!   transcripts and translations ([`stable_id`]).
//! - **Functional annotation**: index the features into a typed
//!   gene → transcript → translation hierarchy and propagate descriptions
//!   between the levels ([`graph`], [`description`]).
//!
//! Parsing and writing GFF3 is left to the caller. This crate works on an
//! already parsed tree of [`Feature`]s.
//!
//! # Examples
//!
//! ```
//! use gff3_tidy::{CategoryTable, Feature, Normalizer};
//!
//! let table = CategoryTable::default();
//! let mut features = vec![
//!     Feature::new("gene", "gene-LOREMIPSUM1").with_child(
//!         Feature::new("mRNA", "LOREMIPSUM1-RA").with_child(
//!             Feature::new("CDS", "cds-LOREMIPSUM1-PA")
//!                 .with_qualifier("product", "DNA polymerase"),
//!         ),
//!     ),
//! ];
//!
//! let mut normalizer = Normalizer::new(&table);
//! normalizer.normalize(&mut features).unwrap();
//!
//! assert_eq!(features[0].id(), "LOREMIPSUM1");
//! assert_eq!(
//!     features[0].qualifiers().first("description"),
//!     Some("DNA polymerase")
//! );
//! ```
use thiserror::Error;

pub mod category;
pub mod description;
#[cfg(feature = "download")]
pub mod download;
pub mod feature;
pub mod graph;
pub mod normalize;
pub mod stable_id;

pub use category::{Category, CategoryTable};
pub use feature::{Feature, Qualifiers, Xref};
pub use graph::{AnnotationGraph, AnnotationRecord};
pub use normalize::Normalizer;
pub use stable_id::{IdAllocator, IdRejection, IdValidator};

/// Identifiers shorter than this are rejected by default
const DEFAULT_MIN_ID_LENGTH: usize = 7;
/// Prefix of generated identifiers
const DEFAULT_ID_PREFIX: &str = "TMP_";
/// Highest suffix tried when de-duplicating a `GeneID` derived identifier
const MAX_ID_DUPLICATES: usize = 10;
/// Inline capacity for the child list of a record
const DEFAULT_NUM_CHILDREN: usize = 4;

/// Main error type of the crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// No valid identifier could be produced for a feature
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// An identifier is used twice and the collision cannot be resolved
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),
    /// A feature type or category is not part of the lookup table
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// A child references a parent that was not added (yet)
    #[error("missing parent: {0}")]
    MissingParent(String),
    /// The relation between two features is structurally impossible
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),
    /// A required qualifier is absent
    #[error("missing qualifier {0}")]
    MissingQualifier(String),
    /// A qualifier value cannot be parsed
    #[error("malformed qualifier {key}: {value}")]
    MalformedQualifier { key: String, value: String },
}

/// Shortcut for `Result<T, AnnotationError>`
pub type AnnotationResult<T> = Result<T, AnnotationError>;
