//! Parsed GFF3 features as handed over by the GFF3 reader
//!
//! A [`Feature`] is a node of the parsed tree: a raw GFF3 type, an identifier,
//! the qualifiers (column 9 attributes) and the ordered sub-features.
use core::fmt::Debug;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::{AnnotationError, AnnotationResult};

/// Qualifier holding the cross references of a feature
pub const XREF_KEY: &str = "Dbxref";
/// Qualifier mirroring the identifier of a feature
pub const ID_KEY: &str = "ID";

/// Column 9 attributes of a GFF3 feature
///
/// Every key maps to an ordered list of values, because GFF3 allows
/// comma separated multi-values (e.g. `Dbxref=GeneID:1,UniProt:P1`).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Qualifiers {
    inner: BTreeMap<String, Vec<String>>,
}

impl Qualifiers {
    /// Constructs a new, empty set of qualifiers
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the qualifier `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Returns all values of the qualifier `key`
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// Returns the first value of the qualifier `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns all values of the qualifier `key`
    ///
    /// # Errors
    ///
    /// [`AnnotationError::MissingQualifier`] if the qualifier is absent
    pub fn require(&self, key: &str) -> AnnotationResult<&[String]> {
        self.get(key)
            .ok_or_else(|| AnnotationError::MissingQualifier(key.to_string()))
    }

    /// Replaces all values of `key` by the single `value`
    pub fn set<S: Into<String>>(&mut self, key: &str, value: S) {
        self.inner.insert(key.to_string(), vec![value.into()]);
    }

    /// Appends `value` to the values of `key`
    pub fn push<S: Into<String>>(&mut self, key: &str, value: S) {
        self.inner
            .entry(key.to_string())
            .or_default()
            .push(value.into());
    }

    /// Removes the qualifier `key` and returns its values
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.inner.remove(key)
    }

    /// Parses the `Dbxref` qualifier into [`Xref`]s
    ///
    /// A feature without cross references returns an empty list.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::MalformedQualifier`] if an entry is not `db:value`
    pub fn xrefs(&self) -> AnnotationResult<Vec<Xref>> {
        match self.get(XREF_KEY) {
            Some(values) => values.iter().map(|v| v.parse::<Xref>()).collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Iterates all qualifiers in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the number of qualifier keys
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no qualifier is present
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A cross reference to an external database, e.g. `GeneID:000001`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Xref {
    db: String,
    value: String,
}

impl Xref {
    pub fn new(db: &str, value: &str) -> Self {
        Self {
            db: db.to_string(),
            value: value.to_string(),
        }
    }

    /// The database tag, e.g. `GeneID`
    pub fn db(&self) -> &str {
        &self.db
    }

    /// The accession within the database
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Xref {
    type Err = AnnotationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((db, value)) if !db.is_empty() && !value.is_empty() => Ok(Xref::new(db, value)),
            _ => Err(AnnotationError::MalformedQualifier {
                key: XREF_KEY.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Xref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.db, self.value)
    }
}

/// A single node of a parsed GFF3 tree
///
/// # Examples
///
/// ```
/// use gff3_tidy::Feature;
///
/// let gene = Feature::new("gene", "gene-ABC1234")
///     .with_qualifier("Dbxref", "GeneID:000001")
///     .with_child(Feature::new("mRNA", "ABC1234-RA"));
///
/// assert_eq!(gene.sub_features().len(), 1);
/// assert_eq!(gene.qualifiers().xrefs().unwrap()[0].db(), "GeneID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    kind: String,
    id: String,
    qualifiers: Qualifiers,
    sub_features: Vec<Feature>,
}

impl Feature {
    /// Initializes a new feature without qualifiers and sub-features
    pub fn new(kind: &str, id: &str) -> Feature {
        Feature {
            kind: kind.to_string(),
            id: id.to_string(),
            qualifiers: Qualifiers::default(),
            sub_features: Vec::new(),
        }
    }

    /// Builds a feature from parsed GFF3 attributes
    ///
    /// The identifier is taken from the `ID` qualifier, which stays part of
    /// the qualifiers.
    ///
    /// # Errors
    ///
    /// - [`AnnotationError::MissingQualifier`] if there is no `ID`
    /// - [`AnnotationError::MalformedQualifier`] if `ID` is empty or has
    ///   more than one value
    ///
    /// # Examples
    ///
    /// ```
    /// use gff3_tidy::{Feature, Qualifiers};
    ///
    /// let mut qualifiers = Qualifiers::new();
    /// qualifiers.set("ID", "gene-LOREMIPSUM1");
    /// let gene = Feature::from_qualifiers("gene", qualifiers).unwrap();
    /// assert_eq!(gene.id(), "gene-LOREMIPSUM1");
    ///
    /// assert!(Feature::from_qualifiers("gene", Qualifiers::new()).is_err());
    /// ```
    pub fn from_qualifiers(kind: &str, qualifiers: Qualifiers) -> AnnotationResult<Feature> {
        let id = match qualifiers.require(ID_KEY)? {
            [id] if !id.is_empty() => id.clone(),
            values => {
                return Err(AnnotationError::MalformedQualifier {
                    key: ID_KEY.to_string(),
                    value: values.join(","),
                })
            }
        };
        Ok(Feature {
            kind: kind.to_string(),
            id,
            qualifiers,
            sub_features: Vec::new(),
        })
    }

    /// Adds a value to the qualifier `key`
    #[must_use]
    pub fn with_qualifier(mut self, key: &str, value: &str) -> Self {
        self.qualifiers.push(key, value);
        self
    }

    /// Appends a sub-feature
    #[must_use]
    pub fn with_child(mut self, child: Feature) -> Self {
        self.sub_features.push(child);
        self
    }

    /// The raw GFF3 type (column 3), e.g. `mRNA`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Updates the identifier, leaving the `ID` qualifier untouched
    pub fn set_id<S: Into<String>>(&mut self, id: S) {
        self.id = id.into();
    }

    /// Updates the identifier and mirrors it into the `ID` qualifier
    pub fn rename<S: Into<String>>(&mut self, id: S) {
        self.id = id.into();
        self.qualifiers.set(ID_KEY, self.id.clone());
    }

    pub fn qualifiers(&self) -> &Qualifiers {
        &self.qualifiers
    }

    pub fn qualifiers_mut(&mut self) -> &mut Qualifiers {
        &mut self.qualifiers
    }

    pub fn sub_features(&self) -> &[Feature] {
        &self.sub_features
    }

    pub fn sub_features_mut(&mut self) -> &mut Vec<Feature> {
        &mut self.sub_features
    }

    /// Returns `true` for `pseudogene` and its sub-types
    pub fn is_pseudogene(&self) -> bool {
        self.kind.starts_with("pseudogene")
    }
}
