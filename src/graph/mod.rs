//! The functional annotation graph of a genome record
//!
//! Features are stored as [`AnnotationRecord`]s per [`Category`] and linked
//! into a gene → transcript → translation forest.
use std::collections::HashMap;

use tracing::trace;

use crate::category::Category;
use crate::feature::Feature;
use crate::{AnnotationError, AnnotationResult};

mod arena;
mod record;

pub use arena::RecordArena;
pub use record::{AnnotationRecord, Children};

/// Categories registered by [`AnnotationGraph::default`]
const DEFAULT_CATEGORIES: [Category; 4] = [
    Category::Gene,
    Category::Transcript,
    Category::Translation,
    Category::TransposableElement,
];

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Index of the functional annotations of one genome record
///
/// The graph owns one [`AnnotationRecord`] per `(category, id)`. Identifiers
/// are unique within a category, the same identifier can be used in
/// different categories (e.g. a gene and its translation).
///
/// Every child category has exactly one parent category and every child has
/// at most one parent:
///
/// ```mermaid
/// erDiagram
///     GENE ||--o{ TRANSCRIPT : parent_of
///     TRANSCRIPT ||--o{ TRANSLATION : parent_of
///     TRANSPOSABLE_ELEMENT
/// ```
///
/// # Examples
///
/// ```
/// use gff3_tidy::{AnnotationGraph, Category, Feature};
///
/// let mut graph = AnnotationGraph::default();
/// graph.add_feature(&Feature::new("gene", "gene_A"), &Category::Gene, None).unwrap();
/// graph
///     .add_feature(&Feature::new("mRNA", "mrna_A"), &Category::Transcript, Some("gene_A"))
///     .unwrap();
///
/// assert_eq!(graph.get_parent(&Category::Gene, "mrna_A").unwrap(), "gene_A");
/// assert_eq!(graph.get_features(&Category::Transcript).unwrap().len(), 1);
/// assert!(graph.get_features(&Category::Translation).unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationGraph {
    records: HashMap<Category, RecordArena>,
    // parent category -> child id -> parent id
    parents: HashMap<Category, HashMap<String, String>>,
}

impl Default for AnnotationGraph {
    fn default() -> Self {
        Self::with_categories(DEFAULT_CATEGORIES)
    }
}

impl AnnotationGraph {
    /// Constructs a graph that accepts only the given categories
    pub fn with_categories<I: IntoIterator<Item = Category>>(categories: I) -> Self {
        let mut graph = AnnotationGraph {
            records: HashMap::new(),
            parents: HashMap::new(),
        };
        for category in categories {
            graph.register_category(category);
        }
        graph
    }

    /// Accepts features of `category` from now on
    ///
    /// Registering an already known category has no effect.
    pub fn register_category(&mut self, category: Category) {
        self.records.entry(category).or_default();
    }

    /// Returns `true` if features of `category` can be added
    pub fn has_category(&self, category: &Category) -> bool {
        self.records.contains_key(category)
    }

    /// Iterates all registered categories
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.records.keys()
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records.values().map(RecordArena::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn arena(&self, category: &Category) -> AnnotationResult<&RecordArena> {
        self.records
            .get(category)
            .ok_or_else(|| AnnotationError::UnknownCategory(category.to_string()))
    }

    fn arena_mut(&mut self, category: &Category) -> AnnotationResult<&mut RecordArena> {
        self.records
            .get_mut(category)
            .ok_or_else(|| AnnotationError::UnknownCategory(category.to_string()))
    }

    /// Adds the annotation of `feature` as a record of `category`
    ///
    /// If `parent_id` is given, the record is attached to the parent of the
    /// expected parent category (a transcript to a gene, a translation to a
    /// transcript). An empty `parent_id` is treated as `None`.
    ///
    /// # Errors
    ///
    /// - [`AnnotationError::UnknownCategory`]: `category` is not registered
    /// - [`AnnotationError::InvalidHierarchy`]: `category` cannot have a parent
    ///   (e.g. a gene), or the feature is already linked to another parent
    /// - [`AnnotationError::MissingParent`]: the parent record does not exist
    /// - [`AnnotationError::DuplicateIdentifier`]: the `(category, id)` pair
    ///   was already added
    /// - [`AnnotationError::MalformedQualifier`]: the cross references cannot be parsed
    pub fn add_feature(
        &mut self,
        feature: &Feature,
        category: &Category,
        parent_id: Option<&str>,
    ) -> AnnotationResult<()> {
        let feature_id = feature.id();
        self.arena(category)?;

        let parent = match parent_id.filter(|id| !id.is_empty()) {
            Some(parent_id) => {
                let Some(parent_category) = category.parent_category() else {
                    return Err(AnnotationError::InvalidHierarchy(format!(
                        "{category} {feature_id} cannot have a parent ({parent_id})"
                    )));
                };
                let linked = self.check_link(&parent_category, parent_id, feature_id)?;
                Some((parent_category, parent_id, linked))
            }
            None => None,
        };

        if self.arena(category)?.contains(feature_id) {
            return Err(AnnotationError::DuplicateIdentifier(format!(
                "{category} {feature_id} already added"
            )));
        }

        let record = AnnotationRecord::from_feature(feature, category.clone())?;
        self.arena_mut(category)?.insert(record);
        trace!("Added {category} {feature_id}");

        match parent {
            Some((parent_category, parent_id, true)) => {
                self.set_child_parent(&parent_category, parent_id, feature_id);
            }
            Some((parent_category, parent_id, false)) => {
                self.link(&parent_category, parent_id, feature_id);
            }
            None => {
                // linked with `add_parent_link` before the record existed
                if let Some(parent_category) = category.parent_category() {
                    let existing = self
                        .parents
                        .get(&parent_category)
                        .and_then(|links| links.get(feature_id))
                        .cloned();
                    if let Some(parent_id) = existing {
                        self.set_child_parent(&parent_category, &parent_id, feature_id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Attaches `child_id` to the record `(parent_category, parent_id)`
    ///
    /// The child record does not need to exist yet. Adding the same link
    /// twice has no effect.
    ///
    /// # Errors
    ///
    /// - [`AnnotationError::UnknownCategory`]: `parent_category` is not registered
    /// - [`AnnotationError::InvalidHierarchy`]: `parent_category` cannot have
    ///   children, or `child_id` is already linked to another parent
    /// - [`AnnotationError::MissingParent`]: the parent record does not exist
    pub fn add_parent_link(
        &mut self,
        parent_category: &Category,
        parent_id: &str,
        child_id: &str,
    ) -> AnnotationResult<()> {
        self.arena(parent_category)?;
        if parent_category.child_category().is_none() {
            return Err(AnnotationError::InvalidHierarchy(format!(
                "{parent_category} {parent_id} cannot have children ({child_id})"
            )));
        }
        if !self.check_link(parent_category, parent_id, child_id)? {
            self.link(parent_category, parent_id, child_id);
        }
        Ok(())
    }

    /// Returns the identifier of the parent of `child_id`
    ///
    /// # Errors
    ///
    /// - [`AnnotationError::UnknownCategory`]: `parent_category` is not registered
    /// - [`AnnotationError::MissingParent`]: `child_id` has no parent of that category
    pub fn get_parent(&self, parent_category: &Category, child_id: &str) -> AnnotationResult<&str> {
        self.arena(parent_category)?;
        self.parents
            .get(parent_category)
            .and_then(|links| links.get(child_id))
            .map(String::as_str)
            .ok_or_else(|| {
                AnnotationError::MissingParent(format!("no {parent_category} parent for {child_id}"))
            })
    }

    /// Returns all records of `category`
    ///
    /// # Errors
    ///
    /// [`AnnotationError::UnknownCategory`] if `category` is not registered
    pub fn get_features(&self, category: &Category) -> AnnotationResult<&RecordArena> {
        self.arena(category)
    }

    /// Returns the record `(category, id)`, if present
    pub fn get_record(&self, category: &Category, id: &str) -> Option<&AnnotationRecord> {
        self.records.get(category).and_then(|arena| arena.get(id))
    }

    pub(crate) fn get_record_mut(
        &mut self,
        category: &Category,
        id: &str,
    ) -> Option<&mut AnnotationRecord> {
        self.records
            .get_mut(category)
            .and_then(|arena| arena.get_mut(id))
    }

    /// Returns the identifiers of the children of `(category, id)`
    pub fn children(&self, category: &Category, id: &str) -> Option<&[String]> {
        self.get_record(category, id).map(AnnotationRecord::children)
    }

    /// Sets the description of `(category, id)`, replacing any existing one
    ///
    /// Returns `false` if there is no such record.
    ///
    /// # Errors
    ///
    /// [`AnnotationError::UnknownCategory`] if `category` is not registered
    pub fn set_description(
        &mut self,
        category: &Category,
        id: &str,
        description: &str,
    ) -> AnnotationResult<bool> {
        match self.arena_mut(category)?.get_mut(id) {
            Some(record) => {
                record.set_description(description);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fills missing gene and transcript descriptions from their children
    ///
    /// See [`crate::description::transfer_descriptions`]
    pub fn transfer_descriptions(&mut self) {
        crate::description::transfer_descriptions(self);
    }

    /// Checks that `child_id` can be attached to `(parent_category, parent_id)`
    ///
    /// Returns `true` if exactly this link already exists.
    fn check_link(
        &self,
        parent_category: &Category,
        parent_id: &str,
        child_id: &str,
    ) -> AnnotationResult<bool> {
        if !self.arena(parent_category)?.contains(parent_id) {
            return Err(AnnotationError::MissingParent(format!(
                "{parent_category} {parent_id} does not exist (child {child_id})"
            )));
        }
        match self
            .parents
            .get(parent_category)
            .and_then(|links| links.get(child_id))
        {
            Some(existing) if existing == parent_id => Ok(true),
            Some(existing) => Err(AnnotationError::InvalidHierarchy(format!(
                "{child_id} is already a child of {parent_category} {existing}, not {parent_id}"
            ))),
            None => Ok(false),
        }
    }

    /// Stores the link without any checks
    fn link(&mut self, parent_category: &Category, parent_id: &str, child_id: &str) {
        self.parents
            .entry(parent_category.clone())
            .or_default()
            .insert(child_id.to_string(), parent_id.to_string());

        if let Some(parent) = self.get_record_mut(parent_category, parent_id) {
            parent.add_child(child_id);
        }
        self.set_child_parent(parent_category, parent_id, child_id);
    }

    /// Updates the back-reference of an existing child record
    fn set_child_parent(&mut self, parent_category: &Category, parent_id: &str, child_id: &str) {
        if let Some(child_category) = parent_category.child_category() {
            if let Some(child) = self.get_record_mut(&child_category, child_id) {
                child.set_parent(parent_id);
            }
        }
    }
}
