use smallvec::SmallVec;

use crate::category::Category;
use crate::description::product_is_informative;
use crate::feature::{Feature, Xref};
use crate::{AnnotationResult, DEFAULT_NUM_CHILDREN};

/// Qualifiers holding a description, in order of preference
const DESCRIPTION_KEYS: [&str; 3] = ["description", "product", "Name"];
const NAME_KEY: &str = "Name";

/// Identifiers of the direct children of a record, in insertion order
pub type Children = SmallVec<[String; DEFAULT_NUM_CHILDREN]>;

/// The functional annotation of a single feature
///
/// Records are owned by the [`crate::AnnotationGraph`] and refer to their
/// parent and children by identifier only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    id: String,
    category: Category,
    description: Option<String>,
    synonym: Option<String>,
    parent: Option<String>,
    children: Children,
    xrefs: Vec<Xref>,
    is_pseudogene: bool,
}

impl AnnotationRecord {
    /// Initializes a record without any annotation
    pub fn new(id: &str, category: Category) -> AnnotationRecord {
        AnnotationRecord {
            id: id.to_string(),
            category,
            description: None,
            synonym: None,
            parent: None,
            children: Children::new(),
            xrefs: Vec::new(),
            is_pseudogene: false,
        }
    }

    /// Builds the record of a parsed feature
    ///
    /// The description is the first informative value of the `description`,
    /// `product` or `Name` qualifiers. `Name` also becomes the synonym if it
    /// differs from the identifier.
    ///
    /// # Errors
    ///
    /// [`crate::AnnotationError::MalformedQualifier`] if the cross references
    /// cannot be parsed
    pub fn from_feature(feature: &Feature, category: Category) -> AnnotationResult<Self> {
        let mut record = AnnotationRecord::new(feature.id(), category);
        let qualifiers = feature.qualifiers();

        record.description = DESCRIPTION_KEYS
            .iter()
            .filter_map(|key| qualifiers.first(key))
            .find(|value| product_is_informative(value, Some(feature.id())))
            .map(str::to_string);

        record.synonym = qualifiers
            .first(NAME_KEY)
            .filter(|name| *name != feature.id())
            .map(str::to_string);

        record.xrefs = qualifiers.xrefs()?;
        record.is_pseudogene = feature.is_pseudogene();
        Ok(record)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `true` if the record has a non-empty description
    pub fn has_description(&self) -> bool {
        self.description.as_ref().is_some_and(|d| !d.is_empty())
    }

    pub fn synonym(&self) -> Option<&str> {
        self.synonym.as_deref()
    }

    /// The identifier of the parent record, `None` for roots
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn xrefs(&self) -> &[Xref] {
        &self.xrefs
    }

    pub fn is_pseudogene(&self) -> bool {
        self.is_pseudogene
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    pub(crate) fn set_parent(&mut self, parent_id: &str) {
        self.parent = Some(parent_id.to_string());
    }

    /// Adds a child
    ///
    /// Returns whether the child was newly inserted
    pub(crate) fn add_child(&mut self, child_id: &str) -> bool {
        if self.children.iter().any(|child| child == child_id) {
            false
        } else {
            self.children.push(child_id.to_string());
            true
        }
    }
}
