use std::collections::hash_map::Values;
use std::collections::HashMap;

use crate::graph::AnnotationRecord;

/// All records of one [`crate::Category`], keyed by identifier
#[derive(Debug, Default, Clone)]
pub struct RecordArena {
    records: HashMap<String, AnnotationRecord>,
}

impl RecordArena {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub(crate) fn insert(&mut self, record: AnnotationRecord) {
        self.records.insert(record.id().to_string(), record);
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationRecord> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut AnnotationRecord> {
        self.records.get_mut(id)
    }

    pub fn values(&self) -> Values<'_, String, AnnotationRecord> {
        self.records.values()
    }

    /// Returns all identifiers in lexicographic order
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

impl<'a> IntoIterator for &'a RecordArena {
    type Item = &'a AnnotationRecord;
    type IntoIter = Values<'a, String, AnnotationRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
