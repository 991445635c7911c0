//! Persistence seam for published documents.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::slug::InsertError;

/// A store that inserts documents under unique slugs.
///
/// `insert_document` must be atomic: of two concurrent inserts with the same
/// slug exactly one succeeds and the other reports
/// [`InsertError::Conflict`].
pub trait DocumentStore {
    fn insert_document(&self, slug: &str, payload: &str) -> Result<(), InsertError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn insert_document(&self, slug: &str, payload: &str) -> Result<(), InsertError> {
        (**self).insert_document(slug, payload)
    }
}

/// In-memory store, mainly for tests and single process deployments
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // a panicking writer cannot leave the map half updated
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Stored payload for a slug
    pub fn get(&self, slug: &str) -> Option<String> {
        self.documents().get(slug).cloned()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.documents().contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    /// All slugs, sorted
    pub fn slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.documents().keys().cloned().collect();
        slugs.sort();
        slugs
    }
}

impl DocumentStore for MemoryStore {
    fn insert_document(&self, slug: &str, payload: &str) -> Result<(), InsertError> {
        match self.documents().entry(slug.to_string()) {
            Entry::Occupied(_) => Err(InsertError::Conflict),
            Entry::Vacant(entry) => {
                entry.insert(payload.to_string());
                Ok(())
            }
        }
    }
}
