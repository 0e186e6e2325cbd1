//! Registered subject categories.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tcr_crypto::subject_hash;
use tcr_types::SubjectHash;

use crate::error::RegistryError;

#[derive(Clone, Debug, Default)]
pub struct SubjectBook {
    order: Vec<SubjectHash>,
    names: HashMap<SubjectHash, String>,
}

/// A subject as persisted in snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub hash: SubjectHash,
    pub name: String,
}

impl SubjectBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash `name` and register it. Surrounding whitespace is not part of the name.
    pub fn register(&mut self, name: &str) -> Result<SubjectHash, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::InvalidSubjectName);
        }
        let hash = subject_hash(name);
        if self.names.contains_key(&hash) {
            return Err(RegistryError::SubjectExists(hash));
        }
        self.order.push(hash);
        self.names.insert(hash, name.to_string());
        Ok(hash)
    }

    pub fn contains(&self, hash: &SubjectHash) -> bool {
        self.names.contains_key(hash)
    }

    pub fn name(&self, hash: &SubjectHash) -> Option<&str> {
        self.names.get(hash).map(String::as_str)
    }

    /// Registered subjects, in registration order.
    pub fn hashes(&self) -> &[SubjectHash] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn entries(&self) -> Vec<SubjectEntry> {
        self.order
            .iter()
            .filter_map(|h| {
                self.names.get(h).map(|name| SubjectEntry {
                    hash: *h,
                    name: name.clone(),
                })
            })
            .collect()
    }

    pub fn from_entries(entries: Vec<SubjectEntry>) -> Self {
        let mut book = Self::new();
        for entry in entries {
            if book.names.contains_key(&entry.hash) {
                continue;
            }
            book.order.push(entry.hash);
            book.names.insert(entry.hash, entry.name);
        }
        book
    }
}
