//! Batched requests and their ordered results.
//!
//! Batch keys double as JSON-RPC ids: they are the only thing tying a reply
//! back to the request that produced it.

use std::collections::HashMap;

use crate::error::BatchError;

/// An ordered, uniquely-keyed set of requests sent in one round trip.
#[derive(Debug, Clone)]
pub struct Batch<R> {
    entries: Vec<(String, R)>,
    index: HashMap<String, usize>,
    next_index: usize,
}

impl<R> Default for Batch<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            next_index: 0,
        }
    }
}

impl<R> Batch<R> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request under a caller-chosen key.
    pub fn add(&mut self, key: impl Into<String>, request: R) -> Result<(), BatchError> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(BatchError::DuplicateKey(key));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, request));
        Ok(())
    }

    /// Add a request under `"{prefix}{n}"`, `n` being a per-batch running
    /// index. Returns the generated key.
    pub fn add_with_prefix(&mut self, prefix: &str, request: R) -> Result<String, BatchError> {
        let key = format!("{}{}", prefix, self.next_index);
        self.next_index += 1;
        self.add(key.clone(), request)?;
        Ok(key)
    }

    /// Look up a request by key.
    pub fn get(&self, key: &str) -> Option<&R> {
        let position = *self.index.get(key)?;
        self.entries.get(position).map(|(_, r)| r)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }
}

/// Batch results keyed by batch key, in the order the batch was built.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResponse<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for BatchResponse<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> BatchResponse<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Append a result. Callers keep keys unique; a repeated key shadows
    /// the earlier entry for `get`.
    pub fn push(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        let position = *self.index.get(key)?;
        self.entries.get(position).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for BatchResponse<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
