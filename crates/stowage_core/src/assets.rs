//! Object storage collaborator seam.
//!
//! # Responsibility
//! - Define the opaque asset key stored on bins and items.
//! - Define the storage contract the surrounding layer implements.
//!
//! # Invariants
//! - The core never inspects or validates stored content.
//! - Deleting a catalog record never deletes the referenced object; asset
//!   lifecycle belongs to the collaborator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque key for a binary object held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub enum ObjectStoreError {
    /// No object is stored under the given key.
    UnknownKey(AssetKey),
    /// Collaborator-side failure.
    Backend(String),
}

impl Display for ObjectStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown asset key: {key}"),
            Self::Backend(message) => write!(f, "object store failure: {message}"),
        }
    }
}

impl Error for ObjectStoreError {}

/// Storage contract consumed by the core. `put` stores bytes and returns an
/// opaque key; `resolve` turns a key into a retrievable location.
pub trait ObjectStore {
    fn put(&mut self, bytes: &[u8], content_hint: &str) -> Result<AssetKey, ObjectStoreError>;
    fn resolve(&self, key: &AssetKey) -> Result<String, ObjectStoreError>;
}

/// In-memory object store for demos and tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<AssetKey, (String, Vec<u8>)>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&mut self, bytes: &[u8], content_hint: &str) -> Result<AssetKey, ObjectStoreError> {
        let key = AssetKey::new(Uuid::new_v4().to_string());
        self.objects
            .insert(key.clone(), (content_hint.to_string(), bytes.to_vec()));
        Ok(key)
    }

    fn resolve(&self, key: &AssetKey) -> Result<String, ObjectStoreError> {
        if !self.objects.contains_key(key) {
            return Err(ObjectStoreError::UnknownKey(key.clone()));
        }
        Ok(format!("memory://{key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryObjectStore, ObjectStore, ObjectStoreError};

    #[test]
    fn put_then_resolve_roundtrip() {
        let mut store = MemoryObjectStore::new();
        let key = store.put(b"jpeg bytes", "image/jpeg").unwrap();
        let location = store.resolve(&key).unwrap();
        assert!(location.starts_with("memory://"));
    }

    #[test]
    fn resolve_unknown_key_fails() {
        let store = MemoryObjectStore::new();
        let missing = super::AssetKey::new("nope");
        assert!(matches!(
            store.resolve(&missing),
            Err(ObjectStoreError::UnknownKey(_))
        ));
    }
}
