//! The shared key-value state store.
//!
//! [`StateStore`] maps colon-delimited string keys (`dynamodb:table:<name>`)
//! to typed records. It is constructed explicitly by each service state and
//! passed by reference; all access is synchronized internally by `DashMap`
//! shard locks.
//!
//! Prefix listing is the only query capability. Optimistic-concurrency
//! checks go through [`StateStore::put_if_revision`],
//! [`StateStore::update_if_revision`] and [`StateStore::delete_if_revision`],
//! which compare and write under the same entry lock.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Errors raised by [`StateStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record under the key.
    #[error("no record stored under key '{0}'")]
    NotFound(String),

    /// A record already exists under the key.
    #[error("a record already exists under key '{0}'")]
    AlreadyExists(String),

    /// The stored revision differs from the expected one, or nothing is stored.
    #[error(
        "revision mismatch for key '{key}': expected {expected}, found {}",
        .found.as_deref().unwrap_or("none")
    )]
    RevisionMismatch {
        /// Key of the record.
        key: String,
        /// Revision the caller expected.
        expected: String,
        /// Revision actually stored, if any.
        found: Option<String>,
    },
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A record carrying an opaque revision token for optimistic concurrency.
pub trait Revisioned {
    /// The record's current revision ID.
    fn revision_id(&self) -> &str;
}

/// Thread-safe, in-memory key-value store with prefix listing.
#[derive(Debug)]
pub struct StateStore<V> {
    inner: DashMap<String, V>,
}

impl<V: Clone> StateStore<V> {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Read the record under `key`, failing with [`StoreError::NotFound`].
    pub fn get(&self, key: &str) -> StoreResult<V> {
        self.find(key)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }

    /// Read the record under `key`, if any.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<V> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Insert or replace the record under `key`, returning the previous one.
    pub fn set(&self, key: impl Into<String>, value: V) -> Option<V> {
        self.inner.insert(key.into(), value)
    }

    /// Insert a record only if the key is vacant.
    pub fn insert_new(&self, key: impl Into<String>, value: V) -> StoreResult<()> {
        match self.inner.entry(key.into()) {
            Entry::Occupied(e) => Err(StoreError::AlreadyExists(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }

    /// Remove the record under `key`. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) -> Option<V> {
        self.inner.remove(key).map(|(_, v)| v)
    }

    /// Whether a record exists under `key`.
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// All keys starting with `prefix`, sorted ascending.
    #[must_use]
    pub fn list(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .iter()
            .filter(|r| r.key().starts_with(prefix))
            .map(|r| r.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// All records whose key starts with `prefix`, ordered by key.
    #[must_use]
    pub fn list_values(&self, prefix: &str) -> Vec<V> {
        let mut entries: Vec<(String, V)> = self
            .inner
            .iter()
            .filter(|r| r.key().starts_with(prefix))
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Mutate the record under `key` while holding its entry lock.
    ///
    /// The closure must not access this store.
    pub fn update<R>(&self, key: &str, f: impl FnOnce(&mut V) -> R) -> StoreResult<R> {
        let mut entry = self
            .inner
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        Ok(f(entry.value_mut()))
    }

    /// Like [`update`](Self::update), but the closure may reject the change.
    ///
    /// The closure works on a copy; the stored record is replaced only when
    /// it returns `Ok`, so a rejected update leaves no partial mutation.
    pub fn try_update<R, E>(
        &self,
        key: &str,
        f: impl FnOnce(&mut V) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut entry = self
            .inner
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        let mut draft = entry.value().clone();
        let out = f(&mut draft)?;
        *entry.value_mut() = draft;
        Ok(out)
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<V: Clone + Revisioned> StateStore<V> {
    /// Compare-and-swap write.
    ///
    /// With `expected = None` this is an unconditional upsert. With
    /// `expected = Some(rev)` the write succeeds only if a record exists and
    /// its revision equals `rev`; otherwise the stored value is untouched and
    /// [`StoreError::RevisionMismatch`] is returned.
    pub fn put_if_revision(
        &self,
        key: impl Into<String>,
        expected: Option<&str>,
        value: V,
    ) -> StoreResult<Option<V>> {
        match (self.inner.entry(key.into()), expected) {
            (Entry::Occupied(mut e), Some(expected)) => {
                if e.get().revision_id() != expected {
                    return Err(StoreError::RevisionMismatch {
                        key: e.key().clone(),
                        expected: expected.to_owned(),
                        found: Some(e.get().revision_id().to_owned()),
                    });
                }
                Ok(Some(e.insert(value)))
            }
            (Entry::Occupied(mut e), None) => Ok(Some(e.insert(value))),
            (Entry::Vacant(e), Some(expected)) => Err(StoreError::RevisionMismatch {
                key: e.key().clone(),
                expected: expected.to_owned(),
                found: None,
            }),
            (Entry::Vacant(e), None) => {
                e.insert(value);
                Ok(None)
            }
        }
    }

    /// Mutate an existing record after checking its revision under the entry lock.
    pub fn update_if_revision<R>(
        &self,
        key: &str,
        expected: Option<&str>,
        f: impl FnOnce(&mut V) -> R,
    ) -> StoreResult<R> {
        let mut entry = self
            .inner
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))?;
        if let Some(expected) = expected {
            if entry.value().revision_id() != expected {
                return Err(StoreError::RevisionMismatch {
                    key: key.to_owned(),
                    expected: expected.to_owned(),
                    found: Some(entry.value().revision_id().to_owned()),
                });
            }
        }
        Ok(f(entry.value_mut()))
    }

    /// Compare-and-swap delete. Without an expected revision, deleting an
    /// absent key succeeds with `None`; with one, absence is a mismatch.
    pub fn delete_if_revision(&self, key: &str, expected: Option<&str>) -> StoreResult<Option<V>> {
        match self.inner.entry(key.to_owned()) {
            Entry::Vacant(_) => match expected {
                Some(expected) => Err(StoreError::RevisionMismatch {
                    key: key.to_owned(),
                    expected: expected.to_owned(),
                    found: None,
                }),
                None => Ok(None),
            },
            Entry::Occupied(e) => {
                if let Some(expected) = expected {
                    if e.get().revision_id() != expected {
                        return Err(StoreError::RevisionMismatch {
                            key: key.to_owned(),
                            expected: expected.to_owned(),
                            found: Some(e.get().revision_id().to_owned()),
                        });
                    }
                }
                Ok(Some(e.remove()))
            }
        }
    }
}

impl<V: Clone> Default for StateStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
