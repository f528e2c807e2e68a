use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};
use rand::Rng;

use crate::error::{CollectionError, CollectionResult};

pub mod builder;
pub mod entry;
mod json;

pub use builder::CollectionBuilder;
pub use entry::Entry;

pub(crate) const DEFAULT_LABEL: &str = "collection";

/// A string-keyed map guarded by a single reader-writer lock.
///
/// Reads take the shared lock, mutations take the exclusive lock, and every
/// operation releases it before returning. Iteration order is whatever the
/// backing `HashMap` yields: unspecified, and not stable across mutations.
///
/// # Deadlocks
///
/// Callbacks (`each`, `find`, `every`, `some`, `filter`, `map`, `reduce`,
/// `sweep`) run while the lock is held. A callback must not call back into
/// the same collection: a mutation would wait on the lock the callback is
/// already holding.
///
/// To share a collection between threads wrap it in an `Arc`.
pub struct Collection<V> {
    label: String,
    data: RwLock<HashMap<String, V>>,
}

impl<V> Collection<V> {
    /// Creates an empty collection with room for `size_hint` entries.
    pub fn new(size_hint: usize) -> Self {
        Self::with_parts(DEFAULT_LABEL.to_string(), HashMap::with_capacity(size_hint))
    }

    pub fn builder() -> CollectionBuilder<V> {
        CollectionBuilder::new()
    }

    pub(crate) fn with_parts(label: String, data: HashMap<String, V>) -> Self {
        Collection {
            label,
            data: RwLock::new(data),
        }
    }

    /// Name used for this collection in log output
    pub fn label(&self) -> &str {
        &self.label
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, V>> {
        self.data.read().unwrap_or_else(|poisoned| {
            warn!("{}: recovering read lock poisoned by a panicking callback", self.label);
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, V>> {
        self.data.write().unwrap_or_else(|poisoned| {
            warn!("{}: recovering write lock poisoned by a panicking callback", self.label);
            poisoned.into_inner()
        })
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.write().insert(key.into(), value);
    }

    /// Removes `key` if present; absent keys are a no-op.
    pub fn delete(&self, key: &str) {
        self.write().remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let previous = std::mem::take(&mut *self.write());
        debug!("{}: cleared {} entries", self.label, previous.len());
    }

    /// Removes every entry for which `predicate` returns true and returns how
    /// many were removed.
    ///
    /// The whole pass runs under one exclusive lock acquisition, so no other
    /// reader or writer observes a partially swept collection.
    pub fn sweep<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&str, &V) -> bool,
    {
        let mut data = self.write();
        let before = data.len();
        data.retain(|key, value| !predicate(key, value));
        let removed = before - data.len();
        drop(data);

        debug!("{}: swept {} entries", self.label, removed);
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of all keys, in unspecified order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Calls `visitor` once per entry while holding the shared lock.
    pub fn each<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &V),
    {
        self.read().iter().for_each(|(key, value)| visitor(key, value));
    }

    /// True if every entry satisfies `predicate`; true for an empty collection.
    pub fn every<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.read().iter().all(|(key, value)| predicate(key, value))
    }

    /// True if at least one entry satisfies `predicate`.
    pub fn some<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.read().iter().any(|(key, value)| predicate(key, value))
    }

    /// Folds every value into `initial`.
    ///
    /// Values are visited in unspecified order, so `combine` must be
    /// associative and commutative for the result to be deterministic.
    pub fn reduce<A, F>(&self, mut combine: F, initial: A) -> A
    where
        F: FnMut(A, &V) -> A,
    {
        self.read().values().fold(initial, |acc, value| combine(acc, value))
    }

    /// New collection with the same keys and each value replaced by
    /// `transform(key, value)`. The source is not modified.
    pub fn map<U, F>(&self, mut transform: F) -> Collection<U>
    where
        F: FnMut(&str, &V) -> U,
    {
        let mapped = self
            .read()
            .iter()
            .map(|(key, value)| (key.clone(), transform(key, value)))
            .collect();
        Collection::with_parts(self.label.clone(), mapped)
    }

    /// Consumes the collection and returns the backing map.
    pub fn into_inner(self) -> HashMap<String, V> {
        self.data.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Collection<V> {
    /// Value stored under `key`, or `None` when absent.
    pub fn try_get(&self, key: &str) -> Option<V> {
        self.read().get(key).cloned()
    }

    /// Snapshot of all values, in unspecified order. Independent of any
    /// earlier `keys()` call; use `entries()` for aligned pairs.
    pub fn values(&self) -> Vec<V> {
        self.read().values().cloned().collect()
    }

    /// Snapshot of all key-value pairs, in unspecified order.
    pub fn entries(&self) -> Vec<Entry<V>> {
        self.read()
            .iter()
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
            .collect()
    }

    /// First value (in iteration order) satisfying `predicate`.
    pub fn find<F>(&self, mut predicate: F) -> Option<V>
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.read()
            .iter()
            .find(|(key, value)| predicate(key, value))
            .map(|(_, value)| value.clone())
    }

    /// Like `find`, but also returns the matching key.
    pub fn find_entry<F>(&self, mut predicate: F) -> Option<Entry<V>>
    where
        F: FnMut(&str, &V) -> bool,
    {
        self.read()
            .iter()
            .find(|(key, value)| predicate(key, value))
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
    }

    /// A uniformly chosen value, drawn with the thread-local generator.
    pub fn random(&self) -> CollectionResult<V> {
        self.random_with(&mut rand::rng())
    }

    /// A uniformly chosen value, drawn with `rng`.
    ///
    /// The size check and the lookup happen under the same shared lock, so a
    /// concurrent shrink can never invalidate the drawn index.
    pub fn random_with<R>(&self, rng: &mut R) -> CollectionResult<V>
    where
        R: Rng,
    {
        let data = self.read();
        if data.is_empty() {
            return log_and_err!(CollectionError::empty("random"));
        }
        let index = rng.random_range(0..data.len());
        data.values()
            .nth(index)
            .cloned()
            .ok_or_else(|| CollectionError::empty("random"))
    }

    /// Value of the first entry in iteration order.
    pub fn first(&self) -> CollectionResult<V> {
        match self.read().values().next() {
            Some(value) => Ok(value.clone()),
            None => log_and_err!(CollectionError::empty("first")),
        }
    }

    /// Value of the last entry in iteration order.
    pub fn last(&self) -> CollectionResult<V> {
        match self.read().values().last() {
            Some(value) => Ok(value.clone()),
            None => log_and_err!(CollectionError::empty("last")),
        }
    }

    /// New collection holding the first `n` entries in iteration order.
    pub fn first_n(&self, n: usize) -> CollectionResult<Collection<V>> {
        let data = self.read();
        if n > data.len() {
            return log_and_err!(CollectionError::out_of_range("first_n", n, data.len()));
        }
        let taken = data
            .iter()
            .take(n)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Collection::with_parts(self.label.clone(), taken))
    }

    /// New collection holding the last `n` entries in iteration order.
    pub fn last_n(&self, n: usize) -> CollectionResult<Collection<V>> {
        let data = self.read();
        if n > data.len() {
            return log_and_err!(CollectionError::out_of_range("last_n", n, data.len()));
        }
        let taken = data
            .iter()
            .skip(data.len() - n)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Collection::with_parts(self.label.clone(), taken))
    }

    /// New collection with the entries satisfying `predicate`.
    pub fn filter<F>(&self, mut predicate: F) -> Collection<V>
    where
        F: FnMut(&str, &V) -> bool,
    {
        let kept = self
            .read()
            .iter()
            .filter(|(key, value)| predicate(key, value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Collection::with_parts(self.label.clone(), kept)
    }

    /// New collection with this collection's entries followed by each of
    /// `others`, later sources overwriting earlier ones on shared keys.
    ///
    /// Sources are copied one at a time in call order (self first), each
    /// under its own shared lock which is released before the next source
    /// is locked. No two locks are ever held together, so concatenating
    /// collections with each other from several threads, in any order, or
    /// concatenating a collection with itself, cannot deadlock. The price is
    /// that the result is a per-source snapshot, not one atomic snapshot of
    /// all sources.
    pub fn concat(&self, others: &[&Collection<V>]) -> Collection<V> {
        let mut merged = self.read().clone();
        others.iter().for_each(|other| {
            merged.extend(other.read().iter().map(|(key, value)| (key.clone(), value.clone())));
        });
        Collection::with_parts(self.label.clone(), merged)
    }
}

impl<V: Clone + Default> Collection<V> {
    /// Value stored under `key`, or `V::default()` when absent.
    ///
    /// A stored default is indistinguishable from a missing key here; use
    /// `contains` or `try_get` when existence matters.
    pub fn get(&self, key: &str) -> V {
        self.try_get(key).unwrap_or_default()
    }
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<V: Clone> Clone for Collection<V> {
    fn clone(&self) -> Self {
        Collection::with_parts(self.label.clone(), self.read().clone())
    }
}

impl<V: fmt::Debug> fmt::Debug for Collection<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("label", &self.label)
            .field("data", &*self.read())
            .finish()
    }
}

impl<V> From<HashMap<String, V>> for Collection<V> {
    fn from(data: HashMap<String, V>) -> Self {
        Collection::with_parts(DEFAULT_LABEL.to_string(), data)
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Collection<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect::<HashMap<_, _>>()
            .into()
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for Collection<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.write().extend(iter.into_iter().map(|(key, value)| (key.into(), value)));
    }
}
