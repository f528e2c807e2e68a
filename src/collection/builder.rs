use std::collections::HashMap;
use std::marker::PhantomData;

use super::{Collection, DEFAULT_LABEL};

pub struct CollectionBuilder<V> {
    capacity: Option<usize>,
    label: Option<String>,
    value: PhantomData<fn() -> V>,
}

impl<V> CollectionBuilder<V> {
    pub fn new() -> CollectionBuilder<V> {
        Self {
            capacity: None,
            label: None,
            value: PhantomData,
        }
    }

    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..self
        }
    }

    /// Name the collection goes by in log output
    pub fn with_label(self, label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..self
        }
    }

    pub fn build(self) -> Collection<V> {
        Collection::with_parts(
            self.label.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            HashMap::with_capacity(self.capacity.unwrap_or(0)),
        )
    }
}

impl<V> Default for CollectionBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let collection: Collection<u8> = CollectionBuilder::default().build();

        assert_eq!(collection.label(), "collection");
        assert!(collection.is_empty());
    }

    #[test]
    fn derived_collections_keep_label() {
        let sessions = Collection::builder().with_capacity(8).with_label("sessions").build();
        sessions.set("s1", 1);
        sessions.set("s2", 2);

        assert_eq!(sessions.filter(|_, v| *v > 1).label(), "sessions");
        assert_eq!(sessions.map(|_, v| v * 2).label(), "sessions");
        assert_eq!(sessions.concat(&[]).label(), "sessions");
    }
}
