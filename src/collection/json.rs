//! JSON encoding as an array of `[key, value]` pairs.
//!
//! ```text
//! [["a", 1], ["b", 2]]
//! ```
//!
//! Pair order follows iteration order and is therefore unspecified. An empty
//! collection encodes as `[]`. On decode, a key that appears twice keeps the
//! later value.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{DeserializeOwned, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Collection;
use crate::error::{CollectionError, CollectionResult};

// Upper bound on a pre-allocation requested by untrusted input.
const MAX_PREALLOCATED_PAIRS: usize = 4096;

impl<V: Serialize> Serialize for Collection<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = self.read();
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        data.iter().try_for_each(|pair| seq.serialize_element(&pair))?;
        seq.end()
    }
}

struct PairsVisitor<V> {
    marker: PhantomData<V>,
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for PairsVisitor<V> {
    type Value = Collection<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an array of [key, value] pairs")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let capacity = seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATED_PAIRS);
        let mut data = HashMap::with_capacity(capacity);
        while let Some((key, value)) = seq.next_element::<(String, V)>()? {
            data.insert(key, value);
        }
        Ok(data.into())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Collection<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PairsVisitor { marker: PhantomData })
    }
}

impl<V: Serialize> Collection<V> {
    /// Encodes the collection as JSON bytes. Fails if any value cannot be
    /// encoded; the collection is left untouched either way.
    pub fn to_json(&self) -> CollectionResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CollectionError::serialization(format!("{}: {}", self.label(), e)))
    }

    pub fn to_json_string(&self) -> CollectionResult<String> {
        serde_json::to_string(self).map_err(|e| CollectionError::serialization(format!("{}: {}", self.label(), e)))
    }
}

impl<V: DeserializeOwned> Collection<V> {
    /// Decodes bytes produced by [`Collection::to_json`] into a new collection.
    pub fn from_json(bytes: &[u8]) -> CollectionResult<Collection<V>> {
        serde_json::from_slice(bytes).map_err(CollectionError::from)
    }

    pub fn from_json_str(json: &str) -> CollectionResult<Collection<V>> {
        serde_json::from_str(json).map_err(CollectionError::from)
    }
}

#[cfg(test)]
mod tests {
    use serde::ser::Error;
    use serde_json::{json, Value};

    use super::*;
    use crate::utils::{abc, sorted_pairs};

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("value refuses to be encoded"))
        }
    }

    #[test]
    fn encodes_as_array_of_pairs() {
        let collection: Collection<i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let encoded: Value = serde_json::from_slice(&collection.to_json().expect("encodable")).expect("valid json");

        let mut pairs = encoded.as_array().expect("array").clone();
        pairs.sort_by_key(|pair| pair[0].as_str().map(str::to_string));
        assert_eq!(Value::Array(pairs), json!([["a", 1], ["b", 2]]));
    }

    #[test]
    fn empty_collection_encodes_as_empty_array() {
        let collection: Collection<i32> = Collection::new(0);

        assert_eq!(collection.to_json_string(), Ok("[]".to_string()));
    }

    #[test]
    fn round_trips_through_json() {
        let original = abc();
        let decoded: Collection<i32> = Collection::from_json(&original.to_json().expect("encodable")).expect("decodable");

        assert_eq!(sorted_pairs(decoded.into_inner()), sorted_pairs(original.into_inner()));
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let decoded: Collection<i32> = Collection::from_json_str(r#"[["a", 1], ["a", 5]]"#).expect("decodable");

        assert_eq!(decoded.size(), 1);
        assert_eq!(decoded.get("a"), 5);
    }

    #[test]
    fn unencodable_value_is_reported() {
        let collection = Collection::new(1);
        collection.set("bad", Unencodable);

        let err = collection.to_json().unwrap_err();
        assert!(matches!(err, CollectionError::Serialization { .. }));
        assert!(err.to_string().contains("refuses"));
        assert_eq!(collection.size(), 1);
    }

    #[test]
    fn decode_errors_keep_the_parser_detail() {
        let input = r#"[["a", "x"]]"#;
        let from_str = Collection::<i32>::from_json_str(input).unwrap_err();
        let from_bytes = Collection::<i32>::from_json(input.as_bytes()).unwrap_err();

        assert_eq!(from_str, from_bytes);
        let message = from_str.to_string();
        assert!(message.contains("expected i32"), "{message}");
        assert!(message.contains("line 1 column"), "{message}");
    }

    #[test]
    fn rejects_object_shaped_input() {
        let err = Collection::<i32>::from_json(br#"{"a": 1}"#).unwrap_err();
        assert!(matches!(err, CollectionError::Deserialization { .. }));

        let err = Collection::<i32>::from_json_str(r#"[["a"]]"#).unwrap_err();
        assert!(matches!(err, CollectionError::Deserialization { .. }));
    }
}
