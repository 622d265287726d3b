//! Term-to-facts cache persisted wholesale as one JSON blob.

use std::collections::HashMap;

use crate::state::Fact;

/// In-memory search cache: a term index plus a fact store.
///
/// The two maps stay consistent by construction — [`LocalData::merge`] is
/// the only write path and it populates both together. Entries are never
/// evicted during a session; a repeat identifier overwrites with the
/// latest payload.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocalData {
    /// Normalized (lower-cased) search term to fact ids, in the relevance
    /// order the remote response listed them.
    pub terms: HashMap<String, Vec<String>>,
    /// Fact id to full payload.
    pub facts: HashMap<String, Fact>,
}

impl LocalData {
    /// What: Resolve a normalized term against the cache.
    ///
    /// Inputs:
    /// - `normalized`: Lower-cased comparison key
    ///
    /// Output:
    /// - `Some(facts)` in stored id order on a hit; `None` on a miss.
    #[must_use]
    pub fn resolve(&self, normalized: &str) -> Option<Vec<Fact>> {
        let ids = self.terms.get(normalized)?;
        Some(
            ids.iter()
                .filter_map(|id| self.facts.get(id))
                .cloned()
                .collect(),
        )
    }

    /// What: Upsert a resolved term and its facts in one step.
    ///
    /// Inputs:
    /// - `normalized`: Lower-cased comparison key
    /// - `facts`: Remote results in relevance order
    ///
    /// Output:
    /// - Replaces the id list for `normalized` and upserts every fact by
    ///   id, later payload winning. Every id written to `terms` has a
    ///   `facts` entry afterwards.
    pub fn merge(&mut self, normalized: &str, facts: &[Fact]) {
        self.terms.insert(
            normalized.to_string(),
            facts.iter().map(|f| f.id.clone()).collect(),
        );
        for fact in facts {
            self.facts.insert(fact.id.clone(), fact.clone());
        }
    }

    /// Serialize the whole cache to the persisted blob format.
    ///
    /// Returns `None` (logged) if serialization fails; the caller skips the
    /// write rather than persisting a torn blob.
    #[must_use]
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match serde_json::to_vec(self) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "[Cache] Failed to serialize cache blob");
                None
            }
        }
    }

    /// Decode a persisted blob; `None` for malformed data.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match serde_json::from_slice(bytes) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(error = %e, "[Cache] Ignoring undecodable cache blob");
                None
            }
        }
    }

    /// True when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(id: &str, value: &str) -> Fact {
        Fact {
            icon_url: String::new(),
            id: id.into(),
            url: String::new(),
            value: value.into(),
            categories: Vec::new(),
        }
    }

    #[test]
    /// What: Merge keeps the term index and fact store consistent
    ///
    /// - Input: Three facts merged under one term
    /// - Output: Every id listed in `terms` has a `facts` entry; order preserved
    fn merge_populates_both_maps_in_order() {
        let mut data = LocalData::default();
        let facts = vec![fact("0", "a"), fact("1", "b"), fact("2", "c")];
        data.merge("s", &facts);

        assert_eq!(
            data.terms.get("s"),
            Some(&vec!["0".to_string(), "1".to_string(), "2".to_string()])
        );
        for id in data.terms.get("s").expect("term entry") {
            assert!(data.facts.contains_key(id));
        }
        assert_eq!(data.resolve("s"), Some(facts));
    }

    #[test]
    /// What: Repeated merges union facts by id, later payload winning
    ///
    /// - Input: Two merges sharing id "1" with different values
    /// - Output: Union of ids; "1" carries the second payload
    fn merge_is_idempotent_union_with_last_write_wins() {
        let mut data = LocalData::default();
        data.merge("a", &[fact("0", "first"), fact("1", "first")]);
        data.merge("b", &[fact("1", "second"), fact("2", "second")]);

        assert_eq!(data.facts.len(), 3);
        assert_eq!(
            data.facts.get("1").map(|f| f.value.clone()),
            Some("second".to_string())
        );
        // The earlier term still resolves, now against the updated payload.
        let resolved = data.resolve("a").expect("term a");
        assert_eq!(resolved[1].value, "second");
    }

    #[test]
    /// What: Resolving an unknown term misses without touching state
    ///
    /// - Input: Cache with one term, lookup of another
    /// - Output: `None`
    fn resolve_misses_unknown_terms() {
        let mut data = LocalData::default();
        data.merge("s", &[fact("0", "a")]);
        assert_eq!(data.resolve("t"), None);
    }

    #[test]
    /// What: Blob round-trip reproduces an equal structure
    ///
    /// - Input: Cache with 2 terms and 3 facts
    /// - Output: Decoded copy equals the original
    fn blob_round_trip() {
        let mut data = LocalData::default();
        data.merge("s", &[fact("0", "a"), fact("1", "b")]);
        data.merge("dev", &[fact("2", "c")]);

        let bytes = data.to_bytes().expect("serialize");
        let back = LocalData::from_bytes(&bytes).expect("deserialize");
        assert_eq!(back, data);
    }

    #[test]
    /// What: Malformed blobs decode to None instead of erroring
    ///
    /// - Input: Garbage bytes
    /// - Output: `None`
    fn malformed_blob_is_ignored() {
        assert_eq!(LocalData::from_bytes(b"not json"), None);
    }
}
