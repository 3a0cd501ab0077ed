//! String-backed key types.
//!
//! Node keys are author-chosen strings (`"trigger"`, `"if_1"`), not UUIDs —
//! they have to be stable and readable across edits to a workflow definition.
//! We still want the same compile-time domain separation the UUID ids in
//! [`crate::id`] get, so `NodeKey` uses `domain-key`'s string-keyed variant
//! instead of its UUID one.

pub use domain_key::KeyParseError;
use domain_key::{define_domain, key_type};

define_domain!(NodeKeyDomain, "node");
key_type!(NodeKey, NodeKeyDomain);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_key_from_str() {
        let key = NodeKey::new("trigger");
        assert_eq!(key.as_str(), "trigger");
    }

    #[test]
    fn node_key_equality() {
        assert_eq!(NodeKey::new("a"), NodeKey::new("a"));
        assert_ne!(NodeKey::new("a"), NodeKey::new("b"));
    }

    #[test]
    fn node_key_serde_roundtrip() {
        let key = NodeKey::new("process_batch");
        let json = serde_json::to_string(&key).unwrap();
        let back: NodeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn node_key_usable_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(NodeKey::new("a"), 1);
        assert_eq!(map.get(&NodeKey::new("a")), Some(&1));
    }
}
