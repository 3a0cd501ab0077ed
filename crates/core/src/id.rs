//! Unique identifiers for Prana entities.
//!
//! Strongly-typed UUID identifiers built on [`domain-key`](https://crates.io/crates/domain-key)'s
//! `Uuid<D>` wrapper. Each identifier is parameterized by a unique domain
//! marker, so `WorkflowId` and `ExecutionId` cannot be mixed up at compile
//! time even though both are 16-byte UUIDs underneath.
//!
//! All ID types are `Copy`, support `v4()`/`nil()`/`parse(&str)`, and
//! serialize as plain UUID strings.

use domain_key::define_uuid;

pub use domain_key::UuidParseError;

define_uuid!(WorkflowIdDomain => WorkflowId);
define_uuid!(ExecutionIdDomain => ExecutionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_id_v4_is_not_nil() {
        assert!(!WorkflowId::v4().is_nil());
    }

    #[test]
    fn execution_id_nil_roundtrips() {
        let id = ExecutionId::nil();
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn execution_id_parse_roundtrip() {
        let id = ExecutionId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn execution_id_parse_invalid() {
        assert!(ExecutionId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn ids_of_different_domains_are_distinct_types() {
        fn accepts_workflow(_id: WorkflowId) {}
        fn accepts_execution(_id: ExecutionId) {}
        accepts_workflow(WorkflowId::v4());
        accepts_execution(ExecutionId::v4());
        // accepts_workflow(ExecutionId::v4()); // would not compile
    }

    #[test]
    fn serde_roundtrip() {
        let id = WorkflowId::v4();
        let json = serde_json::to_string(&id).unwrap();
        let back: WorkflowId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
