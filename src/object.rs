//! Read-only view over an extracted Kubernetes object.

use chrono::{DateTime, FixedOffset};

use crate::{extract_metadata, Error, Metadata, Result};

/// A parsed Kubernetes object with a structured creation timestamp.
///
/// Thin wrapper over [`Metadata`] for consumers that only read: construction
/// runs the extractor once and converts `metadata.creationTimestamp` into a
/// [`DateTime`], failing with [`Error::MalformedTimestamp`] when the field is
/// missing or not RFC 3339.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedObject {
    metadata: Metadata,
    creation_timestamp: DateTime<FixedOffset>,
}

impl ParsedObject {
    /// Parse the JSON bytes of one Kubernetes object.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let metadata = extract_metadata(input)?;
        let creation_timestamp = DateTime::parse_from_rfc3339(&metadata.creation_timestamp)
            .map_err(Error::MalformedTimestamp)?;
        Ok(Self {
            metadata,
            creation_timestamp,
        })
    }

    /// The object `kind`.
    pub fn kind(&self) -> &str {
        &self.metadata.kind
    }

    /// The object `apiVersion`.
    pub fn api_version(&self) -> &str {
        &self.metadata.api_version
    }

    /// All labels of the object.
    pub fn labels(&self) -> &std::collections::BTreeMap<String, String> {
        &self.metadata.labels
    }

    /// A single label value, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }

    /// All annotations of the object.
    pub fn annotations(&self) -> &std::collections::BTreeMap<String, String> {
        &self.metadata.annotations
    }

    /// A single annotation value, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    /// The creation timestamp, parsed from RFC 3339.
    pub fn creation_timestamp(&self) -> DateTime<FixedOffset> {
        self.creation_timestamp
    }

    /// The `metadata.resourceVersion` string.
    pub fn resource_version(&self) -> &str {
        &self.metadata.resource_version
    }

    /// `kind` of the owner reference, empty when the object has no owner.
    pub fn owner_kind(&self) -> &str {
        self.owner_field("kind")
    }

    /// `name` of the owner reference, empty when the object has no owner.
    pub fn owner_name(&self) -> &str {
        self.owner_field("name")
    }

    /// Pod/endpoint selector labels recovered from a network policy.
    pub fn pod_selector_match_labels(&self) -> &std::collections::BTreeMap<String, String> {
        &self.metadata.network_policy_pod_selector_match_labels
    }

    /// The full extracted record, for consumers that outgrow the accessors.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn owner_field(&self, field: &str) -> &str {
        self.metadata
            .owner_references
            .get(field)
            .map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_input() {
        let input = br#"{
            "metadata": {
                "annotations": {"kubescape.io/status": "active"},
                "labels": {"kubescape.io/workload-name": "example"},
                "ownerReferences": [{"name": "ownerName", "kind": "ownerKind"}],
                "creationTimestamp": "2023-03-15T08:00:00Z",
                "resourceVersion": "12345"
            }
        }"#;
        let object = ParsedObject::parse(input).unwrap();
        assert_eq!(object.resource_version(), "12345");
        assert_eq!(object.label("kubescape.io/workload-name"), Some("example"));
        assert_eq!(object.label("missing"), None);
        assert_eq!(object.annotation("kubescape.io/status"), Some("active"));
        assert_eq!(object.owner_name(), "ownerName");
        assert_eq!(object.owner_kind(), "ownerKind");
        assert_eq!(
            object.creation_timestamp(),
            DateTime::parse_from_rfc3339("2023-03-15T08:00:00Z").unwrap()
        );
    }

    #[test]
    fn invalid_json_input() {
        assert!(matches!(
            ParsedObject::parse(b"invalid json"),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn invalid_date_format() {
        let input = br#"{"metadata": {"creationTimestamp": "invalid-date-format"}}"#;
        assert!(matches!(
            ParsedObject::parse(input),
            Err(Error::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn missing_timestamp_is_an_error() {
        assert!(matches!(
            ParsedObject::parse(b"{}"),
            Err(Error::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn ownerless_object_has_empty_owner_fields() {
        let input = br#"{"metadata": {"creationTimestamp": "2023-03-15T08:00:00Z"}}"#;
        let object = ParsedObject::parse(input).unwrap();
        assert_eq!(object.owner_kind(), "");
        assert_eq!(object.owner_name(), "");
    }
}
