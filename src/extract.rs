//! Metadata extraction from the JSON bytes of a Kubernetes object.
//!
//! [`extract_metadata`] scans the input exactly once with the
//! [`walk`](crate::walk::walk) walker and routes every `(path, key, value)` event
//! through a fixed dispatch table into a [`Metadata`] accumulator. Extraction
//! is best-effort: missing fields, wrong-typed scalars and unrecognized kinds
//! leave their target fields at the zero value instead of failing the
//! document. Only structurally invalid JSON produces an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::selector::{parse_calico_selector, strip_label_source};
use crate::walk::{walk, Event, Node};
use crate::Result;

/// Label maps are kept sorted, mirroring apimachinery's string maps.
type Map = BTreeMap<String, String>;

const CILIUM_API_VERSION: &str = "cilium.io/v2";
const K8S_NETPOL_API_VERSION: &str = "networking.k8s.io/v1";
const ISTIO_API_VERSION: &str = "security.istio.io/v1";
const CALICO_API_VERSION: &str = "projectcalico.org/v3";

/// Everything one extraction pass can recover from a Kubernetes object.
///
/// All fields start at a zero value and are only ever written forward during
/// the scan; the maps are always initialized (possibly empty), so callers
/// never need to branch on their presence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Top-level `kind`; also steers the Service selector rule.
    pub kind: String,
    /// Top-level `apiVersion`; also selects the network-policy dialect.
    pub api_version: String,
    /// Verbatim `metadata.namespace`.
    pub namespace: String,
    /// Verbatim `metadata.creationTimestamp`, not parsed here.
    pub creation_timestamp: String,
    /// Verbatim `metadata.resourceVersion`.
    pub resource_version: String,
    /// Copy of `metadata.annotations`.
    pub annotations: Map,
    /// Copy of `metadata.labels`.
    pub labels: Map,
    /// Flattened fields of the last owner reference seen.
    ///
    /// The source walks the whole `metadata.ownerReferences` array but keys
    /// by field name, so a later owner overwrites the fields of an earlier
    /// one.
    pub owner_references: Map,
    /// Labels of a nested pod template (`spec.template.metadata.labels` or
    /// `spec.jobTemplate.spec.template.metadata.labels`).
    pub pod_spec_labels: Map,
    /// Pod/endpoint selector labels of a network policy, populated by the
    /// dialect selected through `apiVersion`.
    pub network_policy_pod_selector_match_labels: Map,
    /// `Some(true)` once any ingress rule evidence was seen; `None` means no
    /// ingress rule was observed. Never reset once set.
    pub has_ingress_rules: Option<bool>,
    /// `Some(true)` once any egress rule evidence was seen; `None` means no
    /// egress rule was observed. Never reset once set.
    pub has_egress_rules: Option<bool>,
    /// `spec.selector` labels, populated only when `kind` is `Service`.
    pub service_pod_selector_match_labels: Map,
    /// Role-binding subjects, in document order.
    pub subjects: Vec<Subject>,
    /// Role-binding role reference, allocated on its first field.
    pub role_ref: Option<RoleRef>,
}

/// One subject of a role binding.
///
/// Partially filled subjects are possible and valid; every field is optional
/// on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// API group of the subject.
    pub api_group: String,
    /// Kind of the subject (`User`, `Group`, `ServiceAccount`).
    pub kind: String,
    /// Name of the subject.
    pub name: String,
    /// Namespace of the subject, where applicable.
    pub namespace: String,
}

/// The role referenced by a role binding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    /// API group of the referenced role.
    pub api_group: String,
    /// Kind of the referenced role (`Role` or `ClusterRole`).
    pub kind: String,
    /// Name of the referenced role.
    pub name: String,
}

/// Extract metadata from the JSON bytes of one Kubernetes object.
///
/// The accumulator is owned exclusively by this call, mutated only from the
/// walk visitor, and handed back by value; extracting the same bytes twice
/// yields equal records.
///
/// Dialect- and kind-gated rules depend on `kind`/`apiVersion` having been
/// seen earlier in the same document. Kubernetes emitters put both before
/// `spec`, so this holds in practice; a producer that emits them out of order
/// loses the gated fields silently. This is a documented contract of the
/// format, not something the extractor second-guesses.
pub fn extract_metadata(input: &[u8]) -> Result<Metadata> {
    let mut extractor = Extractor::default();
    walk(input, |ev| extractor.dispatch(ev))?;
    let metadata = extractor.metadata;
    tracing::trace!(
        kind = %metadata.kind,
        api_version = %metadata.api_version,
        "extracted object metadata"
    );
    Ok(metadata)
}

/// The walk visitor: the accumulator plus what little parsing state the
/// dispatch rules need (the open role-binding subject is simply the last
/// element of `metadata.subjects`).
#[derive(Default)]
struct Extractor {
    metadata: Metadata,
}

impl Extractor {
    fn dispatch(&mut self, ev: &Event<'_>) -> bool {
        // a new object under subjects opens the next subject
        if ev.node == Node::ObjectBegin && ev.path.starts_with("subjects.") {
            self.metadata.subjects.push(Subject::default());
        }
        self.note_policy_rule_presence(ev.path);
        if let Some(value) = ev.node.as_scalar() {
            self.scalar(ev, value);
        }
        true
    }

    fn scalar(&mut self, ev: &Event<'_>, value: &str) {
        self.policy_selector(ev, value);
        match ev.path {
            "kind" => self.metadata.kind = value.to_owned(),
            "apiVersion" => self.metadata.api_version = value.to_owned(),
            "metadata.namespace" => self.metadata.namespace = value.to_owned(),
            "metadata.creationTimestamp" => self.metadata.creation_timestamp = value.to_owned(),
            "metadata.resourceVersion" => self.metadata.resource_version = value.to_owned(),
            _ => self.keyed(ev, value),
        }
    }

    /// Rules that copy the trailing path component as a map key or assemble
    /// the role-binding fields. Mutually exclusive by path prefix.
    fn keyed(&mut self, ev: &Event<'_>, value: &str) {
        let (key, path) = (ev.key, ev.path);
        if path.starts_with("metadata.annotations.") {
            self.metadata
                .annotations
                .insert(key.to_owned(), value.to_owned());
        } else if path.starts_with("metadata.labels.") {
            self.metadata.labels.insert(key.to_owned(), value.to_owned());
        } else if path.starts_with("metadata.ownerReferences..") {
            self.metadata
                .owner_references
                .insert(key.to_owned(), value.to_owned());
        } else if is_pod_template_label(path) {
            self.metadata
                .pod_spec_labels
                .insert(key.to_owned(), value.to_owned());
        } else if path.starts_with("subjects.") {
            self.subject_field(key, value);
        } else if path.starts_with("roleRef.") {
            self.role_ref_field(key, value);
        } else if self.metadata.kind == "Service" && path.starts_with("spec.selector.") {
            self.metadata
                .service_pod_selector_match_labels
                .insert(key.to_owned(), value.to_owned());
        }
    }

    fn subject_field(&mut self, key: &str, value: &str) {
        let Some(subject) = self.metadata.subjects.last_mut() else {
            return;
        };
        match key {
            "apiGroup" => subject.api_group = value.to_owned(),
            "kind" => subject.kind = value.to_owned(),
            "name" => subject.name = value.to_owned(),
            "namespace" => subject.namespace = value.to_owned(),
            _ => {}
        }
    }

    fn role_ref_field(&mut self, key: &str, value: &str) {
        // allocated lazily, on the first recognized field only
        if !matches!(key, "apiGroup" | "kind" | "name") {
            return;
        }
        let role_ref = self.metadata.role_ref.get_or_insert_with(RoleRef::default);
        match key {
            "apiGroup" => role_ref.api_group = value.to_owned(),
            "kind" => role_ref.kind = value.to_owned(),
            "name" => role_ref.name = value.to_owned(),
            _ => {}
        }
    }

    /// Selector and policy-type rules of the dialect selected by the
    /// already-observed `apiVersion`.
    fn policy_selector(&mut self, ev: &Event<'_>, value: &str) {
        let selector = &mut self.metadata.network_policy_pod_selector_match_labels;
        match self.metadata.api_version.as_str() {
            CILIUM_API_VERSION => {
                if ev.path.starts_with("spec.endpointSelector.matchLabels.") {
                    selector.insert(ev.key.to_owned(), value.to_owned());
                    // a label source prefix also yields a virtual unprefixed twin
                    if let Some(stripped) = strip_label_source(ev.key) {
                        selector.insert(stripped.to_owned(), value.to_owned());
                    }
                }
            }
            K8S_NETPOL_API_VERSION => {
                if ev.path.starts_with("spec.podSelector.matchLabels.") {
                    selector.insert(ev.key.to_owned(), value.to_owned());
                } else if ev.path == "spec.policyTypes." {
                    self.note_policy_type(value);
                }
            }
            ISTIO_API_VERSION => {
                if ev.path.starts_with("spec.selector.matchLabels.") {
                    selector.insert(ev.key.to_owned(), value.to_owned());
                }
            }
            CALICO_API_VERSION => {
                if ev.path == "spec.selector" {
                    // a single expression string replaces the map wholesale
                    *selector = parse_calico_selector(value);
                } else if ev.path == "spec.types." {
                    self.note_policy_type(value);
                }
            }
            _ => {}
        }
    }

    fn note_policy_type(&mut self, value: &str) {
        match value {
            "Ingress" => self.metadata.has_ingress_rules = Some(true),
            "Egress" => self.metadata.has_egress_rules = Some(true),
            _ => {}
        }
    }

    /// Presence-based ingress/egress detection. Covers Kubernetes policies
    /// that omit `policyTypes` and the Calico/Cilium rule blocks; fires for
    /// any event under the rule paths, containers included.
    fn note_policy_rule_presence(&mut self, path: &str) {
        match self.metadata.api_version.as_str() {
            CILIUM_API_VERSION => {
                // spec.egress / spec.egressDeny / specs..egress / specs..egressDeny
                if path.starts_with("spec.ingress") || path.starts_with("specs..ingress") {
                    self.metadata.has_ingress_rules = Some(true);
                }
                if path.starts_with("spec.egress") || path.starts_with("specs..egress") {
                    self.metadata.has_egress_rules = Some(true);
                }
            }
            K8S_NETPOL_API_VERSION | CALICO_API_VERSION => {
                if path.starts_with("spec.ingress") {
                    self.metadata.has_ingress_rules = Some(true);
                }
                if path.starts_with("spec.egress") {
                    self.metadata.has_egress_rules = Some(true);
                }
            }
            _ => {}
        }
    }
}

fn is_pod_template_label(path: &str) -> bool {
    path.starts_with("spec.template.metadata.labels.")
        || path.starts_with("spec.jobTemplate.spec.template.metadata.labels.")
}
