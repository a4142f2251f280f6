//! Namespace bookkeeping for event consumers.

use std::collections::BTreeSet;

/// The namespaces Kubernetes itself owns.
pub const KUBE_NAMESPACES: [&str; 2] = ["kube-system", "kube-public"];

/// An immutable set of namespaces whose objects should be ignored.
///
/// Built once at startup from the kube-owned namespaces plus any
/// deployment-specific extras, then shared freely; there is no mutation after
/// construction, so concurrent readers need no synchronization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespaceFilter {
    ignored: BTreeSet<String>,
}

impl NamespaceFilter {
    /// Build a filter over the kube-owned namespaces and `extra` ones.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ignored: BTreeSet<String> =
            KUBE_NAMESPACES.iter().map(|&ns| ns.to_owned()).collect();
        ignored.extend(extra.into_iter().map(Into::into));
        Self { ignored }
    }

    /// Whether objects in `namespace` should be ignored.
    pub fn is_ignored(&self, namespace: &str) -> bool {
        self.ignored.contains(namespace)
    }

    /// Whether `namespace` is one of the namespaces Kubernetes itself owns.
    pub fn is_kube_namespace(namespace: &str) -> bool {
        KUBE_NAMESPACES.contains(&namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kube_namespaces_are_always_ignored() {
        let filter = NamespaceFilter::new(Vec::<String>::new());
        assert!(filter.is_ignored("kube-system"));
        assert!(filter.is_ignored("kube-public"));
        assert!(!filter.is_ignored("default"));
    }

    #[test]
    fn extra_namespaces_extend_the_filter() {
        let filter = NamespaceFilter::new(["operator-system"]);
        assert!(filter.is_ignored("operator-system"));
        assert!(filter.is_ignored("kube-system"));
        assert!(!filter.is_ignored("production"));
    }

    #[test]
    fn kube_namespace_check_ignores_extras() {
        assert!(NamespaceFilter::is_kube_namespace("kube-system"));
        assert!(!NamespaceFilter::is_kube_namespace("operator-system"));
    }
}
