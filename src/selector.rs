//! Selector expression handling for the network-policy dialects.

use std::collections::BTreeMap;

type Map = BTreeMap<String, String>;

/// Label-source prefixes a Cilium endpoint selector key may carry.
const CILIUM_LABEL_SOURCES: [&str; 4] = ["any:", "k8s:", "reserved:", "unspec:"];

/// Strip a Cilium label-source prefix from a selector key, if present.
///
/// Returns `None` when the key carries no recognized source prefix.
pub(crate) fn strip_label_source(key: &str) -> Option<&str> {
    CILIUM_LABEL_SOURCES
        .iter()
        .find_map(|source| key.strip_prefix(source))
}

/// Parse a Calico selector expression into its label equality pairs.
///
/// Handles the common conjunction-of-equalities form,
/// `role == 'database' && tier == 'frontend'`: clauses are split on `&&`,
/// each clause on `==`, whitespace is trimmed and exactly one layer of
/// matching single or double quotes is removed from the value side. Clauses
/// in any other shape (`in`, `has()`, negation, parentheses, chained `==`)
/// are silently discarded; an empty expression yields an empty map.
pub fn parse_calico_selector(expression: &str) -> Map {
    let mut selector = Map::new();
    for clause in expression.split("&&") {
        let mut parts = clause.split("==");
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        selector.insert(
            key.trim().to_owned(),
            unwrap_quotes(value.trim()).to_owned(),
        );
    }
    selector
}

/// Remove one layer of matching single or double quotes, nothing more.
fn unwrap_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> Map {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    #[test]
    fn empty_expression() {
        assert_eq!(parse_calico_selector(""), Map::new());
    }

    #[test]
    fn single_clause() {
        assert_eq!(
            parse_calico_selector("role == 'database'"),
            map(&[("role", "database")])
        );
    }

    #[test]
    fn multiple_clauses() {
        assert_eq!(
            parse_calico_selector("role == 'database' && tier == 'frontend'"),
            map(&[("role", "database"), ("tier", "frontend")])
        );
    }

    #[test]
    fn real_world_expression() {
        assert_eq!(
            parse_calico_selector(
                "app.kubernetes.io/instance == 'kubescape' && app.kubernetes.io/name == 'operator' && tier == 'ks-control-plane'"
            ),
            map(&[
                ("app.kubernetes.io/instance", "kubescape"),
                ("app.kubernetes.io/name", "operator"),
                ("tier", "ks-control-plane"),
            ])
        );
    }

    #[test]
    fn double_quotes_and_loose_whitespace() {
        assert_eq!(
            parse_calico_selector("  role ==   \"database\"  "),
            map(&[("role", "database")])
        );
    }

    #[test]
    fn only_one_quote_layer_is_removed() {
        assert_eq!(
            parse_calico_selector("role == ''database''"),
            map(&[("role", "'database'")])
        );
        // mismatched quotes are left alone
        assert_eq!(
            parse_calico_selector("role == 'database\""),
            map(&[("role", "'database\"")])
        );
    }

    #[test]
    fn unquoted_value() {
        assert_eq!(parse_calico_selector("role == database"), map(&[("role", "database")]));
    }

    #[test]
    fn malformed_clauses_are_discarded() {
        // no ==, chained ==, and other grammar forms all drop out
        assert_eq!(parse_calico_selector("has(role)"), Map::new());
        assert_eq!(parse_calico_selector("a == b == c"), Map::new());
        assert_eq!(
            parse_calico_selector("role in {'a','b'} && tier == 'one'"),
            map(&[("tier", "one")])
        );
    }

    #[test]
    fn label_source_stripping() {
        assert_eq!(strip_label_source("any:app"), Some("app"));
        assert_eq!(strip_label_source("k8s:io.kubernetes.pod.namespace"), Some("io.kubernetes.pod.namespace"));
        assert_eq!(strip_label_source("reserved:host"), Some("host"));
        assert_eq!(strip_label_source("unspec:x"), Some("x"));
        assert_eq!(strip_label_source("app"), None);
        assert_eq!(strip_label_source("source:app"), None);
    }
}
