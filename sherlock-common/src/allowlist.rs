//! Allow-list of Druid brokers permitted for use

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Immutable set of permitted brokers, each stored as a `"host:port"` string.
///
/// Built once from configuration at process start and passed to whoever
/// needs it. Membership is exact string match: no wildcards, no prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerAllowList {
    brokers: HashSet<String>,
}

impl BrokerAllowList {
    pub fn new<I, S>(brokers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        brokers.into_iter().collect()
    }

    /// Lookup key for a broker
    pub fn key(host: &str, port: i32) -> String {
        format!("{}:{}", host, port)
    }

    pub fn len(&self) -> usize {
        self.brokers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brokers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.brokers.iter().map(String::as_str)
    }

    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.brokers.contains(key)
    }
}

impl<S: Into<String>> FromIterator<S> for BrokerAllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            brokers: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_allow_list() -> BrokerAllowList {
        BrokerAllowList::new([
            "bkr123.p1.abc.com:4443",
            "broker1.cluster2.com:4080",
            "localhost:1234",
        ])
    }

    #[test]
    fn test_key_format() {
        assert_eq!(BrokerAllowList::key("localhost", 1234), "localhost:1234");
    }

    #[test]
    fn test_exact_membership() {
        let allowed = test_allow_list();
        assert_eq!(allowed.len(), 3);
        assert!(allowed.contains_key("bkr123.p1.abc.com:4443"));
        assert!(allowed.contains_key("localhost:1234"));
        assert!(!allowed.contains_key("bkr123.p2.abc.com:4443"));
        assert!(!allowed.contains_key("localhost:12345"));
        assert!(!allowed.contains_key("localhost"));
        assert!(!allowed.contains_key("LOCALHOST:1234"));
    }

    #[test]
    fn test_empty_allow_list_permits_nothing() {
        let allowed = BrokerAllowList::default();
        assert!(allowed.is_empty());
        assert!(!allowed.contains_key("localhost:1234"));
    }

    #[test]
    fn test_duplicates_collapse() {
        let allowed = BrokerAllowList::new(["a:1", "a:1", "b:2"]);
        assert_eq!(allowed.len(), 2);
        let mut entries: Vec<&str> = allowed.iter().collect();
        entries.sort();
        assert_eq!(entries, vec!["a:1", "b:2"]);
    }

    #[test]
    fn test_deserializes_from_list() {
        let allowed: BrokerAllowList =
            serde_json::from_str(r#"["localhost:1234", "broker1.cluster2.com:4080"]"#).unwrap();
        assert!(allowed.contains_key("broker1.cluster2.com:4080"));
    }
}
