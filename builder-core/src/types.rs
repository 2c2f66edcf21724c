//! Domain types shared by the cleaner and its hosts.
//!
//! Namespaces are owned by the cluster control plane; this crate only models
//! the read-only snapshots handed to the cleaner.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix carried by every tenant repository directory under the git home.
pub const DOT_GIT_SUFFIX: &str = ".git";

/// A strongly-typed tenant namespace name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceName(pub String);

impl NamespaceName {
    /// Lowercased form used for every identity comparison.
    pub fn canonical(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for NamespaceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NamespaceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A single namespace as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: NamespaceName,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Namespace {
    pub fn new(name: impl Into<NamespaceName>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Snapshot of the live namespace set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceList {
    #[serde(default)]
    pub items: Vec<Namespace>,
}

impl NamespaceList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &NamespaceName> {
        self.items.iter().map(|ns| &ns.name)
    }
}

impl FromIterator<Namespace> for NamespaceList {
    fn from_iter<I: IntoIterator<Item = Namespace>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_lowercase() {
        assert_eq!(NamespaceName::from("MyApp").canonical(), "myapp");
    }

    #[test]
    fn namespace_list_yaml_labels_are_optional() {
        let yaml = "items:\n  - name: foo\n  - name: bar\n    labels:\n      team: web\n";
        let list: NamespaceList = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(list.len(), 2);
        assert!(list.items[0].labels.is_empty());
        assert_eq!(list.items[1].labels.get("team").map(String::as_str), Some("web"));
    }
}
