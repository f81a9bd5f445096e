//! Namespace scope of an invocation.

use std::fmt;

/// Where collateral and candidates are listed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    /// A single namespace.
    Namespace(String),
    /// Every namespace. The system namespace is still filtered out of the
    /// candidates by [`CandidateLister`](super::candidates::CandidateLister).
    All,
}

impl NamespaceScope {
    /// The namespace to list from, or `None` for a cluster-wide list.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            NamespaceScope::Namespace(ns) => Some(ns),
            NamespaceScope::All => None,
        }
    }
}

impl fmt::Display for NamespaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceScope::Namespace(ns) => write!(f, "namespace/{ns}"),
            NamespaceScope::All => f.write_str("all namespaces"),
        }
    }
}
