//! XML namespace handling
//!
//! This module provides the schema-level [`Namespace`] (a URI with a preferred
//! prefix), qualified names, and the prefix table used when an element tree is
//! rendered back into text.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// A target namespace together with the prefix it is rendered with
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Namespace {
    uri: String,
    prefix: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            prefix: prefix.into(),
        }
    }

    /// The namespace URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The preferred prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Qualify a local name with this namespace
    pub fn qname(&self, local_name: impl Into<String>) -> QName {
        QName::namespaced(self.uri.clone(), local_name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.prefix, self.uri)
    }
}

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Check whether this name is `local_name` in `namespace`
    pub fn matches(&self, namespace: &Namespace, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace.uri())
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Prefix allocation for rendering
///
/// Every namespace URI gets exactly one prefix. The preferred prefix is used
/// when it is still free, otherwise a generated `nsN` prefix is assigned.
#[derive(Debug, Clone, Default)]
pub struct PrefixMap {
    /// Mapping from namespace URI to prefix, in declaration order
    prefixes: IndexMap<String, String>,
}

impl PrefixMap {
    /// Create an empty prefix map
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a namespace, returning the prefix it is bound to
    pub fn declare(&mut self, uri: &str, preferred: Option<&str>) -> &str {
        if !self.prefixes.contains_key(uri) {
            let prefix = match preferred {
                Some(p) if !p.is_empty() && !self.is_bound(p) && !p.starts_with("xml") => {
                    p.to_string()
                }
                _ => self.generate(),
            };
            self.prefixes.insert(uri.to_string(), prefix);
        }
        &self.prefixes[uri]
    }

    /// Get the prefix bound to a namespace URI
    pub fn prefix_of(&self, uri: &str) -> Option<&str> {
        self.prefixes.get(uri).map(|s| s.as_str())
    }

    /// Iterate over `(uri, prefix)` bindings in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Number of declared namespaces
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Whether no namespace has been declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    fn is_bound(&self, prefix: &str) -> bool {
        self.prefixes.values().any(|p| p == prefix)
    }

    fn generate(&self) -> String {
        let mut n = self.prefixes.len();
        loop {
            let candidate = format!("ns{}", n);
            if !self.is_bound(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
