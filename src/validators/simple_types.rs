//! XSD Simple Type definitions
//!
//! A simple type is an atomic primitive kind, optionally narrowed by a
//! restriction carrying an enumeration. Enumeration members are kept in an
//! explicit ordered member table so callers can refer to them by name, and
//! are matched in value space: `"1"` and `"true"` are the same boolean.
//!
//! See: https://www.w3.org/TR/xmlschema-2/

use crate::error::{Error, Result};
use crate::validators::builtins::{PrimitiveKind, XsdValue};
use indexmap::IndexMap;

// =============================================================================
// Enumeration
// =============================================================================

/// Ordered set of enumeration literals, addressable by member name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enumeration {
    /// Member name -> literal value
    members: IndexMap<String, String>,
    /// Parsed literals, in declaration order
    values: Vec<XsdValue>,
}

impl Enumeration {
    /// Look up the literal of a member by name
    pub fn member(&self, name: &str) -> Option<&str> {
        self.members.get(name).map(|s| s.as_str())
    }

    /// Iterate over the literals in declaration order
    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.members.values().map(|s| s.as_str())
    }

    /// Whether a native value equals one of the literals
    pub fn contains(&self, value: &XsdValue) -> bool {
        self.values.contains(value)
    }

    /// Number of literals
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the enumeration has no literals
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// =============================================================================
// Simple Type
// =============================================================================

/// Atomic simple type, possibly derived by restriction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleType {
    /// Type name, for types registered at the top level of a schema
    name: Option<String>,
    /// Primitive kind (inherited through restrictions)
    kind: PrimitiveKind,
    /// Base type being restricted
    base: Option<Box<SimpleType>>,
    /// Enumeration facet of this restriction step
    enumeration: Option<Enumeration>,
}

impl SimpleType {
    /// Create an unrestricted type of a primitive kind
    pub fn builtin(kind: PrimitiveKind) -> Self {
        Self {
            name: None,
            kind,
            base: None,
            enumeration: None,
        }
    }

    /// Derive a type by restricting `base` to the given enumeration literals
    ///
    /// Every literal must be a valid lexical value of the base type, and no
    /// literal may appear twice.
    pub fn restriction<I, S>(base: impl Into<SimpleType>, literals: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let base = base.into();
        let mut members = IndexMap::new();
        let mut values = Vec::new();

        for literal in literals {
            let literal = literal.into();
            let value = match base.kind.parse(&literal) {
                Ok(value) if base.check_facets(&value) => value,
                _ => {
                    return Err(Error::type_definition(format!(
                        "enumeration literal '{}' is not a valid value of xs:{}",
                        literal, base.kind
                    )))
                }
            };
            if values.contains(&value) {
                return Err(Error::type_definition(format!(
                    "enumeration literal '{}' is declared twice",
                    literal
                )));
            }
            values.push(value);
            members.insert(literal.clone(), literal);
        }

        Ok(Self {
            name: None,
            kind: base.kind,
            base: Some(Box::new(base)),
            enumeration: Some(Enumeration { members, values }),
        })
    }

    /// Give the type a name so it can be registered in a schema
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The type name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The primitive kind
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// The restricted base type, if this type is a restriction
    pub fn base(&self) -> Option<&SimpleType> {
        self.base.as_deref()
    }

    /// The enumeration of this restriction step, if any
    pub fn enumeration(&self) -> Option<&Enumeration> {
        self.enumeration.as_ref()
    }

    /// Look up an enumeration member by name
    ///
    /// The innermost enumeration wins; a step without one exposes its base's members.
    pub fn member(&self, name: &str) -> Option<&str> {
        match (&self.enumeration, &self.base) {
            (Some(enumeration), _) => enumeration.member(name),
            (None, Some(base)) => base.member(name),
            (None, None) => None,
        }
    }

    /// Check a lexical value against the kind and every enumeration in the chain
    pub fn check_lexical(&self, lexical: &str) -> bool {
        match self.kind.parse(lexical) {
            Ok(value) => self.check_facets(&value),
            Err(_) => false,
        }
    }

    /// Check a native value against the kind and every enumeration in the chain
    pub fn check_value(&self, value: &XsdValue) -> bool {
        if !self.kind.accepts(value) {
            return false;
        }
        self.check_facets(&self.kind.coerce(value.clone()))
    }

    fn check_facets(&self, value: &XsdValue) -> bool {
        if let Some(ref enumeration) = self.enumeration {
            if !enumeration.contains(value) {
                return false;
            }
        }
        match self.base {
            Some(ref base) => base.check_facets(value),
            None => true,
        }
    }
}

impl From<PrimitiveKind> for SimpleType {
    fn from(kind: PrimitiveKind) -> Self {
        SimpleType::builtin(kind)
    }
}

// =============================================================================
// Tests
// =============================================================================
