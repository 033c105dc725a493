//! XSD Element declarations
//!
//! An element declaration binds a name to a type and carries the occurrence
//! bounds it has inside a sequence. The namespace of a declaration is always
//! the namespace of the schema it belongs to.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cElement_Declarations

use std::fmt;

use crate::names::split_qname;

use super::builtins::PrimitiveKind;
use super::complex_types::ComplexType;
use super::particles::{Occurs, Particle};
use super::simple_types::SimpleType;

// =============================================================================
// Type references
// =============================================================================

/// The type of an element: inline simple, inline complex, or named
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Inline simple type
    Simple(SimpleType),
    /// Inline (anonymous or copied) complex type
    Complex(Box<ComplexType>),
    /// Reference to a type registered in the schema's type table
    Named(String),
}

impl TypeRef {
    /// Create a reference to a named type
    ///
    /// A prefix such as `tns:` is ignored; names always resolve in the
    /// schema's own namespace.
    pub fn named(name: &str) -> Self {
        let (_, local) = split_qname(name);
        TypeRef::Named(local.to_string())
    }

    /// The referenced type name, for named references
    pub fn as_named(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        TypeRef::Simple(SimpleType::builtin(kind))
    }
}

impl From<SimpleType> for TypeRef {
    fn from(simple: SimpleType) -> Self {
        TypeRef::Simple(simple)
    }
}

impl From<ComplexType> for TypeRef {
    fn from(complex: ComplexType) -> Self {
        TypeRef::Complex(Box::new(complex))
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::named(name)
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::named(&name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Simple(simple) => match simple.name() {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "xs:{}", simple.kind()),
            },
            TypeRef::Complex(complex) => match complex.name() {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "(anonymous complexType)"),
            },
            TypeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

// =============================================================================
// Element declarations
// =============================================================================

/// XSD Element declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Local name of the element
    name: String,
    /// Element type
    type_ref: TypeRef,
    /// Occurrence bounds when used as a sequence particle
    occurs: Occurs,
}

impl ElementDecl {
    /// Declare an element that occurs exactly once
    pub fn new(name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            occurs: Occurs::once(),
        }
    }

    /// minOccurs="0"
    pub fn optional(self) -> Self {
        self.min_occurs(0)
    }

    /// maxOccurs="unbounded"
    pub fn array(self) -> Self {
        self.unbounded()
    }

    /// Set minOccurs
    pub fn min_occurs(mut self, min: u32) -> Self {
        self.occurs.min = min;
        self
    }

    /// Set a bounded maxOccurs
    pub fn max_occurs(mut self, max: u32) -> Self {
        self.occurs.max = Some(max);
        self
    }

    /// Set maxOccurs to unbounded
    pub fn unbounded(mut self) -> Self {
        self.occurs.max = None;
        self
    }

    /// Element local name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }
}

impl Particle for ElementDecl {
    fn occurs(&self) -> Occurs {
        self.occurs
    }
}
