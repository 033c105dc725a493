//! XSD vocabulary
//!
//! Short constructor functions named after the XML Schema elements they
//! stand for, so that a schema reads close to its `.xsd` form:
//!
//! ```rust,ignore
//! use xsdecl::xs;
//!
//! let schema = xs::schema(Namespace::new("http://boo", "boo"))
//!     .declare(xs::element("AddRequest", xs::cts([
//!         xs::element("x", xs::STRING),
//!         xs::element("y", xs::INT),
//!     ])))
//!     .declare(xs::element("AddResponse", xs::INT))
//!     .build()?;
//! ```

use crate::error::Result;
use crate::namespaces::Namespace;
use crate::validators::{
    Attribute, ComplexType, ElementDecl, PrimitiveKind, SchemaBuilder, SequenceParticle,
    SimpleType, TypeRef, Wildcard,
};

/// xs:string
pub const STRING: PrimitiveKind = PrimitiveKind::String;
/// xs:int
pub const INT: PrimitiveKind = PrimitiveKind::Int;
/// xs:boolean
pub const BOOLEAN: PrimitiveKind = PrimitiveKind::Boolean;
/// xs:hexBinary
pub const HEX_BINARY: PrimitiveKind = PrimitiveKind::HexBinary;
/// xs:base64Binary
pub const BASE64_BINARY: PrimitiveKind = PrimitiveKind::Base64Binary;

/// `<xs:schema targetNamespace=...>`
pub fn schema(namespace: Namespace) -> SchemaBuilder {
    SchemaBuilder::new(namespace)
}

/// `<xs:element name=... type=...>`
///
/// The type is a primitive kind, an inline simple or complex type, or the
/// name of a type declared in the schema.
pub fn element(name: &str, type_ref: impl Into<TypeRef>) -> ElementDecl {
    ElementDecl::new(name, type_ref)
}

/// An element with `minOccurs="0"`
pub fn optional(name: &str, type_ref: impl Into<TypeRef>) -> ElementDecl {
    element(name, type_ref).optional()
}

/// An element with `maxOccurs="unbounded"`
pub fn array(name: &str, type_ref: impl Into<TypeRef>) -> ElementDecl {
    element(name, type_ref).array()
}

/// `<xs:complexType><xs:sequence>...`
pub fn sequence<I>(particles: I) -> ComplexType
where
    I: IntoIterator<Item = SequenceParticle>,
{
    ComplexType::sequence(particles)
}

/// `<xs:complexType><xs:sequence>` holding only element declarations
pub fn cts<I>(elements: I) -> ComplexType
where
    I: IntoIterator<Item = ElementDecl>,
{
    ComplexType::elements(elements)
}

/// `<xs:complexType name=...>` with a sequence
pub fn complex_type<I>(name: &str, particles: I) -> ComplexType
where
    I: IntoIterator<Item = SequenceParticle>,
{
    ComplexType::sequence(particles).named(name)
}

/// `<xs:complexType><xs:simpleContent><xs:extension base=...>`
pub fn simple_content(base: impl Into<SimpleType>) -> ComplexType {
    ComplexType::simple_content(base)
}

/// `<xs:attribute name=... type=... use="required">`
pub fn attribute(name: &str, simple_type: impl Into<SimpleType>) -> Attribute {
    Attribute::new(name, simple_type)
}

/// `<xs:any processContents="skip">`
pub fn any() -> Wildcard {
    Wildcard::new()
}

/// `<xs:simpleType><xs:restriction base=...>` with enumeration facets
pub fn restriction<I, S>(base: impl Into<SimpleType>, enumeration: I) -> Result<SimpleType>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SimpleType::restriction(base, enumeration)
}
