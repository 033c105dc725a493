//! SOAP 1.1 envelope schema
//!
//! The envelope is itself declared with the schema model: `Header` and
//! `Body` are optional and hold any number of arbitrary elements, and
//! `Fault` is added to the assembled schema afterwards.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::instances::{Instance, Value};
use crate::namespaces::Namespace;
use crate::validators::{define_schema, ComplexType, ElementDecl, PrimitiveKind, Schema, Wildcard};

/// SOAP 1.1 envelope namespace
pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Prefix the envelope namespace is rendered with
pub const SOAP_PREFIX: &str = "soap";

static SCHEMA: Lazy<Schema> =
    Lazy::new(|| build_schema().expect("SOAP envelope schema is well-formed"));

/// The process-wide SOAP envelope schema
pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn open_content(name: &str) -> ElementDecl {
    ElementDecl::new(
        name,
        ComplexType::sequence([Wildcard::new().min_occurs(0).unbounded().into()]),
    )
    .optional()
}

fn build_schema() -> Result<Schema> {
    let envelope = ElementDecl::new(
        "Envelope",
        ComplexType::elements([open_content("Header"), open_content("Body")]),
    );
    let fault = ElementDecl::new(
        "Fault",
        ComplexType::elements([
            ElementDecl::new("faultcode", PrimitiveKind::String),
            ElementDecl::new("faultstring", PrimitiveKind::String),
            ElementDecl::new("faultactor", PrimitiveKind::String).optional(),
            ElementDecl::new("detail", PrimitiveKind::String).optional(),
        ]),
    );

    define_schema(
        Namespace::new(SOAP_ENVELOPE_NAMESPACE, SOAP_PREFIX),
        [envelope.into()],
    )?
    .extend([fault.into()])
}

/// Wrap payload elements into an envelope without a header
///
/// The body accepts an instance, an element, or a list of them.
pub fn envelope(body: impl Into<Value>) -> Result<Instance> {
    schema().instance(
        "Envelope",
        Value::map([("Body", Value::map([("any", body.into())]))]),
    )
}

/// Wrap header and payload elements into an envelope
pub fn envelope_with_header(header: impl Into<Value>, body: impl Into<Value>) -> Result<Instance> {
    schema().instance(
        "Envelope",
        Value::map([
            ("Header", Value::map([("any", header.into())])),
            ("Body", Value::map([("any", body.into())])),
        ]),
    )
}

/// Build a `Fault` element
pub fn fault(code: &str, message: &str) -> Result<Instance> {
    schema().instance(
        "Fault",
        Value::map([("faultcode", code), ("faultstring", message)]),
    )
}

/// Parse an envelope (or a bare fault) from XML text
pub fn parse(xml: &str) -> Result<Instance> {
    schema().deserialize(xml)
}
