//! Instance deserialization
//!
//! The decoder walks an element tree along the schema. Each particle of a
//! sequence consumes the consecutive children that match it, up to its
//! maxOccurs; whatever is left over after the last particle is a mismatch.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::documents::{Document, Element};
use crate::error::{Result, SchemaMismatchError};
use crate::instances::{Content, Field, Instance, Scalar};
use crate::namespaces::Namespace;
use crate::validators::{
    ComplexType, Particle, PrimitiveKind, ResolvedType, Schema, SequenceParticle, TypeRef,
};

/// Parse a document and decode its root element
pub fn decode_document(schema: &Schema, xml: &str) -> Result<Instance> {
    let document = Document::parse(xml, schema.limits())?;
    debug!(
        root = %document.root.qname,
        namespace = schema.namespace().uri(),
        "deserializing document"
    );
    decode_element(schema, &document.root)
}

/// Decode a root element against the schema's top-level elements
///
/// Trees deeper than the schema's depth limit are refused before decoding.
pub fn decode_element(schema: &Schema, element: &Element) -> Result<Instance> {
    schema.limits().check_xml_depth(element.depth())?;

    let decl = match element.namespace() {
        Some(ns) if ns == schema.namespace().uri() => schema.get(element.local_name()),
        _ => None,
    };
    match decl {
        Some(decl) => Decoder { schema }.decode(decl.name(), decl.decl().type_ref(), element),
        None => Err(SchemaMismatchError::new(format!(
            "root element is not declared in namespace '{}'",
            schema.namespace().uri()
        ))
        .with_found(element.qname.to_string())
        .into()),
    }
}

struct Decoder<'a> {
    schema: &'a Schema,
}

impl<'a> Decoder<'a> {
    fn namespace(&self) -> Arc<Namespace> {
        Arc::clone(self.schema.namespace_arc())
    }

    fn decode(&self, name: &str, type_ref: &TypeRef, element: &Element) -> Result<Instance> {
        let content = match self.schema.resolve(type_ref)? {
            ResolvedType::Simple(st) => {
                reject_children(element)?;
                Content::Simple(parse_scalar(st.kind(), element.text_or_empty(), name)?)
            }
            ResolvedType::Complex(ct) => match ct.simple_base() {
                Some(base) => {
                    reject_children(element)?;
                    Content::SimpleContent {
                        value: parse_scalar(base.kind(), element.text_or_empty(), name)?,
                        attributes: decode_attributes(ct, element)?,
                    }
                }
                None => Content::Complex {
                    fields: self.decode_sequence(ct, element)?,
                    attributes: decode_attributes(ct, element)?,
                },
            },
        };
        Ok(Instance::new(name, self.namespace(), content))
    }

    fn decode_sequence(
        &self,
        ct: &ComplexType,
        element: &Element,
    ) -> Result<IndexMap<String, Field>> {
        let particles = ct.particles();
        let children = &element.children;
        let mut fields = IndexMap::new();
        let mut pos = 0;

        for (index, particle) in particles.iter().enumerate() {
            let occurs = particle.occurs();
            let start = pos;

            while pos < children.len() && !occurs.is_over(pos - start) {
                let child = &children[pos];
                let matched = match particle {
                    SequenceParticle::Element(decl) => self.is_named(child, decl.name()),
                    SequenceParticle::Any(_) => !particles[index + 1..]
                        .iter()
                        .filter_map(SequenceParticle::as_element)
                        .any(|later| self.is_named(child, later.name())),
                };
                if !matched {
                    break;
                }
                pos += 1;
            }

            let count = pos - start;
            trace!(particle = particle.key(), count, occurs = %occurs, "decoded particle");

            if occurs.is_missing(count) {
                let mut err = SchemaMismatchError::new(format!(
                    "expected at least {} '{}' but found {}",
                    occurs.min,
                    particle.key(),
                    count
                ))
                .with_element(element.local_name());
                if let Some(child) = children.get(pos) {
                    err = err.with_found(child.local_name());
                }
                return Err(err.into());
            }
            if count == 0 {
                continue;
            }

            let matched = &children[start..pos];
            let field = match particle {
                SequenceParticle::Any(_) => Field::Any(matched.to_vec()),
                SequenceParticle::Element(decl) => {
                    let mut items = matched
                        .iter()
                        .map(|child| self.decode(decl.name(), decl.type_ref(), child))
                        .collect::<Result<Vec<_>>>()?;
                    if occurs.is_single() {
                        Field::One(items.remove(0))
                    } else {
                        Field::Many(items)
                    }
                }
            };
            fields.insert(particle.key().to_string(), field);
        }

        if let Some(extra) = children.get(pos) {
            return Err(SchemaMismatchError::new("unexpected element")
                .with_element(element.local_name())
                .with_found(extra.qname.to_string())
                .into());
        }

        Ok(fields)
    }

    fn is_named(&self, child: &Element, local_name: &str) -> bool {
        child.qname.matches(self.schema.namespace(), local_name)
    }
}

fn reject_children(element: &Element) -> Result<()> {
    match element.children.first() {
        Some(child) => Err(SchemaMismatchError::new("element with simple content has child elements")
            .with_element(element.local_name())
            .with_found(child.qname.to_string())
            .into()),
        None => Ok(()),
    }
}

fn decode_attributes(ct: &ComplexType, element: &Element) -> Result<IndexMap<String, Scalar>> {
    let mut attributes = IndexMap::new();
    for attribute in ct.attributes() {
        match element.get_attribute(attribute.name()) {
            Some(text) => {
                let scalar = parse_scalar(attribute.simple_type().kind(), text, attribute.name())?;
                attributes.insert(attribute.name().to_string(), scalar);
            }
            None if attribute.is_required() => {
                return Err(SchemaMismatchError::new(format!(
                    "missing required attribute '{}'",
                    attribute.name()
                ))
                .with_element(element.local_name())
                .into());
            }
            None => {}
        }
    }
    Ok(attributes)
}

fn parse_scalar(kind: PrimitiveKind, text: &str, name: &str) -> Result<Scalar> {
    match kind.parse(text) {
        Ok(value) => Ok(Scalar::new(kind, value)),
        Err(e) => Err(SchemaMismatchError::new(e.to_string())
            .with_element(name)
            .with_found(text)
            .into()),
    }
}
