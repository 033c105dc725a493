//! Instance validation
//!
//! Validation is a pure conformance check of an [`Instance`] tree against a
//! [`Schema`]. It answers with a `bool` and never fails: an unresolvable type
//! or a structural surprise simply makes the instance invalid.

use indexmap::IndexMap;
use tracing::debug;

use super::complex_types::ComplexType;
use super::elements::{ElementDecl, TypeRef};
use super::particles::{Particle, SequenceParticle};
use super::schemas::{ResolvedType, Schema};

use crate::instances::{Content, Field, Instance, Scalar};

/// Validate an instance against a schema
///
/// The instance must be an instance of one of the schema's top-level
/// elements: its name and namespace have to match a declaration. Instances
/// deeper than the schema's depth limit are invalid.
pub fn validate(schema: &Schema, instance: &Instance) -> bool {
    if instance.namespace().uri() != schema.namespace().uri() {
        return false;
    }
    if schema.limits().check_xml_depth(instance.depth()).is_err() {
        debug!(element = instance.name(), "instance exceeds the depth limit");
        return false;
    }
    match schema.get(instance.name()) {
        Some(element) => check_instance(schema, element.decl().type_ref(), instance),
        None => false,
    }
}

fn check_instance(schema: &Schema, type_ref: &TypeRef, instance: &Instance) -> bool {
    let resolved = match schema.resolve(type_ref) {
        Ok(resolved) => resolved,
        Err(_) => return false,
    };

    match (resolved, instance.content()) {
        (ResolvedType::Simple(st), Content::Simple(scalar)) => st.check_value(scalar.value()),
        (ResolvedType::Complex(ct), Content::SimpleContent { value, attributes }) => match ct
            .simple_base()
        {
            Some(base) => base.check_value(value.value()) && check_attributes(ct, attributes),
            None => false,
        },
        (ResolvedType::Complex(ct), Content::Complex { fields, attributes }) => {
            !ct.is_simple_content()
                && check_sequence(schema, ct, fields)
                && check_attributes(ct, attributes)
        }
        _ => false,
    }
}

fn check_attributes(ct: &ComplexType, attributes: &IndexMap<String, Scalar>) -> bool {
    ct.attributes()
        .iter()
        .all(|attribute| attribute.check(attributes.get(attribute.name()).map(Scalar::value)))
}

fn check_sequence(schema: &Schema, ct: &ComplexType, fields: &IndexMap<String, Field>) -> bool {
    if fields.keys().any(|key| ct.particle(key).is_none()) {
        return false;
    }

    ct.particles().iter().all(|particle| {
        let field = fields.get(particle.key());
        let count = field.map_or(0, Field::len);
        if !particle.occurs().contains(count) {
            return false;
        }

        match (particle, field) {
            (_, None) => true,
            (SequenceParticle::Any(_), Some(Field::Any(_))) => true,
            (SequenceParticle::Element(decl), Some(Field::One(child))) => {
                check_child(schema, decl, child)
            }
            (SequenceParticle::Element(decl), Some(Field::Many(children))) => children
                .iter()
                .all(|child| check_child(schema, decl, child)),
            _ => false,
        }
    })
}

fn check_child(schema: &Schema, decl: &ElementDecl, child: &Instance) -> bool {
    child.name() == decl.name()
        && child.namespace().uri() == schema.namespace().uri()
        && check_instance(schema, decl.type_ref(), child)
}
