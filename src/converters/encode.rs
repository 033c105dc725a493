//! Instance serialization
//!
//! Instances carry their namespace and the primitive kind of every scalar,
//! so no schema is needed to write them out.

use crate::documents::{self, Element};
use crate::error::Result;
use crate::instances::{Content, Field, Instance, Scalar};
use crate::limits::RenderOptions;

/// Serialize an instance as compact XML text
pub fn serialize(instance: &Instance) -> Result<String> {
    serialize_with(instance, &RenderOptions::default())
}

/// Serialize an instance with explicit rendering options
///
/// Instances deeper than `options.max_depth` fail with
/// [`crate::Error::LimitExceeded`].
pub fn serialize_with(instance: &Instance, options: &RenderOptions) -> Result<String> {
    options.check_depth(instance.depth())?;
    documents::render(&to_element(instance), options)
}

/// Convert an instance into an element tree
///
/// Every occurrence of a repeated particle becomes its own sibling and
/// wildcard elements are copied as they are. The conversion recurses once
/// per level, so the depth is not checked here; see [`serialize_with`].
pub fn to_element(instance: &Instance) -> Element {
    let namespace = instance.namespace();
    let mut element = Element::new(instance.qname()).with_prefix(namespace.prefix());

    match instance.content() {
        Content::Simple(scalar) => {
            element.text = text_of(scalar);
        }
        Content::SimpleContent { value, attributes } => {
            element = write_attributes(element, attributes);
            element.text = text_of(value);
        }
        Content::Complex { fields, attributes } => {
            element = write_attributes(element, attributes);
            for field in fields.values() {
                match field {
                    Field::One(child) => element.children.push(to_element(child)),
                    Field::Many(items) => element.children.extend(items.iter().map(to_element)),
                    Field::Any(elements) => element.children.extend(elements.iter().cloned()),
                }
            }
        }
    }

    element
}

fn text_of(scalar: &Scalar) -> Option<String> {
    Some(scalar.lexical()).filter(|text| !text.is_empty())
}

fn write_attributes<'a>(
    element: Element,
    attributes: impl IntoIterator<Item = (&'a String, &'a Scalar)>,
) -> Element {
    attributes
        .into_iter()
        .fold(element, |element, (name, scalar)| {
            element.with_attribute(name.as_str(), scalar.lexical())
        })
}
