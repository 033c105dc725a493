//! XSD Complex Type definitions
//!
//! This module implements complex type definitions for schemas. A complex
//! type either holds a sequence of particles (element content) or extends a
//! simple type with attributes (simple content).
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Complex_Type_Definitions

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::names::validate_ncname;

use super::attributes::Attribute;
use super::particles::{Particle, SequenceParticle};
use super::simple_types::SimpleType;

/// Construction key of the text value of a simple-content element
pub const SIMPLE_CONTENT_VALUE_KEY: &str = "value";

/// The content of a complex type - either a sequence or a simple type
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexContent {
    /// Element content: an ordered sequence of particles
    Sequence(Vec<SequenceParticle>),
    /// Simple content: text of the base type (`xs:simpleContent/xs:extension`)
    Simple(SimpleType),
}

impl ComplexContent {
    /// Get the particles if this is a sequence
    pub fn as_sequence(&self) -> Option<&[SequenceParticle]> {
        match self {
            ComplexContent::Sequence(particles) => Some(particles),
            ComplexContent::Simple(_) => None,
        }
    }

    /// Get as simple type if applicable
    pub fn as_simple(&self) -> Option<&SimpleType> {
        match self {
            ComplexContent::Sequence(_) => None,
            ComplexContent::Simple(simple) => Some(simple),
        }
    }
}

/// XSD Complex Type definition
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    /// Type name (None for anonymous types)
    name: Option<String>,
    /// Content model
    content: ComplexContent,
    /// Attribute declarations, in declaration order
    attributes: Vec<Attribute>,
}

impl ComplexType {
    /// Complex type with a sequence of particles
    pub fn sequence<I>(particles: I) -> Self
    where
        I: IntoIterator<Item = SequenceParticle>,
    {
        Self {
            name: None,
            content: ComplexContent::Sequence(particles.into_iter().collect()),
            attributes: Vec::new(),
        }
    }

    /// Complex type whose sequence only holds element declarations
    pub fn elements<I, E>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<super::elements::ElementDecl>,
    {
        Self::sequence(
            elements
                .into_iter()
                .map(|e| SequenceParticle::Element(e.into())),
        )
    }

    /// Complex type with no child elements (attributes only)
    pub fn empty() -> Self {
        Self::sequence(Vec::<SequenceParticle>::new())
    }

    /// Complex type with simple content of the given base type
    pub fn simple_content(base: impl Into<SimpleType>) -> Self {
        Self {
            name: None,
            content: ComplexContent::Simple(base.into()),
            attributes: Vec::new(),
        }
    }

    /// Add an attribute declaration
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add several attribute declarations
    pub fn with_attributes<I>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        self.attributes.extend(attributes);
        self
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

    /// The content model
    pub fn content(&self) -> &ComplexContent {
        &self.content
    }

    /// Particles of the sequence (empty for simple content)
    pub fn particles(&self) -> &[SequenceParticle] {
        self.content.as_sequence().unwrap_or(&[])
    }

    /// Find a particle by its instance key
    pub fn particle(&self, key: &str) -> Option<&SequenceParticle> {
        self.particles().iter().find(|p| p.key() == key)
    }

    /// The base type if this is a simple-content type
    pub fn simple_base(&self) -> Option<&SimpleType> {
        self.content.as_simple()
    }

    /// Whether this type has simple content
    pub fn is_simple_content(&self) -> bool {
        self.content.as_simple().is_some()
    }

    /// Attribute declarations
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Find an attribute declaration by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Check the local consistency of this definition
    ///
    /// Particle keys and attribute names must be valid and unique, occurrence
    /// bounds must be sane. Nested anonymous types are checked by the schema.
    pub(crate) fn check_definition(&self) -> Result<()> {
        let mut keys = HashSet::new();

        for particle in self.particles() {
            validate_ncname(particle.key())?;
            particle.occurs().check()?;
            if !keys.insert(particle.key()) {
                return Err(Error::type_definition(format!(
                    "particle '{}' is declared twice in the same sequence",
                    particle.key()
                )));
            }
        }

        if self.is_simple_content() {
            keys.insert(SIMPLE_CONTENT_VALUE_KEY);
        }

        let mut attribute_names = HashSet::new();
        for attribute in &self.attributes {
            validate_ncname(attribute.name())?;
            if !attribute_names.insert(attribute.name()) {
                return Err(Error::type_definition(format!(
                    "attribute '{}' is declared twice",
                    attribute.name()
                )));
            }
            if keys.contains(attribute.name()) {
                return Err(Error::type_definition(format!(
                    "attribute '{}' collides with a content key of the same name",
                    attribute.name()
                )));
            }
        }

        Ok(())
    }
}
