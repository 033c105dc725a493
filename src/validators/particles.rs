//! XSD Particle Schema Components
//!
//! This module implements the particle model for sequence content. Particles
//! define occurrence constraints (minOccurs, maxOccurs) for the element and
//! wildcard slots of a sequence.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#p

use crate::error::{Error, Result};
use std::fmt;

use super::elements::ElementDecl;
use super::wildcards::Wildcard;

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Check if particle has maxOccurs == 1
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Check if occurrence count is under the minimum
    pub fn is_missing(&self, count: usize) -> bool {
        count < self.min as usize
    }

    /// Check if occurrence count is at or over the maximum
    pub fn is_over(&self, count: usize) -> bool {
        match self.max {
            Some(max) => count >= max as usize,
            None => false,
        }
    }

    /// Check if occurrence count exceeds the maximum
    pub fn is_exceeded(&self, count: usize) -> bool {
        match self.max {
            Some(max) => count > max as usize,
            None => false,
        }
    }

    /// Check if an occurrence count satisfies both bounds
    pub fn contains(&self, count: usize) -> bool {
        !self.is_missing(count) && !self.is_exceeded(count)
    }

    /// Check the bounds themselves: maxOccurs >= 1 and maxOccurs >= minOccurs
    pub fn check(&self) -> Result<()> {
        match self.max {
            Some(0) => Err(Error::type_definition("maxOccurs must be a positive integer")),
            Some(max) if max < self.min => Err(Error::type_definition(format!(
                "maxOccurs ({}) must be greater than or equal to minOccurs ({})",
                max, self.min
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..unbounded", self.min),
        }
    }
}

/// Trait for XSD components that have particle semantics
pub trait Particle {
    /// Get the occurrence bounds
    fn occurs(&self) -> Occurs;

    /// Get minimum occurrences
    fn min_occurs(&self) -> u32 {
        self.occurs().min
    }

    /// Get maximum occurrences (None = unbounded)
    fn max_occurs(&self) -> Option<u32> {
        self.occurs().max
    }
}

/// One slot of a sequence: an element declaration or a wildcard
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceParticle {
    /// A declared child element
    Element(ElementDecl),
    /// An `xs:any` wildcard
    Any(Wildcard),
}

impl SequenceParticle {
    /// The key under which instances store this particle's value
    pub fn key(&self) -> &str {
        match self {
            SequenceParticle::Element(decl) => decl.name(),
            SequenceParticle::Any(any) => any.key(),
        }
    }

    /// Get as an element declaration if applicable
    pub fn as_element(&self) -> Option<&ElementDecl> {
        match self {
            SequenceParticle::Element(decl) => Some(decl),
            SequenceParticle::Any(_) => None,
        }
    }
}

impl Particle for SequenceParticle {
    fn occurs(&self) -> Occurs {
        match self {
            SequenceParticle::Element(decl) => decl.occurs(),
            SequenceParticle::Any(any) => any.occurs(),
        }
    }
}

impl From<ElementDecl> for SequenceParticle {
    fn from(decl: ElementDecl) -> Self {
        SequenceParticle::Element(decl)
    }
}

impl From<Wildcard> for SequenceParticle {
    fn from(any: Wildcard) -> Self {
        SequenceParticle::Any(any)
    }
}
