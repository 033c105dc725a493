//! XSD Wildcards
//!
//! An `xs:any` particle accepts any well-formed element in its position of a
//! sequence. Matched elements are never checked against a type; they are kept
//! as opaque element trees.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Wildcards

use super::particles::{Occurs, Particle};

/// Default instance key of a wildcard particle
pub const DEFAULT_WILDCARD_KEY: &str = "any";

/// `xs:any` particle with `processContents="skip"` semantics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    /// Key under which instances store the matched elements
    key: String,
    /// Occurrence constraints
    occurs: Occurs,
}

impl Wildcard {
    /// Create a wildcard matching exactly one element
    pub fn new() -> Self {
        Self {
            key: DEFAULT_WILDCARD_KEY.to_string(),
            occurs: Occurs::once(),
        }
    }

    /// Store matched elements under a different key
    ///
    /// Needed when a sequence holds more than one wildcard.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
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

    /// The instance key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for Wildcard {
    fn default() -> Self {
        Self::new()
    }
}

impl Particle for Wildcard {
    fn occurs(&self) -> Occurs {
        self.occurs
    }
}
