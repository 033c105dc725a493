//! XSD Attribute declarations
//!
//! Attributes are scalar, never repeat, and are required unless marked
//! optional.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#cAttribute_Declarations

use super::builtins::XsdValue;
use super::simple_types::SimpleType;

/// XSD Attribute declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (unqualified)
    name: String,
    /// Attribute type
    simple_type: SimpleType,
    /// `use="required"`
    required: bool,
}

impl Attribute {
    /// Declare a required attribute
    pub fn new(name: impl Into<String>, simple_type: impl Into<SimpleType>) -> Self {
        Self {
            name: name.into(),
            simple_type: simple_type.into(),
            required: true,
        }
    }

    /// Mark the attribute as optional (`use="optional"`)
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute type
    pub fn simple_type(&self) -> &SimpleType {
        &self.simple_type
    }

    /// Whether the attribute must be present
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check a present (or missing) attribute value against this declaration
    pub fn check(&self, value: Option<&XsdValue>) -> bool {
        match value {
            Some(value) => self.simple_type.check_value(value),
            None => !self.required,
        }
    }
}
