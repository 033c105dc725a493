//! XML Schema components
//!
//! This module contains the schema model (types, particles, declarations),
//! schema assembly and the instance validator.

// Type system
pub mod builtins;
pub mod simple_types;
pub mod attributes;

// Content models
pub mod particles;
pub mod wildcards;
pub mod complex_types;
pub mod elements;

// Schema assembly and validation
pub mod schemas;
pub mod validation;

// Re-exports
pub use attributes::Attribute;
pub use builtins::{PrimitiveKind, XsdValue};
pub use complex_types::{ComplexContent, ComplexType, SIMPLE_CONTENT_VALUE_KEY};
pub use elements::{ElementDecl, TypeRef};
pub use particles::{Occurs, Particle, SequenceParticle};
pub use schemas::{
    define_schema, ComplexTypeRef, Declaration, ElementRef, ResolvedType, Schema, SchemaBuilder,
    TypeDef,
};
pub use simple_types::{Enumeration, SimpleType};
pub use validation::validate;
pub use wildcards::{Wildcard, DEFAULT_WILDCARD_KEY};
