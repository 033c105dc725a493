//! # xsdecl
//!
//! Declare XML Schemas in Rust, build typed instances against them, validate
//! those instances, and move them in and out of XML.
//!
//! ## Features
//!
//! - Schema model: simple types with enumerations, sequence and
//!   simple-content complex types, attributes, wildcards, occurrence bounds
//! - Named types with forward and recursive references
//! - Instance construction from `json!` literals or a detached type builder
//! - Boolean validation of instances
//! - Serialization to XML and schema-guided deserialization
//! - A ready-made SOAP 1.1 envelope schema
//!
//! ## Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use xsdecl::{define_schema, serialize, validate, xs, Namespace};
//!
//! let schema = define_schema(Namespace::new("http://boo", "boo"), [
//!     xs::element("AddRequest", xs::cts([
//!         xs::element("x", xs::STRING),
//!         xs::element("y", xs::INT),
//!     ])).into(),
//! ])?;
//!
//! let request = schema.instance("AddRequest", json!({"x": "10", "y": 15}))?;
//! assert!(validate(&schema, &request));
//!
//! let xml = serialize(&request)?;
//! assert_eq!(schema.deserialize(&xml)?, request);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// XML plumbing
pub mod namespaces;
pub mod names;
pub mod documents;

// Schema model
pub mod validators;
pub mod xs;

// Instances and conversion
pub mod instances;
pub mod converters;

// Protocol schemas
pub mod soap;

// Re-exports for convenience
pub use converters::{serialize, serialize_with};
pub use error::{Error, Result};
pub use instances::{Content, Field, Instance, Scalar, TypeBuilder, Value};
pub use limits::{Limits, RenderOptions};
pub use namespaces::Namespace;
pub use validators::{define_schema, validate, Declaration, ElementRef, Schema, SchemaBuilder};

/// Version of the xsdecl library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
