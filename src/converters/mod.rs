//! Instance converters
//!
//! This module moves instances in and out of XML:
//! - [`encode`]: instance → element tree → text
//! - [`decode`]: text → element tree → instance, guided by the schema
//!
//! Both directions go through the [`crate::documents`] element tree, so the
//! conversion rules never deal with raw XML text.

pub mod decode;
pub mod encode;

pub use decode::{decode_document, decode_element};
pub use encode::{serialize, serialize_with, to_element};
