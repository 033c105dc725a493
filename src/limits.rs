//! Limits and rendering options
//!
//! This module holds the tunables of the crate. [`Limits`] protects
//! deserialization against oversized or deeply nested documents and
//! [`RenderOptions`] controls how element trees are written out as text.

use crate::error::{Error, Result};

/// Default maximum nesting depth of documents and instance trees
///
/// Decoding, validation and rendering walk trees recursively, so the depth
/// bound is also what keeps them within the stack of an ordinary thread.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resource limits applied while parsing and deserializing documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth, for documents and instances alike
    pub max_xml_depth: usize,

    /// Maximum XML document size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: DEFAULT_MAX_DEPTH,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 32,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    ///
    /// Documents near the depth bound need a thread with a stack larger than
    /// the 2 MiB default of spawned threads.
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 256,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_attributes: 10000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        check_depth(depth, self.max_xml_depth)
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the attribute count of one element is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }
}

fn check_depth(depth: usize, max: usize) -> Result<()> {
    if depth > max {
        Err(Error::LimitExceeded(format!(
            "XML depth {} exceeds maximum {}",
            depth, max
        )))
    } else {
        Ok(())
    }
}

/// Options for rendering an element tree as XML text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit an `<?xml version="1.0" encoding="utf-8"?>` declaration
    pub xml_declaration: bool,
    /// Indent nested elements by this many spaces (`None` = compact output)
    pub indent: Option<usize>,
    /// Deepest tree that will be rendered
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            xml_declaration: false,
            indent: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    /// Compact output without declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Output suitable for a standalone document
    pub fn document() -> Self {
        Self {
            xml_declaration: true,
            ..Self::default()
        }
    }

    /// Set the maximum depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check if a tree depth can be rendered
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        check_depth(depth, self.max_depth)
    }

    /// Set the XML declaration flag
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = declaration;
        self
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }
}
