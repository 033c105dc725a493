//! XSD built-in types
//!
//! This module defines the primitive kinds a schema can use, the native values
//! instances carry for them, and the lexical mapping between the two.

use base64::Engine;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

// =============================================================================
// XSD type names
// =============================================================================

/// XSD string type name
pub const XSD_STRING: &str = "string";
/// XSD int type name
pub const XSD_INT: &str = "int";
/// XSD boolean type name
pub const XSD_BOOLEAN: &str = "boolean";
/// XSD hexBinary type name
pub const XSD_HEX_BINARY: &str = "hexBinary";
/// XSD base64Binary type name
pub const XSD_BASE64_BINARY: &str = "base64Binary";

lazy_static::lazy_static! {
    /// XSD boolean value mapping
    static ref XSD_BOOLEAN_MAP: HashMap<&'static str, bool> = {
        let mut m = HashMap::new();
        m.insert("false", false);
        m.insert("0", false);
        m.insert("true", true);
        m.insert("1", true);
        m
    };

    static ref INT_REGEX: regex::Regex =
        regex::Regex::new(r"^[+-]?[0-9]+$").expect("int pattern is valid");

    static ref HEX_BINARY_REGEX: regex::Regex =
        regex::Regex::new(r"^([0-9a-fA-F]{2})*$").expect("hexBinary pattern is valid");
}

// =============================================================================
// XSD Value Representation
// =============================================================================

/// A host-native scalar value held by an instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum XsdValue {
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Boolean value
    Boolean(bool),
    /// Binary value (hex or base64 decoded)
    Binary(Vec<u8>),
}

impl XsdValue {
    /// The string payload, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            XsdValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            XsdValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The boolean payload, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            XsdValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The byte payload, if this is a binary value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            XsdValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for XsdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XsdValue::String(s) => write!(f, "{}", s),
            XsdValue::Int(i) => write!(f, "{}", i),
            XsdValue::Boolean(b) => write!(f, "{}", rust_to_boolean(*b)),
            XsdValue::Binary(b) => write!(f, "{}", hex_encode(b)),
        }
    }
}

// =============================================================================
// Primitive Kinds
// =============================================================================

/// A text value that is not in the lexical space of a primitive kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{lexical}' is not a valid xs:{kind} value")]
pub struct LexicalError {
    /// The kind the value was checked against
    pub kind: PrimitiveKind,
    /// The offending text
    pub lexical: String,
}

/// The primitive XSD types supported by the schema model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// xs:string
    String,
    /// xs:int (32-bit signed)
    Int,
    /// xs:boolean
    Boolean,
    /// xs:hexBinary
    HexBinary,
    /// xs:base64Binary
    Base64Binary,
}

impl PrimitiveKind {
    /// The XSD local name of the type
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::String => XSD_STRING,
            PrimitiveKind::Int => XSD_INT,
            PrimitiveKind::Boolean => XSD_BOOLEAN,
            PrimitiveKind::HexBinary => XSD_HEX_BINARY,
            PrimitiveKind::Base64Binary => XSD_BASE64_BINARY,
        }
    }

    /// Whether values of this kind are byte sequences
    pub fn is_binary(&self) -> bool {
        matches!(self, PrimitiveKind::HexBinary | PrimitiveKind::Base64Binary)
    }

    /// Parse a lexical representation into a native value
    pub fn parse(&self, lexical: &str) -> Result<XsdValue, LexicalError> {
        let invalid = || LexicalError {
            kind: *self,
            lexical: lexical.to_string(),
        };

        match self {
            PrimitiveKind::String => Ok(XsdValue::String(lexical.to_string())),
            PrimitiveKind::Int => int_validator(lexical.trim())
                .map(XsdValue::Int)
                .ok_or_else(invalid),
            PrimitiveKind::Boolean => boolean_to_rust(lexical.trim())
                .map(XsdValue::Boolean)
                .ok_or_else(invalid),
            PrimitiveKind::HexBinary => hex_binary_validator(lexical.trim())
                .map(XsdValue::Binary)
                .ok_or_else(invalid),
            PrimitiveKind::Base64Binary => base64_binary_validator(lexical)
                .map(XsdValue::Binary)
                .ok_or_else(invalid),
        }
    }

    /// Render a value in the lexical form of this kind
    ///
    /// Values that do not belong to the kind are rendered with their natural
    /// text form so that they survive until validation rejects them.
    pub fn format(&self, value: &XsdValue) -> String {
        match (self, value) {
            (PrimitiveKind::HexBinary, XsdValue::Binary(b)) => hex_encode(b),
            (PrimitiveKind::HexBinary, XsdValue::String(s)) => hex_encode(s.as_bytes()),
            (PrimitiveKind::Base64Binary, XsdValue::Binary(b)) => base64_encode(b),
            (PrimitiveKind::Base64Binary, XsdValue::String(s)) => base64_encode(s.as_bytes()),
            (_, XsdValue::Binary(b)) => String::from_utf8_lossy(b).into_owned(),
            (_, other) => other.to_string(),
        }
    }

    /// Whether a native value belongs to the lexical space of this kind
    pub fn accepts(&self, value: &XsdValue) -> bool {
        match (self, value) {
            (PrimitiveKind::String, XsdValue::Binary(b)) => std::str::from_utf8(b).is_ok(),
            (PrimitiveKind::String, _) => true,
            (PrimitiveKind::Int, XsdValue::Int(i)) => i32::try_from(*i).is_ok(),
            (PrimitiveKind::Int, XsdValue::String(s)) => int_validator(s.trim()).is_some(),
            (PrimitiveKind::Boolean, XsdValue::Boolean(_)) => true,
            (PrimitiveKind::Boolean, XsdValue::String(s)) => boolean_to_rust(s.trim()).is_some(),
            (k, XsdValue::Binary(_) | XsdValue::String(_)) if k.is_binary() => true,
            _ => false,
        }
    }

    /// Normalize a value into the native representation of this kind
    ///
    /// Lexically valid text becomes the native value a parser would produce;
    /// anything else is returned unchanged.
    pub fn coerce(&self, value: XsdValue) -> XsdValue {
        match (self, value) {
            (PrimitiveKind::String, XsdValue::Binary(b)) => match String::from_utf8(b) {
                Ok(s) => XsdValue::String(s),
                Err(e) => XsdValue::Binary(e.into_bytes()),
            },
            (PrimitiveKind::String, other @ (XsdValue::Int(_) | XsdValue::Boolean(_))) => {
                XsdValue::String(other.to_string())
            }
            (PrimitiveKind::Int | PrimitiveKind::Boolean, XsdValue::String(s)) => {
                self.parse(&s).unwrap_or(XsdValue::String(s))
            }
            (k, XsdValue::String(s)) if k.is_binary() => XsdValue::Binary(s.into_bytes()),
            (_, other) => other,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Lexical Helpers
// =============================================================================

/// Parse an xs:int lexical value
fn int_validator(value: &str) -> Option<i64> {
    if !INT_REGEX.is_match(value) {
        return None;
    }
    value.parse::<i32>().ok().map(i64::from)
}

/// Convert an XSD boolean string to a Rust bool
pub fn boolean_to_rust(value: &str) -> Option<bool> {
    XSD_BOOLEAN_MAP.get(value).copied()
}

/// Convert Rust bool to XSD boolean string
pub fn rust_to_boolean(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Decode a hexBinary value
pub fn hex_binary_validator(value: &str) -> Option<Vec<u8>> {
    if !HEX_BINARY_REGEX.is_match(value) {
        return None;
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).ok())
        .collect()
}

/// Decode a base64Binary value (whitespace is ignored)
pub fn base64_binary_validator(value: &str) -> Option<Vec<u8>> {
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Some(Vec::new());
    }
    base64::engine::general_purpose::STANDARD.decode(&cleaned).ok()
}

/// Encode bytes as lowercase hexadecimal digit pairs
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Encode bytes as standard base64
pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
