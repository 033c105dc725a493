//! Typed instances
//!
//! An [`Instance`] is a tree of named nodes built against a schema. Instances
//! are created by lifting a loosely typed [`Value`] (usually a `json!`
//! literal) through the declared type of an element: mappings are matched by
//! particle and attribute name, lists fill repeated particles, and scalars
//! are normalized into the native value of their primitive kind.
//!
//! Construction checks structure only. Whether the values are valid for
//! their types is answered separately by [`crate::validate`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::converters::encode;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::namespaces::{Namespace, QName};
use crate::validators::{
    ComplexType, ElementRef, Particle, PrimitiveKind, ResolvedType, Schema, SequenceParticle,
    SimpleType, TypeRef, Wildcard, XsdValue, SIMPLE_CONTENT_VALUE_KEY,
};

// =============================================================================
// Instance tree
// =============================================================================

/// A scalar value tagged with the primitive kind it was built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    kind: PrimitiveKind,
    value: XsdValue,
}

impl Scalar {
    /// Create a scalar, normalizing the value into the kind's native form
    pub fn new(kind: PrimitiveKind, value: XsdValue) -> Self {
        Self {
            kind,
            value: kind.coerce(value),
        }
    }

    /// The empty value of a kind (the content of an empty element)
    pub fn empty(kind: PrimitiveKind) -> Self {
        Self::new(kind, XsdValue::String(String::new()))
    }

    /// The primitive kind
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// The native value
    pub fn value(&self) -> &XsdValue {
        &self.value
    }

    /// The lexical form written to XML
    pub fn lexical(&self) -> String {
        self.kind.format(&self.value)
    }

    fn to_json(&self) -> JsonValue {
        match &self.value {
            XsdValue::String(s) => JsonValue::String(s.clone()),
            XsdValue::Int(i) => JsonValue::from(*i),
            XsdValue::Boolean(b) => JsonValue::Bool(*b),
            XsdValue::Binary(_) => JsonValue::String(self.lexical()),
        }
    }
}

/// The content of an instance node
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Value of an element with a simple type
    Simple(Scalar),
    /// Text value plus attributes of a simple-content complex type
    SimpleContent {
        /// Text value
        value: Scalar,
        /// Attributes that are present
        attributes: IndexMap<String, Scalar>,
    },
    /// Children and attributes of a sequence complex type
    Complex {
        /// Present particles, in particle order
        fields: IndexMap<String, Field>,
        /// Attributes that are present
        attributes: IndexMap<String, Scalar>,
    },
}

/// The value stored under one particle key
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A particle with maxOccurs = 1
    One(Instance),
    /// The occurrences of a repeated particle, in document order
    Many(Vec<Instance>),
    /// Elements matched by a wildcard, kept as opaque trees
    Any(Vec<Element>),
}

impl Field {
    /// Number of occurrences
    pub fn len(&self) -> usize {
        match self {
            Field::One(_) => 1,
            Field::Many(items) => items.len(),
            Field::Any(elements) => elements.len(),
        }
    }

    /// Whether there are no occurrences
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The typed occurrences (empty for wildcards)
    pub fn instances(&self) -> &[Instance] {
        match self {
            Field::One(instance) => std::slice::from_ref(instance),
            Field::Many(items) => items,
            Field::Any(_) => &[],
        }
    }
}

/// A node of a typed instance tree
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    name: String,
    namespace: Arc<Namespace>,
    content: Content,
}

impl Instance {
    /// Create an instance node
    pub fn new(name: impl Into<String>, namespace: Arc<Namespace>, content: Content) -> Self {
        Self {
            name: name.into(),
            namespace,
            content,
        }
    }

    /// Element local name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element namespace
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The shared namespace handle
    pub fn namespace_arc(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    /// Qualified element name
    pub fn qname(&self) -> QName {
        self.namespace.qname(self.name.as_str())
    }

    /// Node content
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The scalar of a simple or simple-content node
    pub fn scalar(&self) -> Option<&Scalar> {
        match &self.content {
            Content::Simple(scalar) => Some(scalar),
            Content::SimpleContent { value, .. } => Some(value),
            Content::Complex { .. } => None,
        }
    }

    /// The native value of a simple or simple-content node
    pub fn value(&self) -> Option<&XsdValue> {
        self.scalar().map(Scalar::value)
    }

    /// The field stored under a particle key
    pub fn field(&self, key: &str) -> Option<&Field> {
        match &self.content {
            Content::Complex { fields, .. } => fields.get(key),
            _ => None,
        }
    }

    /// The child of a single-occurrence particle
    pub fn child(&self, key: &str) -> Option<&Instance> {
        match self.field(key) {
            Some(Field::One(child)) => Some(child),
            _ => None,
        }
    }

    /// All children stored under a particle key
    pub fn children(&self, key: &str) -> &[Instance] {
        match self.field(key) {
            Some(field) => field.instances(),
            None => &[],
        }
    }

    /// Elements matched by a wildcard particle
    pub fn wildcard(&self, key: &str) -> &[Element] {
        match self.field(key) {
            Some(Field::Any(elements)) => elements,
            _ => &[],
        }
    }

    /// The value of a present attribute
    pub fn attribute(&self, name: &str) -> Option<&XsdValue> {
        self.attributes().and_then(|a| a.get(name)).map(Scalar::value)
    }

    /// The present attributes, for complex nodes
    pub fn attributes(&self) -> Option<&IndexMap<String, Scalar>> {
        match &self.content {
            Content::Simple(_) => None,
            Content::SimpleContent { attributes, .. } | Content::Complex { attributes, .. } => {
                Some(attributes)
            }
        }
    }

    /// Nesting depth of the element tree this node renders as (1 for a leaf)
    ///
    /// Wildcard elements count with their own depth.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((instance, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            if let Content::Complex { fields, .. } = &instance.content {
                for field in fields.values() {
                    match field {
                        Field::Any(elements) => {
                            for element in elements {
                                deepest = deepest.max(depth + element.depth());
                            }
                        }
                        other => pending.extend(other.instances().iter().map(|c| (c, depth + 1))),
                    }
                }
            }
        }
        deepest
    }

    /// Whether the node is empty (built from an explicit null, or an empty element)
    pub fn is_nil(&self) -> bool {
        match &self.content {
            Content::Simple(scalar) => scalar.lexical().is_empty(),
            Content::SimpleContent { value, attributes } => {
                value.lexical().is_empty() && attributes.is_empty()
            }
            Content::Complex { fields, attributes } => fields.is_empty() && attributes.is_empty(),
        }
    }

    /// A JSON view of the node content
    ///
    /// Binary values appear in their lexical form and wildcard elements as
    /// generic element objects.
    pub fn to_json(&self) -> JsonValue {
        match &self.content {
            Content::Simple(scalar) => scalar.to_json(),
            Content::SimpleContent { value, attributes } => {
                let mut map = JsonMap::new();
                map.insert(SIMPLE_CONTENT_VALUE_KEY.to_string(), value.to_json());
                insert_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
            Content::Complex { fields, attributes } => {
                let mut map = JsonMap::new();
                for (key, field) in fields {
                    let value = match field {
                        Field::One(child) => child.to_json(),
                        Field::Many(items) => items.iter().map(Instance::to_json).collect(),
                        Field::Any(elements) => elements.iter().map(element_to_json).collect(),
                    };
                    map.insert(key.clone(), value);
                }
                insert_attributes(&mut map, attributes);
                JsonValue::Object(map)
            }
        }
    }

    /// The same node under another element name
    pub(crate) fn renamed(mut self, name: &str, namespace: &Arc<Namespace>) -> Self {
        self.name = name.to_string();
        self.namespace = Arc::clone(namespace);
        self
    }
}

fn insert_attributes(map: &mut JsonMap<String, JsonValue>, attributes: &IndexMap<String, Scalar>) {
    for (name, scalar) in attributes {
        map.insert(name.clone(), scalar.to_json());
    }
}

fn element_to_json(element: &Element) -> JsonValue {
    let attributes: JsonMap<String, JsonValue> = element
        .attributes
        .iter()
        .map(|(qname, value)| (qname.to_string(), JsonValue::String(value.clone())))
        .collect();
    json!({
        "name": element.qname.to_string(),
        "attributes": attributes,
        "text": element.text,
        "children": element.children.iter().map(element_to_json).collect::<Vec<_>>(),
    })
}

// =============================================================================
// Construction input
// =============================================================================

/// Loosely typed input for instance construction
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null: an empty element for single particles
    Null,
    /// Text
    String(String),
    /// Integer
    Int(i64),
    /// Boolean
    Boolean(bool),
    /// Raw bytes for binary kinds
    Bytes(Vec<u8>),
    /// Occurrences of a repeated particle, or positional values
    List(Vec<Value>),
    /// Values keyed by particle or attribute name
    Map(IndexMap<String, Value>),
    /// A pre-built instance, re-bound to the name of the slot it fills
    Instance(Instance),
    /// An opaque element for a wildcard slot
    Element(Element),
}

impl Value {
    /// Wrap raw bytes
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Build a mapping from key/value pairs
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn describe(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "a string",
            Value::Int(_) => "an integer",
            Value::Boolean(_) => "a boolean",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "a list",
            Value::Map(_) => "a mapping",
            Value::Instance(_) => "an instance",
            Value::Element(_) => "an element",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<Element> for Value {
    fn from(element: Element) -> Self {
        Value::Element(element)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::String(n.to_string()),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'a> From<TypeBuilder<'a>> for Value {
    fn from(builder: TypeBuilder<'a>) -> Self {
        Value::Map(builder.values)
    }
}

// =============================================================================
// Lifting values into instances
// =============================================================================

/// Build the instance of a top-level element named `name` with type `type_ref`
pub(crate) fn lift(schema: &Schema, name: &str, type_ref: &TypeRef, value: Value) -> Result<Instance> {
    lift_nested(schema, name, type_ref, value, 1)
}

fn lift_nested(
    schema: &Schema,
    name: &str,
    type_ref: &TypeRef,
    value: Value,
    depth: usize,
) -> Result<Instance> {
    schema.limits().check_xml_depth(depth)?;
    let resolved = schema.resolve(type_ref)?;
    lift_resolved(schema, name, resolved, value, depth)
}

fn lift_resolved(
    schema: &Schema,
    name: &str,
    resolved: ResolvedType<'_>,
    value: Value,
    depth: usize,
) -> Result<Instance> {
    let content = match (resolved, value) {
        (_, Value::Instance(instance)) => {
            schema.limits().check_xml_depth(depth - 1 + instance.depth())?;
            return Ok(instance.renamed(name, schema.namespace_arc()));
        }
        (ResolvedType::Simple(st), value) => Content::Simple(lift_scalar(st.kind(), value, name)?),
        (ResolvedType::Complex(ct), value) => match ct.simple_base() {
            Some(base) => lift_simple_content(ct, base, value, name)?,
            None => lift_sequence(schema, ct, value, name, depth)?,
        },
    };
    Ok(Instance::new(name, Arc::clone(schema.namespace_arc()), content))
}

fn lift_scalar(kind: PrimitiveKind, value: Value, name: &str) -> Result<Scalar> {
    let value = match value {
        Value::Null => return Ok(Scalar::empty(kind)),
        Value::String(s) => XsdValue::String(s),
        Value::Int(i) => XsdValue::Int(i),
        Value::Boolean(b) => XsdValue::Boolean(b),
        Value::Bytes(b) => XsdValue::Binary(b),
        other => {
            return Err(Error::construction(format!(
                "'{}' expects a scalar xs:{} value, got {}",
                name,
                kind,
                other.describe()
            )))
        }
    };
    Ok(Scalar::new(kind, value))
}

fn lift_simple_content(
    ct: &ComplexType,
    base: &SimpleType,
    value: Value,
    name: &str,
) -> Result<Content> {
    let mut map = match value {
        Value::Map(map) => map,
        Value::List(items) => {
            let keys = std::iter::once(SIMPLE_CONTENT_VALUE_KEY)
                .chain(ct.attributes().iter().map(|a| a.name()));
            positional(keys, items, name)?
        }
        scalar => {
            return Ok(Content::SimpleContent {
                value: lift_scalar(base.kind(), scalar, name)?,
                attributes: IndexMap::new(),
            })
        }
    };

    let value = match map.shift_remove(SIMPLE_CONTENT_VALUE_KEY) {
        Some(value) => lift_scalar(base.kind(), value, name)?,
        None => Scalar::empty(base.kind()),
    };
    let attributes = lift_attributes(ct, &mut map)?;
    reject_unknown(&map, name)?;

    Ok(Content::SimpleContent { value, attributes })
}

fn lift_sequence(
    schema: &Schema,
    ct: &ComplexType,
    value: Value,
    name: &str,
    depth: usize,
) -> Result<Content> {
    let mut map = match value {
        Value::Null => IndexMap::new(),
        Value::Map(map) => map,
        Value::List(items) => {
            let keys = ct
                .particles()
                .iter()
                .map(|p| p.key())
                .chain(ct.attributes().iter().map(|a| a.name()));
            positional(keys, items, name)?
        }
        other => {
            return Err(Error::construction(format!(
                "'{}' has element content and expects a mapping or a list, got {}",
                name,
                other.describe()
            )))
        }
    };

    let mut fields = IndexMap::new();
    for particle in ct.particles() {
        if let Some(value) = map.shift_remove(particle.key()) {
            if let Some(field) = lift_particle(schema, particle, value, depth + 1)? {
                fields.insert(particle.key().to_string(), field);
            }
        }
    }
    let attributes = lift_attributes(ct, &mut map)?;
    reject_unknown(&map, name)?;

    Ok(Content::Complex { fields, attributes })
}

fn lift_particle(
    schema: &Schema,
    particle: &SequenceParticle,
    value: Value,
    depth: usize,
) -> Result<Option<Field>> {
    match particle {
        SequenceParticle::Any(any) => lift_wildcard(schema, any, value, depth),
        SequenceParticle::Element(decl) if decl.occurs().is_single() => match value {
            Value::List(_) => Err(Error::construction(format!(
                "'{}' occurs at most once but a list was given",
                decl.name()
            ))),
            value => lift_nested(schema, decl.name(), decl.type_ref(), value, depth)
                .map(|i| Some(Field::One(i))),
        },
        SequenceParticle::Element(decl) => match value {
            Value::List(items) if items.is_empty() => Ok(None),
            Value::List(items) => items
                .into_iter()
                .map(|item| lift_nested(schema, decl.name(), decl.type_ref(), item, depth))
                .collect::<Result<Vec<_>>>()
                .map(|items| Some(Field::Many(items))),
            other => Err(Error::construction(format!(
                "'{}' may occur {} times and requires a list, got {}",
                decl.name(),
                decl.occurs(),
                other.describe()
            ))),
        },
    }
}

fn lift_wildcard(schema: &Schema, any: &Wildcard, value: Value, depth: usize) -> Result<Option<Field>> {
    let items = match value {
        Value::Null => return Ok(None),
        Value::List(items) => items,
        single => vec![single],
    };
    if items.is_empty() {
        return Ok(None);
    }

    let elements = items
        .into_iter()
        .map(|item| match item {
            Value::Instance(instance) => {
                schema.limits().check_xml_depth(depth - 1 + instance.depth())?;
                Ok(encode::to_element(&instance))
            }
            Value::Element(element) => {
                schema.limits().check_xml_depth(depth - 1 + element.depth())?;
                Ok(element)
            }
            other => Err(Error::construction(format!(
                "wildcard '{}' accepts instances or elements, got {}",
                any.key(),
                other.describe()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Field::Any(elements)))
}

fn lift_attributes(
    ct: &ComplexType,
    map: &mut IndexMap<String, Value>,
) -> Result<IndexMap<String, Scalar>> {
    let mut attributes = IndexMap::new();
    for attribute in ct.attributes() {
        match map.shift_remove(attribute.name()) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let scalar = lift_scalar(attribute.simple_type().kind(), value, attribute.name())?;
                attributes.insert(attribute.name().to_string(), scalar);
            }
        }
    }
    Ok(attributes)
}

fn positional<'k>(
    keys: impl Iterator<Item = &'k str>,
    items: Vec<Value>,
    name: &str,
) -> Result<IndexMap<String, Value>> {
    let keys: Vec<&str> = keys.collect();
    if items.len() > keys.len() {
        return Err(Error::construction(format!(
            "'{}' takes at most {} positional values, got {}",
            name,
            keys.len(),
            items.len()
        )));
    }
    Ok(keys
        .into_iter()
        .map(str::to_string)
        .zip(items)
        .collect())
}

fn reject_unknown(map: &IndexMap<String, Value>, name: &str) -> Result<()> {
    match map.keys().next() {
        Some(key) => Err(Error::construction(format!(
            "'{}' has no particle or attribute named '{}'",
            name, key
        ))),
        None => Ok(()),
    }
}

// =============================================================================
// Detached construction
// =============================================================================

/// A detached instance of a complex type, filled in before it is bound to an element
///
/// ```rust,ignore
/// let mut request = schema.complex_type("fooType")?.builder();
/// request.set("x", "message")?;
/// let instance = request.bind(schema.element("Request")?)?;
/// ```
#[derive(Debug, Clone)]
pub struct TypeBuilder<'a> {
    schema: &'a Schema,
    complex: &'a ComplexType,
    values: IndexMap<String, Value>,
}

impl<'a> TypeBuilder<'a> {
    pub(crate) fn new(schema: &'a Schema, complex: &'a ComplexType) -> Self {
        Self {
            schema,
            complex,
            values: IndexMap::new(),
        }
    }

    /// The type being built
    pub fn definition(&self) -> &'a ComplexType {
        self.complex
    }

    /// Set the value of a particle or attribute
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let known = self.complex.particle(key).is_some()
            || self.complex.attribute(key).is_some()
            || (self.complex.is_simple_content() && key == SIMPLE_CONTENT_VALUE_KEY);
        if !known {
            return Err(Error::construction(format!(
                "type has no particle or attribute named '{}'",
                key
            )));
        }
        self.values.insert(key.to_string(), value.into());
        Ok(self)
    }

    /// Owned variant of [`TypeBuilder::set`]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    /// The value currently set for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Produce an instance of `element` from the values set so far
    ///
    /// The builder is left unchanged and can be bound again.
    pub fn bind(&self, element: ElementRef<'_>) -> Result<Instance> {
        lift_resolved(
            self.schema,
            element.name(),
            ResolvedType::Complex(self.complex),
            Value::Map(self.values.clone()),
            1,
        )
    }
}
