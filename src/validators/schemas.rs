//! Schema assembly and lookup
//!
//! A [`Schema`] is assembled once from an ordered batch of declarations and is
//! immutable afterwards. Named types are registered in a type table and
//! resolved through it whenever an element refers to them by name, so types
//! may refer to themselves or to types declared later in the same batch.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::complex_types::ComplexType;
use super::elements::{ElementDecl, TypeRef};
use super::particles::{Particle, SequenceParticle};
use super::simple_types::SimpleType;
use super::validation;

use crate::converters::decode;
use crate::documents::Element;
use crate::error::{Error, Result};
use crate::instances::{self, Instance, TypeBuilder, Value};
use crate::limits::Limits;
use crate::names::validate_ncname;
use crate::namespaces::Namespace;

// =============================================================================
// Declarations
// =============================================================================

/// A named type registered in the schema's type table
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    /// Named complex type
    Complex(ComplexType),
    /// Named simple type
    Simple(SimpleType),
}

impl TypeDef {
    /// The registered name
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeDef::Complex(ct) => ct.name(),
            TypeDef::Simple(st) => st.name(),
        }
    }

    /// Get as complex type if applicable
    pub fn as_complex(&self) -> Option<&ComplexType> {
        match self {
            TypeDef::Complex(ct) => Some(ct),
            TypeDef::Simple(_) => None,
        }
    }

    /// Get as simple type if applicable
    pub fn as_simple(&self) -> Option<&SimpleType> {
        match self {
            TypeDef::Complex(_) => None,
            TypeDef::Simple(st) => Some(st),
        }
    }
}

/// One item of the batch a schema is assembled from
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// Top-level element
    Element(ElementDecl),
    /// Named complex type
    ComplexType(ComplexType),
    /// Named simple type
    SimpleType(SimpleType),
}

impl From<ElementDecl> for Declaration {
    fn from(decl: ElementDecl) -> Self {
        Declaration::Element(decl)
    }
}

impl From<ComplexType> for Declaration {
    fn from(ct: ComplexType) -> Self {
        Declaration::ComplexType(ct)
    }
}

impl From<SimpleType> for Declaration {
    fn from(st: SimpleType) -> Self {
        Declaration::SimpleType(st)
    }
}

/// A type reference after resolution through the type table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedType<'a> {
    /// Simple type
    Simple(&'a SimpleType),
    /// Complex type
    Complex(&'a ComplexType),
}

// =============================================================================
// Schema
// =============================================================================

/// An assembled, immutable schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Target namespace, shared with every instance built from this schema
    namespace: Arc<Namespace>,
    /// Top-level element declarations
    elements: IndexMap<String, ElementDecl>,
    /// Named types
    types: IndexMap<String, TypeDef>,
    /// Limits applied when deserializing documents
    limits: Limits,
}

impl Schema {
    /// Start assembling a schema for the given namespace
    pub fn builder(namespace: Namespace) -> SchemaBuilder {
        SchemaBuilder::new(namespace)
    }

    /// Assemble a new schema from this one plus more declarations
    pub fn extend<I>(self, declarations: I) -> Result<Schema>
    where
        I: IntoIterator<Item = Declaration>,
    {
        let mut builder = SchemaBuilder {
            namespace: self.namespace,
            declarations: Vec::with_capacity(self.types.len() + self.elements.len()),
            limits: self.limits,
        };
        builder
            .declarations
            .extend(self.types.into_values().map(|def| match def {
                TypeDef::Complex(ct) => Declaration::ComplexType(ct),
                TypeDef::Simple(st) => Declaration::SimpleType(st),
            }));
        builder
            .declarations
            .extend(self.elements.into_values().map(Declaration::Element));
        builder.declarations.extend(declarations);
        builder.build()
    }

    /// Replace the deserialization limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The target namespace
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The shared handle on the target namespace
    pub fn namespace_arc(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    /// The deserialization limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Look up a top-level element
    pub fn element(&self, name: &str) -> Result<ElementRef<'_>> {
        self.get(name).ok_or_else(|| {
            Error::UnknownElement(format!(
                "'{}' is not declared in namespace '{}'",
                name,
                self.namespace.uri()
            ))
        })
    }

    /// Look up a top-level element, if declared
    pub fn get(&self, name: &str) -> Option<ElementRef<'_>> {
        self.elements
            .get(name)
            .map(|decl| ElementRef { schema: self, decl })
    }

    /// Iterate over the top-level elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.elements
            .values()
            .map(move |decl| ElementRef { schema: self, decl })
    }

    /// Iterate over the named types in declaration order
    pub fn types(&self) -> impl Iterator<Item = (&str, &TypeDef)> {
        self.types.iter().map(|(name, def)| (name.as_str(), def))
    }

    /// Look up a named type
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Look up a named complex type
    pub fn complex_type(&self, name: &str) -> Result<ComplexTypeRef<'_>> {
        match self.types.get(name) {
            Some(TypeDef::Complex(ct)) => Ok(ComplexTypeRef {
                schema: self,
                complex: ct,
            }),
            _ => Err(Error::UnresolvedType(format!(
                "complex type '{}' is not declared",
                name
            ))),
        }
    }

    /// Look up a named simple type
    pub fn simple_type(&self, name: &str) -> Result<&SimpleType> {
        match self.types.get(name) {
            Some(TypeDef::Simple(st)) => Ok(st),
            _ => Err(Error::UnresolvedType(format!(
                "simple type '{}' is not declared",
                name
            ))),
        }
    }

    /// Resolve a type reference through the type table
    pub fn resolve<'a>(&'a self, type_ref: &'a TypeRef) -> Result<ResolvedType<'a>> {
        match type_ref {
            TypeRef::Simple(st) => Ok(ResolvedType::Simple(st)),
            TypeRef::Complex(ct) => Ok(ResolvedType::Complex(ct)),
            TypeRef::Named(name) => match self.types.get(name) {
                Some(TypeDef::Complex(ct)) => Ok(ResolvedType::Complex(ct)),
                Some(TypeDef::Simple(st)) => Ok(ResolvedType::Simple(st)),
                None => Err(Error::UnresolvedType(format!(
                    "type '{}' is not declared",
                    name
                ))),
            },
        }
    }

    /// Build an instance of a top-level element
    pub fn instance(&self, element: &str, value: impl Into<Value>) -> Result<Instance> {
        self.element(element)?.instance(value)
    }

    /// Check an instance against this schema
    pub fn is_valid(&self, instance: &Instance) -> bool {
        validation::validate(self, instance)
    }

    /// Parse an XML document into an instance of one of the top-level elements
    pub fn deserialize(&self, xml: &str) -> Result<Instance> {
        decode::decode_document(self, xml)
    }

    /// Decode an already parsed element tree
    pub fn decode_element(&self, element: &Element) -> Result<Instance> {
        decode::decode_element(self, element)
    }
}

impl Index<&str> for Schema {
    type Output = ElementDecl;

    /// Panics when no top-level element has the given name
    fn index(&self, name: &str) -> &ElementDecl {
        match self.elements.get(name) {
            Some(decl) => decl,
            None => panic!("no top-level element named '{}'", name),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Schema({}, {} elements, {} types)",
            self.namespace,
            self.elements.len(),
            self.types.len()
        )
    }
}

// =============================================================================
// Handles
// =============================================================================

/// A top-level element declaration together with its schema
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    schema: &'a Schema,
    decl: &'a ElementDecl,
}

impl<'a> ElementRef<'a> {
    /// The element declaration
    pub fn decl(&self) -> &'a ElementDecl {
        self.decl
    }

    /// The owning schema
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Element local name
    pub fn name(&self) -> &'a str {
        self.decl.name()
    }

    /// Element namespace
    pub fn namespace(&self) -> &'a Namespace {
        self.schema.namespace()
    }

    /// The element's type, resolved through the schema
    pub fn resolved_type(&self) -> Result<ResolvedType<'a>> {
        self.schema.resolve(self.decl.type_ref())
    }

    /// The element's simple type, when it has one
    pub fn simple_type(&self) -> Option<&'a SimpleType> {
        match self.resolved_type() {
            Ok(ResolvedType::Simple(st)) => Some(st),
            _ => None,
        }
    }

    /// Build an instance of this element from a value
    pub fn instance(&self, value: impl Into<Value>) -> Result<Instance> {
        instances::lift(self.schema, self.decl.name(), self.decl.type_ref(), value.into())
    }

    /// Start a detached instance of this element's complex type
    pub fn type_builder(&self) -> Result<TypeBuilder<'a>> {
        match self.resolved_type()? {
            ResolvedType::Complex(complex) => Ok(TypeBuilder::new(self.schema, complex)),
            ResolvedType::Simple(_) => Err(Error::construction(format!(
                "element '{}' has a simple type; there is nothing to build",
                self.decl.name()
            ))),
        }
    }
}

/// A named complex type together with its schema
#[derive(Debug, Clone, Copy)]
pub struct ComplexTypeRef<'a> {
    schema: &'a Schema,
    complex: &'a ComplexType,
}

impl<'a> ComplexTypeRef<'a> {
    /// The type definition
    pub fn definition(&self) -> &'a ComplexType {
        self.complex
    }

    /// Start a detached instance of this type
    pub fn builder(&self) -> TypeBuilder<'a> {
        TypeBuilder::new(self.schema, self.complex)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Collects declarations and assembles them into a [`Schema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    namespace: Arc<Namespace>,
    declarations: Vec<Declaration>,
    limits: Limits,
}

impl SchemaBuilder {
    /// Create a builder for the given namespace
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace: Arc::new(namespace),
            declarations: Vec::new(),
            limits: Limits::default(),
        }
    }

    /// Add one declaration
    pub fn declare(mut self, declaration: impl Into<Declaration>) -> Self {
        self.declarations.push(declaration.into());
        self
    }

    /// Add several declarations
    pub fn declarations<I>(mut self, declarations: I) -> Self
    where
        I: IntoIterator<Item = Declaration>,
    {
        self.declarations.extend(declarations);
        self
    }

    /// Set the deserialization limits of the schema
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Register every declaration and check the batch as a whole
    pub fn build(self) -> Result<Schema> {
        let mut elements = IndexMap::new();
        let mut types = IndexMap::new();

        for declaration in self.declarations {
            match declaration {
                Declaration::Element(decl) => {
                    validate_ncname(decl.name())?;
                    let name = decl.name().to_string();
                    if elements.insert(name.clone(), decl).is_some() {
                        return Err(Error::type_definition(format!(
                            "top-level element '{}' is declared twice",
                            name
                        )));
                    }
                }
                Declaration::ComplexType(ct) => {
                    let name = top_level_name(ct.name(), "complex")?;
                    register_type(&mut types, name, TypeDef::Complex(ct))?;
                }
                Declaration::SimpleType(st) => {
                    let name = top_level_name(st.name(), "simple")?;
                    register_type(&mut types, name, TypeDef::Simple(st))?;
                }
            }
        }

        let schema = Schema {
            namespace: self.namespace,
            elements,
            types,
            limits: self.limits,
        };

        for def in schema.types.values() {
            if let TypeDef::Complex(ct) = def {
                schema.check_complex(ct)?;
            }
        }
        for decl in schema.elements.values() {
            decl.occurs().check()?;
            schema.check_type_ref(decl.type_ref())?;
        }

        debug!(
            namespace = schema.namespace.uri(),
            elements = schema.elements.len(),
            types = schema.types.len(),
            "assembled schema"
        );
        Ok(schema)
    }
}

/// Assemble a schema from an ordered batch of declarations
pub fn define_schema<I>(namespace: Namespace, declarations: I) -> Result<Schema>
where
    I: IntoIterator<Item = Declaration>,
{
    SchemaBuilder::new(namespace)
        .declarations(declarations)
        .build()
}

fn top_level_name(name: Option<&str>, kind: &str) -> Result<String> {
    match name {
        Some(name) => {
            validate_ncname(name)?;
            Ok(name.to_string())
        }
        None => Err(Error::type_definition(format!(
            "top-level {} type must have a name",
            kind
        ))),
    }
}

fn register_type(types: &mut IndexMap<String, TypeDef>, name: String, def: TypeDef) -> Result<()> {
    if types.contains_key(&name) {
        return Err(Error::type_definition(format!(
            "type '{}' is declared twice",
            name
        )));
    }
    types.insert(name, def);
    Ok(())
}

impl Schema {
    fn check_type_ref(&self, type_ref: &TypeRef) -> Result<()> {
        match type_ref {
            TypeRef::Simple(_) => Ok(()),
            TypeRef::Complex(ct) => self.check_complex(ct),
            TypeRef::Named(name) => {
                if self.types.contains_key(name) {
                    Ok(())
                } else {
                    Err(Error::UnresolvedType(format!(
                        "type '{}' is referenced but never declared",
                        name
                    )))
                }
            }
        }
    }

    fn check_complex(&self, ct: &ComplexType) -> Result<()> {
        ct.check_definition()?;
        for particle in ct.particles() {
            if let SequenceParticle::Element(decl) = particle {
                trace!(element = decl.name(), occurs = %decl.occurs(), "checking particle");
                self.check_type_ref(decl.type_ref())?;
            }
        }
        Ok(())
    }
}
