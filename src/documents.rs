//! XML document handling
//!
//! This is the host XML layer: it turns XML text into a tree of namespaced
//! [`Element`]s and renders such a tree back into text. The schema layer never
//! touches raw text; it only builds and walks these trees.

use crate::error::{Error, Result};
use crate::limits::{Limits, RenderOptions};
use crate::namespaces::{PrefixMap, QName};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::Writer;

/// XML Element in the document tree
///
/// Two elements are equal when their names, attributes, text and children
/// are. The prefix is a rendering hint and takes no part in equality.
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Prefix the element was read with, or should preferably be written with
    pub prefix: Option<String>,
    /// Element attributes, in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            prefix: None,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Set the preferred prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an unqualified attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(QName::local(name), value.into());
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content, with a missing text node read as the empty string
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether the element has neither text nor children
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, str::is_empty) && self.children.is_empty()
    }

    /// Nesting depth of the tree rooted here (1 for an element without children)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((element, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(element.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Render this element as XML text
    pub fn render(&self, options: &RenderOptions) -> Result<String> {
        render(self, options)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.attributes == other.attributes
            && self.text == other.text
            && self.children == other.children
    }
}

/// XML Document representation
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml, &Limits::default())
    }

    /// Parse an XML document from a string
    pub fn parse(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = NsReader::from_str(xml);
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let (ns, event) = reader
                .read_resolved_event()
                .map_err(|e| Error::Xml(format!("Error parsing XML: {}", e)))?;
            let ns = owned_namespace(ns)?;

            match event {
                Event::Start(e) => {
                    let element = Self::parse_element(&reader, ns, &e, limits)?;
                    stack.push(element);
                    limits.check_xml_depth(stack.len())?;
                }
                Event::Empty(e) => {
                    let element = Self::parse_element(&reader, ns, &e, limits)?;
                    limits.check_xml_depth(stack.len() + 1)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                    // Indentation between child elements is not content
                    if !element.children.is_empty()
                        && element.text.as_deref().map_or(false, |t| t.trim().is_empty())
                    {
                        element.text = None;
                    }
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    if let Some(current) = stack.last_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| Error::Xml(format!("Failed to unescape text: {}", e)))?;
                        current.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = stack.last_mut() {
                        let text = String::from_utf8(e.into_inner().into_owned())
                            .map_err(|e| Error::Xml(format!("Invalid CDATA section: {}", e)))?;
                        current.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::Eof => break,
                _ => {} // Comments, processing instructions, declarations
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("unexpected end of document".to_string()));
        }
        root.map(|root| Document { root })
            .ok_or_else(|| Error::Xml("document has no root element".to_string()))
    }

    fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
        } else if root.is_some() {
            return Err(Error::Xml(format!(
                "document has more than one root element ('{}')",
                element.qname
            )));
        } else {
            *root = Some(element);
        }
        Ok(())
    }

    /// Parse element from a start tag whose namespace is already resolved
    fn parse_element(
        reader: &NsReader<&[u8]>,
        namespace: Option<String>,
        start: &BytesStart,
        limits: &Limits,
    ) -> Result<Element> {
        let local = utf8(start.local_name().as_ref())?;
        let mut element = Element::new(QName::new(namespace, local));
        element.prefix = match start.name().prefix() {
            Some(prefix) => Some(utf8(prefix.as_ref())?),
            None => None,
        };

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            // Namespace declarations are consumed by the reader
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }

            let (attr_ns, attr_local) = reader.resolve_attribute(attr.key);
            let attr_ns = owned_namespace(attr_ns)?;
            let attr_qname = QName::new(attr_ns, utf8(attr_local.as_ref())?);

            let value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .into_owned();
            element.attributes.insert(attr_qname, value);
        }
        limits.check_attributes(element.attributes.len())?;

        Ok(element)
    }

    /// Render the document as text
    pub fn render(&self, options: &RenderOptions) -> Result<String> {
        render(&self.root, options)
    }
}

/// Parse XML text into an element tree
pub fn parse(xml: &str) -> Result<Element> {
    Ok(Document::from_string(xml)?.root)
}

/// Render an element tree into XML text
///
/// All namespaces used anywhere in the tree are declared on the root element.
pub fn render(root: &Element, options: &RenderOptions) -> Result<String> {
    options.check_depth(root.depth())?;

    let mut prefixes = PrefixMap::new();
    collect_namespaces(root, &mut prefixes);

    let mut writer = match options.indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };

    if options.xml_declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_error)?;
    }

    write_element(&mut writer, root, &prefixes, true)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("rendered document is not UTF-8: {}", e)))
}

fn collect_namespaces(element: &Element, prefixes: &mut PrefixMap) {
    if let Some(ns) = element.namespace() {
        prefixes.declare(ns, element.prefix.as_deref());
    }
    for qname in element.attributes.keys() {
        if let Some(ns) = qname.namespace.as_deref() {
            prefixes.declare(ns, None);
        }
    }
    for child in &element.children {
        collect_namespaces(child, prefixes);
    }
}

fn prefixed(qname: &QName, prefixes: &PrefixMap) -> String {
    match qname
        .namespace
        .as_deref()
        .and_then(|ns| prefixes.prefix_of(ns))
    {
        Some(prefix) => format!("{}:{}", prefix, qname.local_name),
        None => qname.local_name.clone(),
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    prefixes: &PrefixMap,
    is_root: bool,
) -> Result<()> {
    let name = prefixed(&element.qname, prefixes);
    let mut start = BytesStart::new(name.clone());

    if is_root {
        for (uri, prefix) in prefixes.iter() {
            let decl = format!("xmlns:{}", prefix);
            start.push_attribute((decl.as_str(), uri));
        }
    }
    for (qname, value) in &element.attributes {
        let key = prefixed(qname, prefixes);
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    if let Some(text) = element.text.as_deref().filter(|t| !t.is_empty()) {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    for child in &element.children {
        write_element(writer, child, prefixes, false)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)
}

fn write_error(e: quick_xml::Error) -> Error {
    Error::Xml(format!("Failed to write XML: {}", e))
}

fn owned_namespace(ns: ResolveResult) -> Result<Option<String>> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(utf8(ns.as_ref())?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::Xml(format!(
            "Unknown namespace prefix: {}",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Xml(format!("Invalid UTF-8 in name: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let root = parse(xml).unwrap();

        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
        assert_eq!(root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="value2"><child/></root>"#;
        let root = parse(xml).unwrap();

        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), Some("value2"));
        assert!(root.children[0].is_empty());
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<b:root xmlns:b="http://boo"><b:x>1</b:x><y xmlns="http://other"/></b:root>"#;
        let root = parse(xml).unwrap();

        assert_eq!(root.namespace(), Some("http://boo"));
        assert_eq!(root.prefix.as_deref(), Some("b"));
        assert!(root.attributes.is_empty());
        assert_eq!(root.children[0].namespace(), Some("http://boo"));
        assert_eq!(root.children[1].namespace(), Some("http://other"));
        assert_eq!(root.children[1].prefix, None);
    }

    #[test]
    fn test_parse_keeps_leaf_whitespace() {
        let xml = "<root>\n  <a>  padded  </a>\n  <b/>\n</root>";
        let root = parse(xml).unwrap();

        assert_eq!(root.text, None);
        assert_eq!(root.children[0].text.as_deref(), Some("  padded  "));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("<root><a></root>"), Err(Error::Xml(_))));
        assert!(matches!(parse(""), Err(Error::Xml(_))));
        assert!(matches!(parse("<p:root/>"), Err(Error::Xml(_))));
    }

    #[test]
    fn test_parse_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        let err = Document::parse("<a><b><c/></b></a>", &limits).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }

    #[test]
    fn test_render_declares_namespaces_on_root() {
        let root = Element::new(QName::namespaced("http://boo", "Request"))
            .with_prefix("boo")
            .with_attribute("lang", "en")
            .with_child(Element::new(QName::namespaced("http://boo", "x")).with_prefix("boo").with_text("a<b"))
            .with_child(Element::new(QName::namespaced("http://boo", "y")).with_prefix("boo"));

        let xml = render(&root, &RenderOptions::new()).unwrap();
        assert_eq!(
            xml,
            r#"<boo:Request xmlns:boo="http://boo" lang="en"><boo:x>a&lt;b</boo:x><boo:y/></boo:Request>"#
        );
    }

    #[test]
    fn test_prefix_is_not_part_of_equality() {
        let xml = r#"<root xmlns="http://boo"><x>1</x></root>"#;
        let parsed = parse(xml).unwrap();
        assert_eq!(parsed.prefix, None);

        let rendered = render(&parsed, &RenderOptions::new()).unwrap();
        let reparsed = parse(&rendered).unwrap();
        assert!(reparsed.prefix.is_some());
        assert_eq!(reparsed, parsed);

        let other = Element::new(QName::namespaced("http://other", "root"));
        assert_ne!(parsed, other);
    }

    #[test]
    fn test_depth() {
        let leaf = Element::new(QName::local("c"));
        assert_eq!(leaf.depth(), 1);

        let tree = Element::new(QName::local("a"))
            .with_child(Element::new(QName::local("b")).with_child(leaf))
            .with_child(Element::new(QName::local("d")));
        assert_eq!(tree.depth(), 3);

        let err = render(&tree, &RenderOptions::new().with_max_depth(2)).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }

    #[test]
    fn test_render_parse_roundtrip() {
        let root = Element::new(QName::namespaced("http://a", "root"))
            .with_prefix("a")
            .with_child(Element::new(QName::namespaced("http://b", "inner")).with_prefix("b").with_text("v"))
            .with_child(Element::new(QName::local("plain")));

        let xml = render(&root, &RenderOptions::document()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert_eq!(parse(&xml).unwrap(), root);
    }
}
