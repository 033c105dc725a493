//! End-to-end schema tests
//!
//! Each test declares a small schema, builds an instance, validates it, and
//! checks what comes back from a serialize/deserialize round trip.

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as JsonValue};

use xsdecl::documents::Element;
use xsdecl::namespaces::QName;
use xsdecl::validators::{Attribute, ComplexType, ElementDecl, SimpleType, XsdValue};
use xsdecl::{
    define_schema, serialize, validate, xs, Content, Error, Field, Instance, Limits, Namespace,
    Schema, Value,
};

fn boo() -> Namespace {
    Namespace::new("http://boo", "boo")
}

fn roundtrip(schema: &Schema, instance: &Instance) -> Instance {
    let xml = serialize(instance).unwrap();
    schema.deserialize(&xml).unwrap()
}

#[test]
fn test_simple_schema() {
    let schema = define_schema(
        boo(),
        [
            xs::element("AddRequest", xs::cts([xs::element("x", xs::STRING), xs::element("y", xs::INT)]))
                .into(),
            xs::element("AddResponse", xs::INT).into(),
        ],
    )
    .unwrap();

    let request = schema.instance("AddRequest", json!({"x": "10", "y": "15"})).unwrap();
    assert!(validate(&schema, &request));
    let response = schema.instance("AddResponse", 15).unwrap();
    assert!(validate(&schema, &response));

    let request = schema.instance("AddRequest", json!({"x": "11", "y": "12"})).unwrap();
    let obj = roundtrip(&schema, &request);
    assert_eq!(obj.child("x").unwrap().value().and_then(XsdValue::as_str), Some("11"));
    assert_eq!(obj.child("y").unwrap().value().and_then(XsdValue::as_int), Some(12));
    assert_eq!(obj, request);

    let obj = roundtrip(&schema, &schema.instance("AddResponse", 30).unwrap());
    assert_eq!(obj.value().and_then(XsdValue::as_int), Some(30));
}

#[test]
fn test_zero_min_occurs() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::cts([
                xs::element("x", xs::STRING).min_occurs(0),
                xs::element("y", xs::INT),
            ]),
        )
        .into()],
    )
    .unwrap();

    let request = schema.instance("Request", json!({"y": 15})).unwrap();
    assert!(validate(&schema, &request));

    let obj = roundtrip(&schema, &request);
    assert!(obj.field("x").is_none());
    assert_eq!(obj.child("y").unwrap().value().and_then(XsdValue::as_int), Some(15));
}

#[test]
fn test_max_occurs_greater_than_one() {
    let schema = define_schema(
        boo(),
        [xs::element("Request", xs::cts([xs::element("x", xs::INT).unbounded()])).into()],
    )
    .unwrap();

    let request = schema.instance("Request", json!({"x": [15, 22, 30]})).unwrap();
    assert!(validate(&schema, &request));

    let xml = serialize(&request).unwrap();
    assert_eq!(xml.matches("<boo:x>").count(), 3);

    let obj = schema.deserialize(&xml).unwrap();
    let values: Vec<_> = obj.children("x").iter().filter_map(|x| x.value()).collect();
    assert_eq!(values, vec![&XsdValue::Int(15), &XsdValue::Int(22), &XsdValue::Int(30)]);
}

#[test]
fn test_attributes() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::cts([xs::element("x", xs::INT)]).with_attribute(xs::attribute("y", xs::INT)),
        )
        .into()],
    )
    .unwrap();

    let request = schema.instance("Request", json!({"x": 15, "y": 20})).unwrap();
    assert!(validate(&schema, &request));

    let xml = serialize(&request).unwrap();
    assert!(xml.contains(r#"y="20""#));

    let obj = schema.deserialize(&xml).unwrap();
    assert_eq!(obj.child("x").unwrap().value().and_then(XsdValue::as_int), Some(15));
    assert_eq!(obj.attribute("y").and_then(XsdValue::as_int), Some(20));
}

#[test]
fn test_enumeration() {
    let lang = xs::restriction(xs::STRING, ["en", "ru"]).unwrap();
    let schema = define_schema(boo(), [xs::element("Request", lang).into()]).unwrap();

    let request = schema.instance("Request", "en").unwrap();
    assert!(validate(&schema, &request));

    let obj = roundtrip(&schema, &request);
    assert_eq!(obj.value().and_then(XsdValue::as_str), Some("en"));
    let member = schema
        .element("Request")
        .unwrap()
        .simple_type()
        .and_then(|st| st.member("en"));
    assert_eq!(member, Some("en"));

    let request = schema.instance("Request", "fr").unwrap();
    assert!(!validate(&schema, &request));
}

#[test]
fn test_invalid_enumeration_literal() {
    let err = xs::restriction(xs::INT, ["1", "two"]).unwrap_err();
    assert!(matches!(err, Error::TypeDefinition(_)));
}

#[test]
fn test_simple_content() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::simple_content(xs::STRING).with_attribute(xs::attribute("lang", xs::STRING)),
        )
        .into()],
    )
    .unwrap();

    let request = schema
        .instance("Request", json!({"value": "message", "lang": "en"}))
        .unwrap();
    assert!(validate(&schema, &request));

    let xml = serialize(&request).unwrap();
    assert_eq!(
        xml,
        r#"<boo:Request xmlns:boo="http://boo" lang="en">message</boo:Request>"#
    );

    let obj = schema.deserialize(&xml).unwrap();
    assert_eq!(obj.value().and_then(XsdValue::as_str), Some("message"));
    assert_eq!(obj.attribute("lang").and_then(XsdValue::as_str), Some("en"));
}

#[test]
fn test_type_instances() {
    let schema = define_schema(
        boo(),
        [xs::element("Request", xs::cts([xs::element("x", xs::STRING)])).into()],
    )
    .unwrap();
    let element = schema.element("Request").unwrap();

    let request = element.type_builder().unwrap().with("x", "message").unwrap();
    let real_request = request.bind(element).unwrap();
    assert!(validate(&schema, &real_request));
    let obj = roundtrip(&schema, &real_request);
    assert_eq!(obj.child("x").unwrap().value().and_then(XsdValue::as_str), Some("message"));

    let mut request = element.type_builder().unwrap();
    request.set("x", "message").unwrap();
    let real_request = request.bind(element).unwrap();
    assert!(validate(&schema, &real_request));
    let obj = roundtrip(&schema, &real_request);
    assert_eq!(obj.child("x").unwrap().value().and_then(XsdValue::as_str), Some("message"));
}

#[test]
fn test_none_values_are_wrapped_into_empty_element() {
    let schema = define_schema(
        boo(),
        [xs::element("Request", xs::cts([xs::element("foo", xs::STRING)])).into()],
    )
    .unwrap();

    let request = schema.instance("Request", json!({"foo": null})).unwrap();
    assert!(validate(&schema, &request));
    assert!(serialize(&request).unwrap().contains("<boo:foo/>"));
    assert_eq!(roundtrip(&schema, &request), request);
}

#[test]
fn test_null_and_absent_optional_particles() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::cts([
                xs::element("x", xs::STRING).min_occurs(0),
                xs::element("y", xs::INT),
            ]),
        )
        .into()],
    )
    .unwrap();

    let null = schema.instance("Request", json!({"x": null, "y": 1})).unwrap();
    assert!(validate(&schema, &null));
    let xml = serialize(&null).unwrap();
    assert!(xml.contains("<boo:x/>"));
    let obj = schema.deserialize(&xml).unwrap();
    assert_eq!(obj.child("x").unwrap().value().and_then(XsdValue::as_str), Some(""));
    assert_eq!(obj, null);

    let absent = schema.instance("Request", json!({"y": 1})).unwrap();
    assert!(validate(&schema, &absent));
    let xml = serialize(&absent).unwrap();
    assert!(!xml.contains("boo:x"));
    let obj = schema.deserialize(&xml).unwrap();
    assert!(obj.field("x").is_none());
    assert_eq!(obj, absent);
    assert_ne!(obj, null);
}

#[test]
fn test_dict_instances() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::cts([xs::element(
                "foo",
                xs::cts([xs::element("x", xs::STRING), xs::element("y", xs::INT)]),
            )]),
        )
        .into()],
    )
    .unwrap();

    let request = schema
        .instance("Request", json!({"foo": {"x": "boo", "y": 100}}))
        .unwrap();
    assert!(validate(&schema, &request));

    let obj = roundtrip(&schema, &request);
    let foo = obj.child("foo").unwrap();
    assert_eq!(foo.child("x").unwrap().value().and_then(XsdValue::as_str), Some("boo"));
    assert_eq!(foo.child("y").unwrap().value().and_then(XsdValue::as_int), Some(100));
}

#[test]
fn test_type_aliases() {
    let schema = define_schema(
        boo(),
        [
            xs::complex_type(
                "fooType",
                [xs::element("x", xs::STRING).into(), xs::element("y", xs::INT).into()],
            )
            .into(),
            xs::element("Request", xs::cts([xs::element("foo", "fooType")])).into(),
        ],
    )
    .unwrap();

    let request = schema
        .instance("Request", json!({"foo": {"x": "boo", "y": 100}}))
        .unwrap();
    assert!(validate(&schema, &request));

    let obj = roundtrip(&schema, &request);
    let foo = obj.child("foo").unwrap();
    assert_eq!(foo.child("x").unwrap().value().and_then(XsdValue::as_str), Some("boo"));
    assert_eq!(foo.child("y").unwrap().value().and_then(XsdValue::as_int), Some(100));
}

#[test]
fn test_shared_named_type_behaves_like_inline_copies() {
    let foo = || xs::cts([xs::element("x", xs::STRING), xs::element("y", xs::INT)]);
    let schema = define_schema(
        boo(),
        [
            xs::complex_type(
                "fooType",
                [xs::element("x", xs::STRING).into(), xs::element("y", xs::INT).into()],
            )
            .into(),
            xs::element(
                "Shared",
                xs::cts([xs::element("a", "fooType"), xs::element("b", "fooType")]),
            )
            .into(),
            xs::element("Inline", xs::cts([xs::element("a", foo()), xs::element("b", foo())])).into(),
        ],
    )
    .unwrap();

    let values = [
        json!({"a": {"x": "one", "y": 1}, "b": {"x": "two", "y": 2}}),
        json!({"a": {"x": "one", "y": 1}, "b": {"x": "two", "y": "two"}}),
        json!({"a": {"x": "one", "y": 1}, "b": {"x": null, "y": 2}}),
        json!({"a": {"x": "one", "y": 1}}),
    ];
    for value in values {
        let shared = schema.instance("Shared", value.clone());
        let inline = schema.instance("Inline", value);
        assert_eq!(shared.is_ok(), inline.is_ok());
        let (shared, inline) = match (shared, inline) {
            (Ok(shared), Ok(inline)) => (shared, inline),
            _ => continue,
        };

        assert_eq!(validate(&schema, &shared), validate(&schema, &inline));
        let shared_xml = serialize(&shared).unwrap();
        let inline_xml = serialize(&inline).unwrap();
        assert_eq!(shared_xml.replace("Shared", "Inline"), inline_xml);
        if validate(&schema, &shared) {
            assert_eq!(roundtrip(&schema, &shared).to_json(), roundtrip(&schema, &inline).to_json());
        }
    }
}

#[test]
fn test_named_type_builder() {
    let schema = define_schema(
        boo(),
        [
            xs::complex_type("fooType", [xs::element("x", xs::STRING).into()]).into(),
            xs::element("Request", "fooType").into(),
        ],
    )
    .unwrap();

    let mut foo = schema.complex_type("fooType").unwrap().builder();
    foo.set("x", "hello").unwrap();
    let request = foo.bind(schema.element("Request").unwrap()).unwrap();
    assert!(schema.is_valid(&request));
    assert_eq!(roundtrip(&schema, &request), request);
}

#[test]
fn test_boolean() {
    let schema = define_schema(
        boo(),
        [xs::element("Request", xs::cts([xs::element("foo", xs::BOOLEAN)])).into()],
    )
    .unwrap();

    for flag in [true, false] {
        let request = schema.instance("Request", json!({"foo": flag})).unwrap();
        assert!(validate(&schema, &request));
        let obj = roundtrip(&schema, &request);
        assert_eq!(
            obj.child("foo").unwrap().value(),
            Some(&XsdValue::Boolean(flag))
        );
    }
}

#[test]
fn test_binary_data() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::cts([
                xs::element("foo", xs::HEX_BINARY),
                xs::element("boo", xs::BASE64_BINARY),
            ]),
        )
        .into()],
    )
    .unwrap();

    let data = vec![1u8, 2, 3];
    let request = schema
        .instance(
            "Request",
            Value::map([("foo", Value::bytes(data.clone())), ("boo", Value::bytes(data.clone()))]),
        )
        .unwrap();
    assert!(validate(&schema, &request));

    let xml = serialize(&request).unwrap();
    assert!(xml.contains("010203"));
    assert!(xml.contains("AQID"));

    let obj = schema.deserialize(&xml).unwrap();
    assert_eq!(obj.child("foo").unwrap().value(), Some(&XsdValue::Binary(data.clone())));
    assert_eq!(obj.child("boo").unwrap().value(), Some(&XsdValue::Binary(data)));
}

#[test]
fn test_dict_instantiation_for_aliased_types() {
    let schema = define_schema(
        boo(),
        [
            ComplexType::empty()
                .with_attribute(Attribute::new("x", xs::INT))
                .with_attribute(Attribute::new("y", xs::INT))
                .named("Point")
                .into(),
            xs::complex_type(
                "Vector",
                [xs::element("a", "Point").into(), xs::element("b", "Point").into()],
            )
            .into(),
            xs::element(
                "Request",
                xs::cts([xs::element("vector", "Vector").min_occurs(0).unbounded()]),
            )
            .into(),
        ],
    )
    .unwrap();

    let request = schema
        .instance(
            "Request",
            json!({"vector": [{"a": {"x": 1, "y": 2}, "b": {"x": 3, "y": 4}}]}),
        )
        .unwrap();
    assert!(validate(&schema, &request));

    let obj = roundtrip(&schema, &request);
    let vector = &obj.children("vector")[0];
    assert_eq!(vector.child("a").unwrap().attribute("x").and_then(XsdValue::as_int), Some(1));
    assert_eq!(vector.child("a").unwrap().attribute("y").and_then(XsdValue::as_int), Some(2));
    assert_eq!(vector.child("b").unwrap().attribute("x").and_then(XsdValue::as_int), Some(3));
    assert_eq!(vector.child("b").unwrap().attribute("y").and_then(XsdValue::as_int), Some(4));
}

#[test]
fn test_customize_optional() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            xs::cts([xs::optional("x", xs::STRING), xs::element("y", xs::INT)]),
        )
        .into()],
    )
    .unwrap();

    let request = schema.instance("Request", json!({"y": 15})).unwrap();
    assert!(validate(&schema, &request));

    let obj = roundtrip(&schema, &request);
    assert!(obj.child("x").is_none());
    assert_eq!(obj.child("y").unwrap().value().and_then(XsdValue::as_int), Some(15));
}

#[test]
fn test_customize_array() {
    let schema = define_schema(
        boo(),
        [xs::element("Request", xs::cts([xs::array("x", xs::INT)])).into()],
    )
    .unwrap();

    let request = schema.instance("Request", json!({"x": [15, 22, 30]})).unwrap();
    assert!(validate(&schema, &request));
    assert_eq!(roundtrip(&schema, &request), request);

    let empty = schema.instance("Request", json!({"x": []})).unwrap();
    assert!(!validate(&schema, &empty));
}

#[test]
fn test_attribute_independence() {
    let schema = define_schema(
        boo(),
        [xs::element(
            "Request",
            ComplexType::elements([ElementDecl::new("x", xs::INT)])
                .with_attribute(Attribute::new("a", xs::INT))
                .with_attribute(Attribute::new("b", xs::INT).optional()),
        )
        .into()],
    )
    .unwrap();

    let one = schema.instance("Request", json!({"x": 1, "a": 2, "b": 3})).unwrap();
    let other = schema.instance("Request", json!({"b": 3, "a": 2, "x": 1})).unwrap();
    assert_eq!(one, other);
    assert!(validate(&schema, &one));

    let without_optional = schema.instance("Request", json!({"x": 1, "a": 2})).unwrap();
    assert!(validate(&schema, &without_optional));
    assert_eq!(roundtrip(&schema, &without_optional), without_optional);
}

#[test]
fn test_named_simple_type_reference() {
    let schema = define_schema(
        boo(),
        [
            SimpleType::restriction(xs::STRING, ["en", "ru"])
                .unwrap()
                .named("Lang")
                .into(),
            xs::element("Request", xs::cts([xs::element("lang", "Lang")])).into(),
        ],
    )
    .unwrap();

    let ok = schema.instance("Request", json!({"lang": "ru"})).unwrap();
    assert!(validate(&schema, &ok));
    let bad = schema.instance("Request", json!({"lang": "de"})).unwrap();
    assert!(!validate(&schema, &bad));
}

#[test]
fn test_deserialize_mismatch() {
    let schema = define_schema(
        boo(),
        [xs::element("Request", xs::cts([xs::element("y", xs::INT)])).into()],
    )
    .unwrap();

    let err = schema
        .deserialize(r#"<boo:Request xmlns:boo="http://boo"/>"#)
        .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));

    let err = schema.deserialize("<boo:Request").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
}

// ============================================================================
// Depth Limits
// ============================================================================

fn linked_list_schema() -> Schema {
    define_schema(
        boo(),
        [
            xs::complex_type(
                "Node",
                [
                    xs::element("value", xs::INT).into(),
                    xs::element("next", "Node").min_occurs(0).into(),
                ],
            )
            .into(),
            xs::element("List", "Node").into(),
        ],
    )
    .unwrap()
}

/// A list with `levels` nested `next` nodes; its document depth is `levels + 2`
fn nested_list(levels: usize) -> JsonValue {
    let mut node = json!({"value": levels});
    for i in (0..levels).rev() {
        node = json!({"value": i, "next": node});
    }
    node
}

#[test]
fn test_recursive_document_at_depth_limit() {
    let schema = linked_list_schema();
    let limit = Limits::default().max_xml_depth;

    let list = schema.instance("List", nested_list(limit - 2)).unwrap();
    assert_eq!(list.depth(), limit);
    assert!(validate(&schema, &list));

    let xml = serialize(&list).unwrap();
    let obj = schema.deserialize(&xml).unwrap();
    assert_eq!(obj.depth(), limit);
    assert_eq!(obj, list);

    let err = schema.instance("List", nested_list(limit - 1)).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));
}

#[test]
fn test_deep_documents_are_refused() {
    let schema = linked_list_schema();
    let levels = 1000;

    let mut xml = String::from(r#"<boo:List xmlns:boo="http://boo">"#);
    xml.push_str(&"<boo:next>".repeat(levels));
    xml.push_str(&"</boo:next>".repeat(levels));
    xml.push_str("</boo:List>");
    let err = schema.deserialize(&xml).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));

    let next = QName::new(Some("http://boo"), "next");
    let value = Element::new(QName::new(Some("http://boo"), "value")).with_text("0");
    let mut element = Element::new(next.clone()).with_child(value);
    for _ in 0..levels {
        element = Element::new(next.clone()).with_child(element);
    }
    let root = Element::new(QName::new(Some("http://boo"), "List")).with_child(element);
    assert_eq!(root.depth(), levels + 3);
    let err = schema.decode_element(&root).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));

    let namespace = schema.namespace_arc().clone();
    let mut node = Instance::new(
        "next",
        namespace.clone(),
        Content::Complex {
            fields: IndexMap::new(),
            attributes: IndexMap::new(),
        },
    );
    for _ in 0..levels {
        let mut fields = IndexMap::new();
        fields.insert("next".to_string(), Field::One(node));
        node = Instance::new(
            "next",
            namespace.clone(),
            Content::Complex {
                fields,
                attributes: IndexMap::new(),
            },
        );
    }
    assert_eq!(node.depth(), levels + 1);
    assert!(!validate(&schema, &node));
    let err = serialize(&node).unwrap_err();
    assert!(matches!(err, Error::LimitExceeded(_)));
}
