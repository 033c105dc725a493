//! SOAP envelope integration tests

use pretty_assertions::assert_eq;
use serde_json::json;

use xsdecl::validators::XsdValue;
use xsdecl::{define_schema, serialize, soap, validate, xs, Error, Namespace, Value};

const ENVELOPE: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:boo="http://boo">"#,
    "<soap:Header><boo:Token>abc</boo:Token></soap:Header>",
    "<soap:Body>",
    "<boo:AddRequest><boo:x>1</boo:x><boo:y>2</boo:y></boo:AddRequest>",
    "</soap:Body>",
    "</soap:Envelope>"
);

#[test]
fn test_parse_envelope() {
    let envelope = soap::parse(ENVELOPE).unwrap();
    assert!(validate(soap::schema(), &envelope));

    let header = envelope.child("Header").unwrap();
    assert_eq!(header.wildcard("any")[0].local_name(), "Token");

    let body = envelope.child("Body").unwrap();
    let payload = &body.wildcard("any")[0];
    assert_eq!(payload.namespace(), Some("http://boo"));
    assert_eq!(payload.local_name(), "AddRequest");
}

#[test]
fn test_payload_decodes_with_service_schema() {
    let service = define_schema(
        Namespace::new("http://boo", "boo"),
        [xs::element(
            "AddRequest",
            xs::cts([xs::element("x", xs::INT), xs::element("y", xs::INT)]),
        )
        .into()],
    )
    .unwrap();

    let envelope = soap::parse(ENVELOPE).unwrap();
    let payload = &envelope.child("Body").unwrap().wildcard("any")[0];
    let request = service.decode_element(payload).unwrap();

    assert!(service.is_valid(&request));
    assert_eq!(request.child("y").unwrap().value(), Some(&XsdValue::Int(2)));
}

#[test]
fn test_envelope_roundtrip() {
    let service = define_schema(
        Namespace::new("http://boo", "boo"),
        [xs::element("AddResponse", xs::INT).into()],
    )
    .unwrap();
    let response = service.instance("AddResponse", 3).unwrap();

    let envelope = soap::envelope(response).unwrap();
    assert!(validate(soap::schema(), &envelope));

    let xml = serialize(&envelope).unwrap();
    assert_eq!(
        xml,
        concat!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:boo="http://boo">"#,
            "<soap:Body><boo:AddResponse>3</boo:AddResponse></soap:Body>",
            "</soap:Envelope>"
        )
    );
    assert_eq!(soap::parse(&xml).unwrap(), envelope);
}

#[test]
fn test_default_namespace_payload_roundtrip() {
    let envelope = soap::parse(concat!(
        r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
        r#"<soap:Body><AddResponse xmlns="http://boo">3</AddResponse></soap:Body>"#,
        "</soap:Envelope>"
    ))
    .unwrap();
    assert!(validate(soap::schema(), &envelope));

    let payload = &envelope.child("Body").unwrap().wildcard("any")[0];
    assert_eq!(payload.prefix, None);
    assert_eq!(payload.namespace(), Some("http://boo"));

    let xml = serialize(&envelope).unwrap();
    let reparsed = soap::parse(&xml).unwrap();
    let rewritten = &reparsed.child("Body").unwrap().wildcard("any")[0];
    assert!(rewritten.prefix.is_some());
    assert_eq!(reparsed, envelope);
}

#[test]
fn test_envelope_with_header() {
    let service = define_schema(
        Namespace::new("http://boo", "boo"),
        [
            xs::element("Token", xs::STRING).into(),
            xs::element("Ping", xs::cts([xs::optional("note", xs::STRING)])).into(),
        ],
    )
    .unwrap();

    let token = service.instance("Token", "abc").unwrap();
    let ping = service.instance("Ping", json!({})).unwrap();
    let envelope = soap::envelope_with_header(token, vec![ping.clone(), ping]).unwrap();
    assert!(soap::schema().is_valid(&envelope));
    assert_eq!(envelope.child("Body").unwrap().wildcard("any").len(), 2);

    let xml = serialize(&envelope).unwrap();
    assert_eq!(soap::parse(&xml).unwrap(), envelope);
}

#[test]
fn test_fault_in_body() {
    let fault = soap::fault("soap:Server", "division by zero").unwrap();
    let envelope = soap::envelope(fault).unwrap();
    let xml = serialize(&envelope).unwrap();

    let parsed = soap::parse(&xml).unwrap();
    let element = &parsed.child("Body").unwrap().wildcard("any")[0];
    let fault = soap::schema().decode_element(element).unwrap();
    assert!(soap::schema().is_valid(&fault));
    assert_eq!(
        fault.child("faultstring").unwrap().value(),
        Some(&XsdValue::String("division by zero".into()))
    );
}

#[test]
fn test_body_rejects_scalars() {
    let err = soap::envelope(Value::from("text")).unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
}

#[test]
fn test_foreign_root_is_rejected() {
    let err = soap::parse(r#"<Envelope><Body/></Envelope>"#).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));
}
