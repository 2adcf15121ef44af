// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Body codec for proxied exchanges
//!
//! Outbound: turns the job's declared body into the bytes or multipart
//! parts actually sent. Inbound: turns raw response bytes into a
//! JSON-safe string, decoding text by charset and base64-encoding
//! everything else.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::{Error, Result};

/// Media types decoded as text besides `text/*`
const TEXT_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "application/x-www-form-urlencoded",
    "image/svg+xml",
];

/// How a job's body is encoded before transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// No body is sent
    #[default]
    None,
    /// Raw UTF-8 bytes of the body string
    Default,
    /// Body string is a JSON object describing multipart fields
    Multipart,
}

impl BodyKind {
    /// Resolve the declared `bodyType` label
    ///
    /// An absent label falls back to `default` when a body is present.
    /// `raw` is a legacy alias for `default`. Anything else is rejected
    /// at the boundary.
    pub fn parse(label: Option<&str>, has_body: bool) -> Result<Self> {
        match label {
            None => Ok(if has_body { BodyKind::Default } else { BodyKind::None }),
            Some("none") => Ok(BodyKind::None),
            Some("default") | Some("raw") => Ok(BodyKind::Default),
            Some("multipart/form-data") => Ok(BodyKind::Multipart),
            Some(other) => Err(Error::payload(format!(
                "Unknown bodyType: '{}'.",
                other
            ))),
        }
    }
}

/// Encoded outbound body, ready for the executor
#[derive(Debug, Clone)]
pub enum OutboundBody {
    /// Nothing is sent
    None,
    /// Raw bytes, sent as-is
    Raw(Bytes),
    /// Multipart fields; the client computes its own boundary
    Multipart(Vec<MultipartField>),
}

impl OutboundBody {
    /// Whether this body can be resent on a method-preserving redirect
    pub fn is_none(&self) -> bool {
        matches!(self, OutboundBody::None)
    }
}

/// One field of a multipart body
#[derive(Debug, Clone)]
pub struct MultipartField {
    pub name: String,
    pub value: FieldValue,
}

/// Value of a multipart field
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        data: Bytes,
    },
}

/// Encode the job body per its declared kind
pub fn encode_outbound(body: Option<&str>, kind: BodyKind) -> Result<OutboundBody> {
    match kind {
        BodyKind::None => Ok(OutboundBody::None),
        BodyKind::Default => Ok(match body {
            None => OutboundBody::None,
            Some(text) => OutboundBody::Raw(Bytes::from(text.as_bytes().to_vec())),
        }),
        BodyKind::Multipart => {
            let fields = parse_multipart_fields(body.unwrap_or("{}"))?;
            Ok(OutboundBody::Multipart(fields))
        }
    }
}

/// Parse the multipart body description: a flat JSON object whose
/// values are scalars, or `{name, body: base64, type}` file objects
fn parse_multipart_fields(body: &str) -> Result<Vec<MultipartField>> {
    let parsed: serde_json::Map<String, Value> = serde_json::from_str(body)
        .map_err(|e| Error::payload(format!("Invalid multipart body: {}.", e)))?;

    let mut fields = Vec::with_capacity(parsed.len());
    for (name, value) in parsed {
        let value = match value {
            Value::Object(file) => file_field(&name, &file)?,
            Value::String(text) => FieldValue::Text(text),
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Null => FieldValue::Text("null".to_string()),
            Value::Number(n) => FieldValue::Text(n.to_string()),
            Value::Array(_) => {
                return Err(Error::payload(format!(
                    "Unsupported value for multipart field '{}'.",
                    name
                )))
            }
        };
        fields.push(MultipartField { name, value });
    }

    Ok(fields)
}

fn file_field(name: &str, file: &serde_json::Map<String, Value>) -> Result<FieldValue> {
    let get = |key: &str| {
        file.get(key).and_then(Value::as_str).ok_or_else(|| {
            Error::payload(format!(
                "Multipart file field '{}' is missing a string '{}'.",
                name, key
            ))
        })
    };

    let data = BASE64
        .decode(get("body")?)
        .map_err(|_| Error::payload(format!("Invalid base64 body in file field '{}'.", name)))?;

    Ok(FieldValue::File {
        file_name: get("name")?.to_string(),
        content_type: get("type")?.to_string(),
        data: Bytes::from(data),
    })
}

/// Build a reqwest multipart form from encoded fields
///
/// Rebuilt per attempt: the form is consumed on send and the boundary
/// must be fresh each time.
pub fn to_multipart_form(fields: &[MultipartField]) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        form = match &field.value {
            FieldValue::Text(text) => form.text(field.name.clone(), text.clone()),
            FieldValue::File {
                file_name,
                content_type,
                data,
            } => {
                let part = Part::bytes(data.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(content_type)
                    .map_err(|_| {
                        Error::payload(format!(
                            "Invalid content type '{}' in file field '{}'.",
                            content_type, field.name
                        ))
                    })?;
                form.part(field.name.clone(), part)
            }
        };
    }
    Ok(form)
}

/// Decode a response body into its JSON-safe form
///
/// Returns None for bodies the upstream declared empty, a decoded
/// string for textual media types, and a base64 string for binary.
pub fn decode_response_body(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    if header_str(headers, "content-length") == Some("0") {
        return None;
    }

    let content_type = header_str(headers, "content-type")?;

    let mut parts = content_type.split(';').map(str::trim);
    let media_type = parts.next().unwrap_or("").to_ascii_lowercase();

    if media_type.starts_with("text/") || TEXT_CONTENT_TYPES.contains(&media_type.as_str()) {
        let charset = parts
            .find_map(|arg| arg.strip_prefix("charset="))
            .map(|c| c.trim_matches('"'))
            .unwrap_or("UTF-8");

        let encoding =
            encoding_rs::Encoding::for_label(charset.as_bytes()).unwrap_or(encoding_rs::UTF_8);
        let (text, _, _) = encoding.decode(body);
        return Some(text.into_owned());
    }

    Some(BASE64.encode(body))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                name.parse::<HeaderName>().unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_body_kind_inference() {
        assert_eq!(BodyKind::parse(None, false).unwrap(), BodyKind::None);
        assert_eq!(BodyKind::parse(None, true).unwrap(), BodyKind::Default);
        assert_eq!(BodyKind::parse(Some("raw"), true).unwrap(), BodyKind::Default);
        assert_eq!(
            BodyKind::parse(Some("multipart/form-data"), true).unwrap(),
            BodyKind::Multipart
        );
        assert!(BodyKind::parse(Some("carrier-pigeon"), true).is_err());
    }

    #[test]
    fn test_raw_body_is_utf8_bytes() {
        let body = encode_outbound(Some("héllo"), BodyKind::Default).unwrap();
        match body {
            OutboundBody::Raw(bytes) => assert_eq!(&bytes[..], "héllo".as_bytes()),
            other => panic!("expected raw body, got {:?}", other),
        }
    }

    #[test]
    fn test_multipart_scalars() {
        let body = r#"{"name":"Sherlock","smart":true,"nemesis":null,"age":60}"#;
        let fields = parse_multipart_fields(body).unwrap();
        let by_name: std::collections::HashMap<_, _> = fields
            .iter()
            .map(|f| {
                let text = match &f.value {
                    FieldValue::Text(t) => t.clone(),
                    _ => panic!("expected text field"),
                };
                (f.name.as_str(), text)
            })
            .collect();

        assert_eq!(by_name["name"], "Sherlock");
        assert_eq!(by_name["smart"], "true");
        assert_eq!(by_name["nemesis"], "null");
        assert_eq!(by_name["age"], "60");
    }

    #[test]
    fn test_multipart_file_field_decodes_base64() {
        let body = r#"{"file":{"name":"content.txt","type":"text/plain","body":"c29tZSB0ZXh0IGNvbnRlbnQgaGVyZQ=="}}"#;
        let fields = parse_multipart_fields(body).unwrap();
        assert_eq!(fields.len(), 1);
        match &fields[0].value {
            FieldValue::File {
                file_name,
                content_type,
                data,
            } => {
                assert_eq!(file_name, "content.txt");
                assert_eq!(content_type, "text/plain");
                assert_eq!(&data[..], b"some text content here");
            }
            other => panic!("expected file field, got {:?}", other),
        }
    }

    #[test]
    fn test_multipart_bad_base64_rejected() {
        let body = r#"{"file":{"name":"a","type":"text/plain","body":"%%%"}}"#;
        let err = parse_multipart_fields(body).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_multipart_form_builds_with_boundary() {
        let fields = parse_multipart_fields(r#"{"name":"Sherlock"}"#).unwrap();
        let form = to_multipart_form(&fields).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_decode_declared_empty() {
        let h = headers(&[("content-length", "0"), ("content-type", "text/plain")]);
        assert_eq!(decode_response_body(&h, b""), None);
    }

    #[test]
    fn test_decode_without_content_type() {
        let h = headers(&[("content-length", "5")]);
        assert_eq!(decode_response_body(&h, b"hello"), None);
    }

    #[test]
    fn test_decode_text_plain_utf8() {
        let h = headers(&[("content-type", "text/plain; charset=utf-8")]);
        assert_eq!(
            decode_response_body(&h, b"hello"),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_decode_latin1_charset() {
        let h = headers(&[("content-type", "text/plain; charset=iso-8859-1")]);
        assert_eq!(
            decode_response_body(&h, &[0x68, 0xe9]),
            Some("h\u{e9}".to_string())
        );
    }

    #[test]
    fn test_decode_json_is_text() {
        let h = headers(&[("content-type", "application/json")]);
        assert_eq!(
            decode_response_body(&h, br#"{"a":1}"#),
            Some(r#"{"a":1}"#.to_string())
        );
    }

    #[test]
    fn test_decode_binary_is_base64() {
        let h = headers(&[("content-type", "application/octet-stream")]);
        let encoded = decode_response_body(&h, &[0x00, 0x01]).unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), vec![0x00, 0x01]);
    }
}
