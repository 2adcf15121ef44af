// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy job decoding
//!
//! The wire payload is duck-typed JSON; everything is validated here,
//! at the boundary, into a closed [`Job`] so the rest of the pipeline
//! never inspects raw JSON shapes.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{BodyKind, PlainCookieJar};

/// Timeout applied when the job does not name one
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// A validated proxy job: one HTTP request to execute on the
/// client's behalf
#[derive(Debug, Clone)]
pub struct Job {
    /// Client correlation id, echoed verbatim in the envelope
    pub id: Option<String>,
    /// HTTP method, `GET` when absent
    pub method: Method,
    /// Raw target URL as submitted
    pub url: String,
    /// Ordered header pairs; duplicates allowed
    pub headers: Vec<(String, String)>,
    /// Body string, interpreted per `body_kind`
    pub body: Option<String>,
    /// How the body is encoded before transmission
    pub body_kind: BodyKind,
    /// Cookie state travelling with the job
    pub cookies: Option<PlainCookieJar>,
    /// Upper bound on each network attempt
    pub timeout: Duration,
}

impl Job {
    /// Decode and validate a job payload
    pub fn decode(payload: Value) -> Result<Job> {
        let map = match payload {
            Value::Object(map) => map,
            _ => return Err(Error::payload("Proxy job must be a JSON object.")),
        };

        let url = match map.get("url") {
            None | Some(Value::Null) => return Err(Error::MissingUrl),
            Some(Value::String(s)) if s.is_empty() => return Err(Error::MissingUrl),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(Error::UrlNotString),
        };

        let id = match map.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(Error::payload("Job id should be a string.")),
        };

        let method = match map.get("method") {
            None | Some(Value::Null) => Method::GET,
            Some(Value::String(s)) => Method::from_bytes(s.to_ascii_uppercase().as_bytes())
                .map_err(|_| Error::payload(format!("Invalid HTTP method: '{}'.", s)))?,
            Some(_) => return Err(Error::payload("Method should be a string.")),
        };

        let headers = match map.get("headers") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => decode_header_pairs(items)?,
            Some(_) => {
                return Err(Error::payload(
                    "Headers must be a list of [name, value] pairs.",
                ))
            }
        };

        let body = match map.get("body") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(Error::payload("Body should be a string.")),
        };

        let body_kind = match map.get("bodyType") {
            None | Some(Value::Null) => BodyKind::parse(None, body.is_some())?,
            Some(Value::String(s)) => BodyKind::parse(Some(s), body.is_some())?,
            Some(_) => return Err(Error::payload("bodyType should be a string.")),
        };

        let cookies = match map.get("cookies") {
            None | Some(Value::Null) => None,
            Some(value @ Value::Object(_)) => Some(
                serde_json::from_value::<PlainCookieJar>(value.clone())
                    .map_err(|e| Error::payload(format!("Invalid cookies: {}.", e)))?,
            ),
            Some(_) => {
                return Err(Error::payload(
                    "Cookies must be a map of domain to path to cookie details.",
                ))
            }
        };

        let timeout = match map.get("timeout") {
            None | Some(Value::Null) => Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            Some(Value::Number(n)) => {
                let secs = n.as_f64().unwrap_or(f64::NAN);
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(Error::payload(
                        "Timeout must be a positive number of seconds.",
                    ));
                }
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    Error::payload("Timeout must be a positive number of seconds.")
                })?
            }
            Some(_) => return Err(Error::payload("Timeout must be a number of seconds.")),
        };

        Ok(Job {
            id,
            method,
            url,
            headers,
            body,
            body_kind,
            cookies,
            timeout,
        })
    }
}

fn decode_header_pairs(items: &[Value]) -> Result<Vec<(String, String)>> {
    let malformed = || Error::payload("Headers must be a list of [name, value] pairs.");

    let mut pairs = Vec::with_capacity(items.len());
    for item in items {
        let pair = item.as_array().filter(|p| p.len() == 2).ok_or_else(malformed)?;
        let name = pair[0].as_str().ok_or_else(malformed)?;
        let value = pair[1].as_str().ok_or_else(malformed)?;
        pairs.push((name.to_string(), value.to_string()));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let job = Job::decode(json!({"url": "http://example.test/"})).unwrap();
        assert_eq!(job.method, Method::GET);
        assert_eq!(job.timeout, Duration::from_secs(10));
        assert_eq!(job.body_kind, BodyKind::None);
        assert!(job.id.is_none());
        assert!(job.headers.is_empty());
        assert!(job.cookies.is_none());
    }

    #[test]
    fn test_missing_url() {
        for payload in [json!({}), json!({"url": null}), json!({"url": ""})] {
            let err = Job::decode(payload).unwrap_err();
            assert!(matches!(err, Error::MissingUrl));
        }
    }

    #[test]
    fn test_url_must_be_a_string() {
        let err = Job::decode(json!({"url": 42})).unwrap_err();
        assert!(matches!(err, Error::UrlNotString));
        assert_eq!(err.to_string(), "URL should be a string.");
    }

    #[test]
    fn test_header_pairs() {
        let job = Job::decode(json!({
            "url": "http://example.test/",
            "headers": [["x-one", "1"], ["x-one", "2"]],
        }))
        .unwrap();
        assert_eq!(
            job.headers,
            vec![
                ("x-one".to_string(), "1".to_string()),
                ("x-one".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_headers_rejected() {
        for headers in [
            json!({"x-one": "1"}),
            json!([["only-name"]]),
            json!([["name", "value", "extra"]]),
            json!([["name", 7]]),
            json!("not-a-list"),
        ] {
            let err = Job::decode(json!({"url": "http://example.test/", "headers": headers}))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidPayload(_)), "{:?}", headers);
        }
    }

    #[test]
    fn test_body_type_inference() {
        let job = Job::decode(json!({"url": "http://example.test/", "body": "x"})).unwrap();
        assert_eq!(job.body_kind, BodyKind::Default);

        let job = Job::decode(json!({
            "url": "http://example.test/",
            "body": "{}",
            "bodyType": "multipart/form-data",
        }))
        .unwrap();
        assert_eq!(job.body_kind, BodyKind::Multipart);

        let err = Job::decode(json!({
            "url": "http://example.test/",
            "bodyType": "smoke-signals",
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }

    #[test]
    fn test_method_is_normalized() {
        let job = Job::decode(json!({"url": "http://example.test/", "method": "post"})).unwrap();
        assert_eq!(job.method, Method::POST);
    }

    #[test]
    fn test_cookies_decode() {
        let job = Job::decode(json!({
            "url": "http://example.test/",
            "cookies": {
                "example.test": {"/": {"n": {"value": "v", "expires": null, "secure": null}}},
            },
        }))
        .unwrap();
        let jar = job.cookies.unwrap();
        assert_eq!(jar["example.test"]["/"]["n"].value, "v");
    }

    #[test]
    fn test_timeout_validation() {
        let job =
            Job::decode(json!({"url": "http://example.test/", "timeout": 2.5})).unwrap();
        assert_eq!(job.timeout, Duration::from_millis(2500));

        for timeout in [json!(0), json!(-3), json!("soon")] {
            let err = Job::decode(json!({"url": "http://example.test/", "timeout": timeout}))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidPayload(_)));
        }
    }

    #[test]
    fn test_id_round_trip_type() {
        let job = Job::decode(json!({"url": "http://example.test/", "id": "job-7"})).unwrap();
        assert_eq!(job.id.as_deref(), Some("job-7"));

        let err = Job::decode(json!({"url": "http://example.test/", "id": 7})).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }
}
