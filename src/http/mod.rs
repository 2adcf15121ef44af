// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for the Mustekala proxy
//!
//! Provides the per-job client with manual redirect handling, the
//! cookie jar with its JSON-safe wire form, and the body codec.

pub mod body;
pub mod client;
pub mod cookie;

pub use body::{decode_response_body, encode_outbound, BodyKind, OutboundBody};
pub use client::{Exchange, Hop, ProxyClient, SentRequest};
pub use cookie::{Cookie, CookieJar, PlainCookie, PlainCookieJar};

use reqwest::header::HeaderMap;

/// User agent identifying proxied requests
pub const DEFAULT_PROXY_USER_AGENT: &str = "Mustekala proxy at bountyy.fi";

/// Flatten a header map into ordered (name, value) pairs
///
/// Duplicate names are kept, one pair per value. Non-UTF-8 header
/// values are replaced lossily, the wire envelope is JSON.
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_header_pairs_keep_duplicates_in_order() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.append("content-type", HeaderValue::from_static("text/plain"));

        let pairs = header_pairs(&headers);
        assert_eq!(
            pairs,
            vec![
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
                ("content-type".to_string(), "text/plain".to_string()),
            ]
        );
    }
}
