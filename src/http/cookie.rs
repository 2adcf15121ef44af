// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar with a JSON-safe wire form
//!
//! The proxy holds no session state. Cookie state travels with each job
//! as a plain nested map (domain -> path -> name -> details), gets
//! hydrated into a per-job jar for the outbound request, and is handed
//! back to the client in the same plain form after execution.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// JSON-safe cookie jar: domain -> path -> cookie name -> details
///
/// Domains are URL authorities, so `localhost:3043` and `localhost`
/// are distinct keys.
pub type PlainCookieJar = BTreeMap<String, BTreeMap<String, BTreeMap<String, PlainCookie>>>;

/// Wire form of a single cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainCookie {
    #[serde(default)]
    pub value: String,
    /// Expiry as epoch seconds. Absent, `null` and `0` all mean a
    /// session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub secure: bool,
}

fn nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A single HTTP cookie
#[derive(Debug, Clone)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Authority the cookie belongs to (`host` or `host:port`)
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        if !self.domain_matches(url) {
            return false;
        }

        if !url.path().starts_with(&self.path) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, url: &Url) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let host = url.host_str().unwrap_or("");
        if self.domain == authority_of(url) || self.domain == host {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value
    ///
    /// Attributes the wire form cannot carry (HttpOnly, SameSite) are
    /// ignored. An unparseable header yields None.
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        if name.trim().is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name.trim(), value.trim());

        // Default domain to the request authority
        cookie.domain = authority_of(url);

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" => {
                        if !val.is_empty() {
                            cookie.domain = val.trim_start_matches('.').to_lowercase();
                        }
                    }
                    "path" => cookie.path = val.to_string(),
                    "expires" => {
                        if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(dt.with_timezone(&Utc));
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = if secs <= 0 {
                                DateTime::<Utc>::from_timestamp(0, 0)
                            } else {
                                Some(Utc::now() + chrono::Duration::seconds(secs))
                            };
                        }
                    }
                    _ => {}
                }
            } else if part.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            }
        }

        Some(cookie)
    }

    /// Convert to `Cookie` header fragment
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Authority of a URL: `host` or `host:port` when a port is present
pub fn authority_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Thread-safe per-job cookie storage
#[derive(Debug, Clone)]
pub struct CookieJar {
    /// Cookies stored by authority
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Build a jar from the wire form supplied with a job
    pub fn hydrate(plain: &PlainCookieJar) -> Self {
        let jar = Self::new();
        for (domain, by_path) in plain {
            for (path, by_name) in by_path {
                for (name, details) in by_name {
                    let mut cookie = Cookie::new(name.clone(), details.value.clone())
                        .domain(domain.clone())
                        .path(path.clone())
                        .secure(details.secure);
                    // 0 is a session-cookie sentinel, same as absent
                    cookie.expires = details
                        .expires
                        .filter(|e| *e != 0)
                        .and_then(|e| DateTime::<Utc>::from_timestamp(e, 0));
                    jar.add(cookie);
                }
            }
        }
        jar
    }

    /// Add a cookie, replacing any previous one with the same
    /// domain, path and name
    ///
    /// A cookie with an empty value or a past expiry is a deletion: the
    /// stored cookie is removed and nothing is inserted, which is how
    /// clients learn the target cleared it.
    pub fn add(&self, cookie: Cookie) {
        let mut slot = self.cookies.entry(cookie.domain.clone()).or_default();
        slot.retain(|c| c.name != cookie.name || c.path != cookie.path);
        if !cookie.value.is_empty() && !cookie.is_expired() {
            slot.push(cookie);
        }
    }

    /// Add a cookie from a Set-Cookie header received from `url`
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Get all cookies that should be sent to a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        let mut result = Vec::new();
        for entry in self.cookies.iter() {
            for cookie in entry.value().iter() {
                if cookie.matches(url) {
                    result.push(cookie.clone());
                }
            }
        }
        result
    }

    /// Get the Cookie header value for a URL
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Export the jar back to the wire form
    ///
    /// Cookies that expired during the exchange are dropped, so the
    /// output jar only ever carries live cookies.
    pub fn dehydrate(&self) -> PlainCookieJar {
        let mut plain = PlainCookieJar::new();

        for entry in self.cookies.iter() {
            for cookie in entry.value().iter() {
                if cookie.value.is_empty() || cookie.is_expired() {
                    continue;
                }

                plain
                    .entry(cookie.domain.clone())
                    .or_default()
                    .entry(cookie.path.clone())
                    .or_default()
                    .insert(
                        cookie.name.clone(),
                        PlainCookie {
                            value: cookie.value.clone(),
                            expires: cookie.expires.map(|e| e.timestamp()),
                            secure: cookie.secure,
                        },
                    );
            }
        }

        plain
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if the jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
