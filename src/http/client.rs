// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-job HTTP execution
//!
//! Each proxy job gets a fresh client: no connection, cookie or auth
//! state crosses job boundaries. Redirects are followed manually so
//! every hop is recorded and the job's cookie jar is consulted and
//! updated between hops, the way a browser would.

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, REFERER,
    SET_COOKIE, USER_AGENT,
};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use super::body::{to_multipart_form, OutboundBody};
use super::cookie::CookieJar;
use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::proxy::HostPolicy;

/// One request/response pair in an exchange
#[derive(Debug, Clone)]
pub struct Hop {
    /// URL this hop targeted
    pub url: Url,
    /// Response status
    pub status: StatusCode,
    /// Response headers as received
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
    /// The request actually sent for this hop
    pub request: SentRequest,
}

/// The request as it went out on the wire
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: Url,
    pub method: Method,
    pub headers: Vec<(String, String)>,
}

/// A completed exchange: the terminal hop plus any redirects before it
#[derive(Debug)]
pub struct Exchange {
    hops: Vec<Hop>,
}

impl Exchange {
    /// Wrap recorded hops; the last hop is the terminal response
    ///
    /// Panics on an empty hop list, an exchange always has at least
    /// the initial response.
    pub fn from_hops(hops: Vec<Hop>) -> Self {
        assert!(!hops.is_empty(), "exchange needs at least one hop");
        Self { hops }
    }

    /// The final, non-redirect response (or the last response when the
    /// redirect cap was reached)
    pub fn terminal(&self) -> &Hop {
        self.hops.last().expect("exchange has at least one hop")
    }

    /// Redirect hops preceding the terminal response, oldest first
    pub fn history(&self) -> &[Hop] {
        &self.hops[..self.hops.len() - 1]
    }
}

/// HTTP client scoped to a single proxy job
pub struct ProxyClient {
    client: Client,
    user_agent: String,
    max_redirects: usize,
}

impl ProxyClient {
    /// Build a fresh client for one job
    ///
    /// TLS certificate verification follows the config; it is off by
    /// default because the proxied targets are routinely local test
    /// servers with self-signed certificates.
    pub fn for_job(config: &ProxyConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
        })
    }

    /// Execute a job request, following redirects
    ///
    /// The policy gate is re-checked at every hop so a permitted host
    /// cannot bounce the proxy into a denied one. Hitting the redirect
    /// cap ends the chain with the last response as terminal; it is not
    /// an error.
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        job_headers: &[(String, String)],
        body: &OutboundBody,
        jar: &CookieJar,
        policy: &HostPolicy,
    ) -> Result<Exchange> {
        let original_url = url.to_string();

        let mut hops: Vec<Hop> = Vec::new();
        let mut current_url = url;
        let mut current_method = method;
        let mut send_body = !body.is_none();
        let mut referer: Option<Url> = None;

        loop {
            let headers = self.build_headers(
                job_headers,
                &current_url,
                jar,
                referer.as_ref(),
                body,
                send_body,
            )?;

            let mut builder = self
                .client
                .request(current_method.clone(), current_url.clone())
                .headers(headers);

            if send_body {
                builder = match body {
                    OutboundBody::None => builder,
                    OutboundBody::Raw(bytes) => builder.body(bytes.clone()),
                    OutboundBody::Multipart(fields) => builder.multipart(to_multipart_form(fields)?),
                };
            }

            let request = builder.build()?;
            let sent = SentRequest {
                url: current_url.clone(),
                method: request.method().clone(),
                headers: super::header_pairs(request.headers()),
            };

            let response = self
                .client
                .execute(request)
                .await
                .map_err(|e| classify_send_error(e, &original_url))?;

            let status = response.status();
            let response_headers = response.headers().clone();

            for set_cookie in response_headers.get_all(SET_COOKIE) {
                if let Ok(header) = set_cookie.to_str() {
                    jar.add_from_header(header, &current_url);
                }
            }

            let body_bytes = response.bytes().await?;

            hops.push(Hop {
                url: current_url.clone(),
                status,
                headers: response_headers,
                body: body_bytes,
                request: sent,
            });

            let hop = hops.last().expect("hop just pushed");
            let location = match redirect_target(hop) {
                Some(location) if hops.len() <= self.max_redirects => location,
                _ => break,
            };

            let next_url = current_url.join(location)?;
            policy.check(next_url.as_str())?;

            // 301/302/303 refetch as GET without the body; 307/308
            // preserve method and body.
            if matches!(status.as_u16(), 301 | 302 | 303)
                && current_method != Method::GET
                && current_method != Method::HEAD
            {
                current_method = Method::GET;
                send_body = false;
            }

            referer = Some(current_url.clone());
            current_url = next_url;

            tracing::debug!(status = status.as_u16(), url = %current_url, "following redirect");
        }

        Ok(Exchange { hops })
    }

    /// Assemble the outgoing header map for one hop
    ///
    /// Job headers are applied verbatim (order and duplicates kept),
    /// then the identifying User-Agent, the jar's Cookie header and the
    /// redirect Referer fill in around them. Hop-managed headers the
    /// client must compute itself are dropped.
    fn build_headers(
        &self,
        job_headers: &[(String, String)],
        url: &Url,
        jar: &CookieJar,
        referer: Option<&Url>,
        body: &OutboundBody,
        send_body: bool,
    ) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        for (name, value) in job_headers {
            let name = name
                .parse::<HeaderName>()
                .map_err(|_| Error::payload(format!("Invalid header name: '{}'.", name)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::payload(format!("Invalid value for header '{}'.", name)))?;
            headers.append(name, value);
        }

        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        }

        // The client computes these per attempt
        headers.remove(CONTENT_LENGTH);
        if matches!(body, OutboundBody::Multipart(_)) || !send_body {
            headers.remove(CONTENT_TYPE);
        }

        if let Some(cookie_header) = jar.cookie_header(url) {
            headers.insert(COOKIE, HeaderValue::from_str(&cookie_header)?);
        }

        if let Some(previous) = referer {
            // No Referer across an https -> http downgrade
            if !(previous.scheme() == "https" && url.scheme() == "http") {
                headers.insert(REFERER, HeaderValue::from_str(referer_value(previous))?);
            }
        }

        Ok(headers)
    }
}

fn redirect_target(hop: &Hop) -> Option<&str> {
    if !hop.status.is_redirection() {
        return None;
    }
    hop.headers.get(LOCATION)?.to_str().ok()
}

fn referer_value(url: &Url) -> &str {
    // Fragments never leave the client, and these URLs carry none;
    // send the hop URL as-is.
    url.as_str()
}

fn classify_send_error(error: reqwest::Error, url: &str) -> Error {
    if error.is_connect() {
        return Error::unreachable(url);
    }
    Error::Http(error)
}
