// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JSON envelopes returned to the proxy client

use serde::Serialize;

use super::job::Job;
use crate::error::Error;
use crate::http::{decode_response_body, header_pairs, Exchange, Hop, PlainCookieJar};

/// Successful proxy result: the terminal response, the redirect
/// history that led to it, and the cookie jar as it stands after
/// the exchange
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    /// The job's correlation id, `null` when the job carried none
    pub id: Option<String>,
    pub response: ResponseRecord,
    pub history: Vec<ResponseRecord>,
    pub cookies: PlainCookieJar,
}

/// One realised response, paired with the request that produced it
#[derive(Debug, Serialize)]
pub struct ResponseRecord {
    pub url: String,
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub request: RequestRecord,
}

/// The request as sent, echoed back for display
#[derive(Debug, Serialize)]
pub struct RequestRecord {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Failure envelope for classified and internal errors alike
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorEnvelope {
    /// Build the wire form of an error
    ///
    /// Classified errors carry their full message; internal faults are
    /// reduced to a fixed line unless the deployment opts into detail.
    pub fn from_error(error: &Error, expose_internal: bool) -> Self {
        let message = if error.is_client_error() || expose_internal {
            error.to_string()
        } else {
            "Internal proxy error.".to_string()
        };

        Self {
            error: ErrorBody {
                message,
                code: error.code().map(str::to_string),
            },
        }
    }
}

/// Assemble the success envelope for a completed exchange
///
/// Only the terminal record echoes the job's request body; history
/// records carry `body: null`.
pub fn encode_envelope(job: &Job, exchange: &Exchange, cookies: PlainCookieJar) -> ResponseEnvelope {
    ResponseEnvelope {
        id: job.id.clone(),
        response: record(exchange.terminal(), job.body.as_deref()),
        history: exchange
            .history()
            .iter()
            .map(|hop| record(hop, None))
            .collect(),
        cookies,
    }
}

fn record(hop: &Hop, request_body: Option<&str>) -> ResponseRecord {
    ResponseRecord {
        url: hop.url.to_string(),
        status: hop.status.as_u16(),
        status_text: hop.status.canonical_reason().unwrap_or("").to_string(),
        headers: header_pairs(&hop.headers),
        body: decode_response_body(&hop.headers, &hop.body),
        request: RequestRecord {
            url: hop.request.url.to_string(),
            method: hop.request.method.to_string(),
            headers: hop.request.headers.clone(),
            body: request_body.map(str::to_string),
        },
    }
}
