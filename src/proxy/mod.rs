// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy job pipeline
//!
//! One linear pass per job: decode, gate the target host, hydrate the
//! cookie jar, encode the body, execute, then encode the envelope.
//! Jobs share nothing; the whole of a job's state is in its arguments
//! and its envelope.

pub mod envelope;
pub mod job;
pub mod policy;

pub use envelope::{
    encode_envelope, ErrorEnvelope, RequestRecord, ResponseEnvelope, ResponseRecord,
};
pub use job::Job;
pub use policy::HostPolicy;

use url::Url;

use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::http::{encode_outbound, CookieJar, ProxyClient};

/// Execute one validated job and build its envelope
///
/// The policy gate runs before any network I/O. A classified failure
/// anywhere in the pipeline surfaces as an error for the server layer
/// to wrap; there is no partial success.
pub async fn execute_job(
    config: &ProxyConfig,
    policy: &HostPolicy,
    job: Job,
) -> Result<ResponseEnvelope> {
    policy.check(&job.url)?;

    // Path only; query strings may carry secrets.
    tracing::info!(
        method = %job.method,
        url = job.url.split('?').next().unwrap_or(""),
        "proxying"
    );

    let url = match Url::parse(&job.url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Err(Error::malformed_url(job.url.as_str()))
        }
        Err(e) => return Err(e.into()),
    };

    let jar = match &job.cookies {
        Some(plain) => CookieJar::hydrate(plain),
        None => CookieJar::new(),
    };

    let body = encode_outbound(job.body.as_deref(), job.body_kind)?;

    let client = ProxyClient::for_job(config, job.timeout)?;
    let exchange = client
        .execute(job.method.clone(), url, &job.headers, &body, &jar, policy)
        .await?;

    Ok(encode_envelope(&job, &exchange, jar.dehydrate()))
}
