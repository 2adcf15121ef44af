// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Stateless HTTP Proxy Job Executor
//!
//! The network arm of a browser-based API client: accepts a JSON
//! description of an HTTP request, executes it against the declared
//! target, and returns a JSON-safe rendering of what happened -
//! status, headers, redirect history, cookies and body included.
//!
//! ## Features
//!
//! - Stateless: cookie state travels with each job as a plain JSON
//!   jar; no server-side sessions, scale horizontally at will
//! - Full redirect chains: every hop recorded with the request that
//!   produced it
//! - Cookie round-trips: targets can set, update and clear cookies
//!   and the client sees it in the returned jar
//! - Binary-safe bodies: text decoded by charset, everything else
//!   base64
//! - Multipart uploads described as JSON, files carried as base64
//! - Host deny-list: keeps the proxy from relaying into loopback,
//!   internal services, or itself
//!
//! ## Example
//!
//! ```rust,no_run
//! use mustekala::{execute_job, HostPolicy, Job, ProxyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProxyConfig::default();
//!     let policy = HostPolicy::from_config(&config);
//!
//!     let job = Job::decode(serde_json::json!({
//!         "method": "GET",
//!         "url": "http://example.test/get?one=two",
//!     }))?;
//!
//!     let envelope = execute_job(&config, &policy, job).await?;
//!     println!("{}", envelope.response.status);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod proxy;
pub mod server;

// Re-exports for convenience

// Configuration
pub use config::ProxyConfig;

// Errors
pub use error::{Error, Result};

// HTTP layer
pub use http::{BodyKind, Cookie, CookieJar, Exchange, Hop, PlainCookie, PlainCookieJar, ProxyClient};

// Proxy pipeline
pub use proxy::{
    execute_job, ErrorEnvelope, HostPolicy, Job, RequestRecord, ResponseEnvelope, ResponseRecord,
};

// Server
pub use server::{router, serve, AppState};

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
