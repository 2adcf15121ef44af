// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proxy service configuration

use std::collections::HashSet;
use std::env;
use std::net::SocketAddr;

use crate::error::{Error, Result};
use crate::http::DEFAULT_PROXY_USER_AGENT;

/// Default hosts the proxy refuses to target
pub const DEFAULT_DISALLOW_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Where `GET` requests on the proxy route are sent
pub const DEFAULT_DOCS_URL: &str = "https://bountyy.fi/docs/mustekala/";

/// Proxy service configuration
///
/// Immutable after startup. The deny-list and own-host set are handed
/// to [`crate::proxy::HostPolicy`] at construction so the policy gate
/// never reads global state.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listen address for the job endpoint
    pub bind_addr: SocketAddr,
    /// Hostnames the proxy refuses to target (lowercase)
    pub disallow_hosts: HashSet<String>,
    /// The service's own externally visible hostnames
    ///
    /// Unioned into the deny-list so the proxy cannot be pointed back
    /// at itself.
    pub own_hosts: HashSet<String>,
    /// User agent sent with every proxied request
    pub user_agent: String,
    /// Accept invalid TLS certificates on proxied requests
    ///
    /// On by default: targets are routinely local dev servers with
    /// self-signed certificates. This is a documented trade-off, the
    /// proxy makes no TLS guarantees about the upstream.
    pub accept_invalid_certs: bool,
    /// Maximum redirects followed per job
    pub max_redirects: usize,
    /// Documentation URL served as a redirect for `GET` on the proxy route
    pub docs_url: String,
    /// Include internal error detail in 500 responses
    pub expose_internal_errors: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3041".parse().expect("static bind address"),
            disallow_hosts: DEFAULT_DISALLOW_HOSTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            own_hosts: HashSet::new(),
            user_agent: DEFAULT_PROXY_USER_AGENT.to_string(),
            accept_invalid_certs: true,
            max_redirects: 10,
            docs_url: DEFAULT_DOCS_URL.to_string(),
            expose_internal_errors: false,
        }
    }
}

impl ProxyConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `MUSTEKALA_*` environment variables
    ///
    /// With `MUSTEKALA_DEBUG` set, the default deny-list is empty and
    /// internal error detail is exposed, mirroring local development
    /// deployments.
    pub fn from_env() -> Result<Self> {
        let debug = env::var("MUSTEKALA_DEBUG").is_ok();

        let mut config = Self {
            expose_internal_errors: debug,
            ..Self::default()
        };

        if let Ok(bind) = env::var("MUSTEKALA_BIND") {
            config.bind_addr = bind
                .parse()
                .map_err(|_| Error::Config(format!("Invalid bind address: {}", bind)))?;
        }

        match env::var("MUSTEKALA_PROXY_DISALLOW_HOSTS") {
            Ok(hosts) => config.disallow_hosts = parse_host_list(&hosts),
            Err(_) if debug => config.disallow_hosts = HashSet::new(),
            Err(_) => {}
        }

        if let Ok(hosts) = env::var("MUSTEKALA_OWN_HOSTS") {
            config.own_hosts = parse_host_list(&hosts);
        }

        Ok(config)
    }

    /// Set the listen address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Replace the deny-list
    pub fn disallow_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallow_hosts = hosts.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Replace the own-host set
    pub fn own_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.own_hosts = hosts.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Set the outbound user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Accept invalid TLS certificates on proxied requests
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the redirect cap
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Expose internal error detail in 500 responses
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }
}

fn parse_host_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
