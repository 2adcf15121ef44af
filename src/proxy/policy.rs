// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host-level safety policy for proxied URLs
//!
//! The gate keeps the proxy from being used as an open relay into
//! local or internal services, and from being pointed back at itself.
//! It runs before any network I/O and again at every redirect hop.

use std::collections::HashSet;

use crate::config::ProxyConfig;
use crate::error::{Error, Result};

/// Deny-list gate over raw target URLs
///
/// Built once at startup from explicit configuration; holds the
/// configured deny-list unioned with the service's own hostnames.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    deny: HashSet<String>,
}

impl HostPolicy {
    /// Build a policy from a deny-list and the service's own hosts
    pub fn new(
        deny_hosts: impl IntoIterator<Item = String>,
        own_hosts: impl IntoIterator<Item = String>,
    ) -> Self {
        let deny: HashSet<String> = deny_hosts
            .into_iter()
            .chain(own_hosts)
            .map(|h| h.to_ascii_lowercase())
            .collect();
        Self { deny }
    }

    /// Build the policy a config describes
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            config.disallow_hosts.iter().cloned(),
            config.own_hosts.iter().cloned(),
        )
    }

    /// A policy that allows every host
    pub fn open() -> Self {
        Self {
            deny: HashSet::new(),
        }
    }

    /// Extract the host from a raw URL: the authority component of
    /// `scheme://HOST/...`, minus any port, lower-cased
    ///
    /// None when the URL has no authority component at all.
    pub fn host_of(url: &str) -> Option<String> {
        let host_port = url.split('/').nth(2)?;
        let host = host_port.split(':').next().unwrap_or(host_port);
        Some(host.to_ascii_lowercase())
    }

    /// Whether the policy permits targeting this URL
    ///
    /// URLs without an extractable host are never permitted. An empty
    /// deny-list permits everything else.
    pub fn is_allowed(&self, url: &str) -> bool {
        match Self::host_of(url) {
            None => false,
            Some(host) => self.deny.is_empty() || !self.deny.contains(&host),
        }
    }

    /// Gate a URL, rejecting denied hosts
    pub fn check(&self, url: &str) -> Result<()> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(Error::host_not_allowed(url))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deny(hosts: &[&str]) -> HostPolicy {
        HostPolicy::new(hosts.iter().map(|h| h.to_string()), [])
    }

    #[test]
    fn test_host_extraction() {
        assert_eq!(
            HostPolicy::host_of("http://example.test/get?one=two"),
            Some("example.test".to_string())
        );
        assert_eq!(
            HostPolicy::host_of("http://LOCALHOST:3043/x"),
            Some("localhost".to_string())
        );
        assert_eq!(HostPolicy::host_of("example.test/x"), None);
        assert_eq!(HostPolicy::host_of(""), None);
    }

    #[test]
    fn test_denied_host_rejected() {
        let policy = deny(&["localhost", "127.0.0.1"]);
        assert!(!policy.is_allowed("http://localhost/x"));
        assert!(!policy.is_allowed("http://localhost:8080/x"));
        assert!(policy.is_allowed("http://example.test/x"));

        let err = policy.check("http://localhost/x").unwrap_err();
        assert!(matches!(err, Error::HostNotAllowed { .. }));
    }

    #[test]
    fn test_deny_list_is_case_insensitive() {
        let policy = HostPolicy::new(["ExAmple.TEST".to_string()], []);
        assert!(!policy.is_allowed("http://example.test/"));
        assert!(!policy.is_allowed("http://EXAMPLE.test/"));
    }

    #[test]
    fn test_empty_deny_list_allows_everything_with_a_host() {
        let policy = HostPolicy::open();
        assert!(policy.is_allowed("http://localhost/x"));
        assert!(!policy.is_allowed("no-scheme-here"));
    }

    #[test]
    fn test_own_hosts_are_unioned_in() {
        let policy = HostPolicy::new([], ["proxy.bountyy.fi".to_string()]);
        assert!(!policy.is_allowed("https://proxy.bountyy.fi/api"));
        assert!(policy.is_allowed("https://example.test/"));
    }

    #[test]
    fn test_from_config() {
        let config = ProxyConfig::default();
        let policy = HostPolicy::from_config(&config);
        assert!(!policy.is_allowed("http://localhost/x"));
        assert!(!policy.is_allowed("http://127.0.0.1:9999/x"));
    }
}
