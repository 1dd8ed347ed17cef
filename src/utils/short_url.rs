//! Public short URL formatting.

use std::fmt::Write as _;

/// Builds a fully-qualified short URL.
///
/// The port is omitted for the conventional pairings `http`/80 and `https`/443 and
/// included otherwise.
///
/// # Examples
///
/// ```
/// use url_mapper::utils::short_url::format_short_url;
///
/// assert_eq!(format_short_url("http", "ex.com", 80, "abc"), "http://ex.com/abc");
/// assert_eq!(format_short_url("http", "ex.com", 8080, "abc"), "http://ex.com:8080/abc");
/// assert_eq!(format_short_url("https", "ex.com", 443, "abc"), "https://ex.com/abc");
/// ```
pub fn format_short_url(protocol: &str, domain: &str, port: u16, token: &str) -> String {
    let mut url = authority(protocol, domain, port);
    url.push('/');
    url.push_str(token);
    url
}

fn is_default_port(protocol: &str, port: u16) -> bool {
    matches!((protocol, port), ("http", 80) | ("https", 443))
}

fn authority(protocol: &str, domain: &str, port: u16) -> String {
    let mut out = format!("{}://{}", protocol, domain);
    if !is_default_port(protocol, port) {
        let _ = write!(out, ":{}", port);
    }
    out
}

/// Public address of the service, as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicSite {
    pub protocol: String,
    pub domain: String,
    pub port: u16,
}

impl PublicSite {
    pub fn new(protocol: impl Into<String>, domain: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            domain: domain.into(),
            port,
        }
    }

    /// Short URL for a token.
    pub fn short_url(&self, token: &str) -> String {
        format_short_url(&self.protocol, &self.domain, self.port, token)
    }

    /// Home page URL, used when a token is unknown.
    pub fn home_url(&self) -> String {
        format_short_url(&self.protocol, &self.domain, self.port, "")
    }

    /// Origin used for CORS (`protocol://domain[:port]`).
    pub fn origin(&self) -> String {
        authority(&self.protocol, &self.domain, self.port)
    }

    /// `Host` header value clients are expected to send.
    ///
    /// The port is dropped for 80 and 443 regardless of protocol.
    pub fn expected_host(&self) -> String {
        if self.port == 80 || self.port == 443 {
            self.domain.clone()
        } else {
            format!("{}:{}", self.domain, self.port)
        }
    }
}
