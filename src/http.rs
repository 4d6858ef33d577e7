//! Request/response model and cache-busting
//!
//! A canonical request (method + absolute URL, same-origin credentials) is
//! the key every store entry lives under. The busting helpers build the
//! throwaway URL variant used only while fetching during install.

use crate::error::{PrecacheError, PrecacheResult};
use chrono::Utc;
use std::fmt;
use url::Url;

/// Query parameter appended to defeat intermediate caches during install
pub const BUST_PARAM: &str = "__bust";

/// HTTP method of an intercepted request
///
/// Only `GET` is cacheable; everything else passes straight through to the
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    /// Whether requests with this method may be served from a store
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Get)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials mode attached to a request
///
/// Stored entries are always keyed with `SameOrigin`, matching how the
/// installer fetches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CredentialsMode {
    #[default]
    SameOrigin,
    Omit,
    Include,
}

/// Canonical request: the unit of lookup and storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub credentials: CredentialsMode,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            credentials: CredentialsMode::SameOrigin,
        }
    }

    /// Convenience constructor for the common cacheable case
    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    /// Canonical store key: method + URL
    ///
    /// The busting parameter never appears here; installed entries are keyed
    /// by the original URL only.
    pub fn canonical_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Captured response: status, headers, body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: vec![],
            body: vec![],
        }
    }

    pub fn with_body(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![],
            body,
        }
    }

    /// Whether the status is in the ok class (2xx-3xx)
    pub fn ok(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// First header value matching `name`, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Resolve a relative resource path against the base URL
pub fn resolve(base: &Url, path: &str) -> PrecacheResult<Url> {
    base.join(path).map_err(|e| PrecacheError::ResourceUrlInvalid {
        path: path.to_string(),
        base: base.to_string(),
        reason: e.to_string(),
    })
}

/// Build the busted variant of a URL
///
/// Appends a unique time-derived query parameter so any intermediate cache
/// (browser HTTP cache, CDN, proxy) treats the request as novel. An existing
/// query string is preserved.
pub fn bust(url: &Url) -> Url {
    let stamp = Utc::now().timestamp_millis();
    let param = format!("{}={}", BUST_PARAM, stamp);

    let mut busted = url.clone();
    match url.query() {
        Some(q) if !q.is_empty() => {
            let joined = format!("{}&{}", q, param);
            busted.set_query(Some(&joined));
        }
        _ => busted.set_query(Some(&param)),
    }
    busted
}
