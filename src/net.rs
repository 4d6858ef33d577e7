//! Network transport capability
//!
//! The lifecycle never talks to the network directly; it calls the
//! `Network` trait. A non-ok HTTP status is a valid `Response` (the
//! installer decides what to do with it); `Err` is reserved for transport
//! failures such as DNS errors or refused connections.

use crate::error::{PrecacheError, PrecacheResult};
use crate::http::{Method, Request, Response};
use async_trait::async_trait;

/// Live network transport
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform a live request
    async fn fetch(&self, request: &Request) -> PrecacheResult<Response>;
}

/// HTTP transport over ureq, bridged onto the blocking pool
///
/// ureq is synchronous; each fetch runs on `spawn_blocking` so lifecycle
/// fan-out still overlaps requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqNetwork;

impl UreqNetwork {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Network for UreqNetwork {
    async fn fetch(&self, request: &Request) -> PrecacheResult<Response> {
        let method = request.method;
        let url = request.url.to_string();
        let join_url = url.clone();

        tokio::task::spawn_blocking(move || fetch_blocking(method, &url))
            .await
            .map_err(|e| PrecacheError::fetch(join_url, e.to_string()))?
    }
}

fn fetch_blocking(method: Method, url: &str) -> PrecacheResult<Response> {
    // Status classes are reported through Response::ok, never as Err
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let result = match method {
        Method::Get => agent.get(url).call(),
        Method::Head => agent.head(url).call(),
        Method::Delete => agent.delete(url).call(),
        Method::Post => agent.post(url).send_empty(),
        Method::Put => agent.put(url).send_empty(),
        Method::Patch => agent.patch(url).send_empty(),
    };

    let mut raw = result.map_err(|e| PrecacheError::fetch(url, e.to_string()))?;

    let status = raw.status().as_u16();
    let headers = raw
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = raw
        .body_mut()
        .read_to_vec()
        .map_err(|e| PrecacheError::fetch(url, e.to_string()))?;

    Ok(Response {
        status,
        headers,
        body,
    })
}
