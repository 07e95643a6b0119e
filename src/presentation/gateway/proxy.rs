//! Reverse proxy forwarding `/users/*` and `/messages/*` to their services.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    response::Response,
};
use tracing::{debug, warn};

use crate::config::GatewaySettings;
use crate::shared::error::{AppError, ErrorCode};

/// Largest request body the gateway will buffer
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Headers describing a single hop, not the message
const HOP_HEADERS: [header::HeaderName; 4] = [
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Maps the first path segment to an upstream base URL.
pub struct UpstreamProxy {
    client: reqwest::Client,
    upstreams: HashMap<&'static str, String>,
}

impl UpstreamProxy {
    pub fn new(client: reqwest::Client, settings: &GatewaySettings) -> Self {
        let upstreams = HashMap::from([
            ("users", trim_base(&settings.user_service_url)),
            ("messages", trim_base(&settings.message_service_url)),
        ]);

        Self { client, upstreams }
    }

    /// HTTP client with the configured upstream timeout.
    pub fn client(settings: &GatewaySettings) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
    }

    /// Base URL serving `path`, chosen by its first segment.
    pub fn upstream_for(&self, path: &str) -> Option<&str> {
        let service = path.trim_start_matches('/').split('/').next()?;
        self.upstreams.get(service).map(String::as_str)
    }

    /// Forward `request` unchanged apart from hop headers and relay the answer.
    pub async fn forward(&self, request: Request) -> Result<Response, AppError> {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();

        let base = self.upstream_for(path).ok_or_else(|| AppError::Business {
            code: ErrorCode::NotFound,
            message: "Gateway.Route",
            description: format!("No upstream serves {}", path),
        })?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path);
        let url = format!("{}{}", base, path_and_query);

        let body = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| AppError::Validation(format!("Unreadable request body: {}", e)))?;

        debug!(method = %parts.method, %url, "Forwarding request");

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(strip_hop_headers(parts.headers))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, timeout = e.is_timeout(), error = %e, "Upstream request failed");
                AppError::BadGateway(format!("{}: {}", url, e))
            })?;

        let status = upstream.status();
        let headers = strip_hop_headers(upstream.headers().clone());
        let bytes = upstream
            .bytes()
            .await
            .map_err(|e| AppError::BadGateway(format!("{}: {}", url, e)))?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;

        Ok(response)
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

fn strip_hop_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_HEADERS {
        headers.remove(name);
    }
    headers
}

/// Fallback handler for every route the gateway does not serve itself.
pub async fn proxy_handler(
    State(proxy): State<Arc<UpstreamProxy>>,
    request: Request,
) -> Result<Response, AppError> {
    proxy.forward(request).await
}
