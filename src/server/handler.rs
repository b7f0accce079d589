// Axum request handler — translates media requests into store lookups and
// range-aware streaming responses.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::config::CACHE_CONTROL;
use crate::key::normalize_key;
use crate::mime::guess_content_type;
use crate::range::{parse_range_header, RangeRequest};
use crate::resolve::resolve_existing_key;
use crate::store::{MediaStore, ObjectInfo};

/// Shared per-request context. The store is optional so a deployment with
/// no bucket bound still starts and answers 500 on the media route.
#[derive(Clone)]
pub struct AppState {
    pub store: Option<Arc<dyn MediaStore>>,
    pub storage_prefix: String,
}

/// Build the router for the media endpoint.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/media/{*key}", get(media_handler))
        .with_state(state)
}

pub struct MediaServer {
    addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MediaServer {
    /// Bind the listener and start serving in a background task.
    pub async fn start(bind_addr: &str, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = router(state);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build a URL for a logical media key.
    pub fn url_for_key(&self, key: &str) -> String {
        format!("http://{}/media/{}", self.addr, key)
    }

    /// Shutdown the server gracefully.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// GET /media/{*key} — serve an object with conditional-request and
/// single-range support.
async fn media_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(store) = state.store.clone() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "media store not configured").into_response();
    };

    let normalized = normalize_key(&key);
    let Some(resolved) =
        resolve_existing_key(store.as_ref(), normalized.as_str(), &state.storage_prefix).await
    else {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    };

    let size = resolved.info.size;
    let etag = object_etag(&resolved.info);
    let last_modified = resolved.info.uploaded.map(http_date);
    let content_type = resolved
        .info
        .content_type
        .clone()
        .unwrap_or_else(|| guess_content_type(&resolved.key).to_string());

    // Conditional request via ETag — wins over any Range header.
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if let Some(client_tag) = if_none_match {
        if validators_match(client_tag, &etag) {
            let resp_headers = validator_headers(&etag, last_modified.as_deref());
            return (StatusCode::NOT_MODIFIED, resp_headers).into_response();
        }
    }

    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    match parse_range_header(range_header, size) {
        RangeRequest::Unsatisfiable => {
            let mut resp_headers = validator_headers(&etag, last_modified.as_deref());
            put_header(&mut resp_headers, header::ACCEPT_RANGES, "bytes");
            put_header(
                &mut resp_headers,
                header::CONTENT_RANGE,
                &format!("bytes */{}", size),
            );
            (StatusCode::RANGE_NOT_SATISFIABLE, resp_headers).into_response()
        }
        RangeRequest::Partial(range) => {
            debug!(
                "range request key={} range={}-{}/{}",
                resolved.key, range.start, range.end, size
            );
            let body = match store
                .get_range(&resolved.key, range.start, range.byte_len())
                .await
            {
                Ok(Some(body)) => body,
                Ok(None) => return (StatusCode::NOT_FOUND, "not found").into_response(),
                Err(e) => {
                    // The object vanished between head and fetch; a benign
                    // race, answered the same as never-existed.
                    warn!("range fetch failed key={}: {}", resolved.key, e);
                    return (StatusCode::NOT_FOUND, "not found").into_response();
                }
            };

            let mut resp_headers = validator_headers(&etag, last_modified.as_deref());
            put_header(&mut resp_headers, header::ACCEPT_RANGES, "bytes");
            put_header(&mut resp_headers, header::CONTENT_TYPE, &content_type);
            put_header(
                &mut resp_headers,
                header::CONTENT_RANGE,
                &format!("bytes {}-{}/{}", range.start, range.end, size),
            );
            put_header(
                &mut resp_headers,
                header::CONTENT_LENGTH,
                &range.byte_len().to_string(),
            );
            (
                StatusCode::PARTIAL_CONTENT,
                resp_headers,
                Body::from_stream(body.stream),
            )
                .into_response()
        }
        RangeRequest::Full => {
            let body = match store.get(&resolved.key).await {
                Ok(Some(body)) => body,
                Ok(None) => return (StatusCode::NOT_FOUND, "not found").into_response(),
                Err(e) => {
                    warn!("fetch failed key={}: {}", resolved.key, e);
                    return (StatusCode::NOT_FOUND, "not found").into_response();
                }
            };

            let mut resp_headers = validator_headers(&etag, last_modified.as_deref());
            put_header(&mut resp_headers, header::ACCEPT_RANGES, "bytes");
            put_header(&mut resp_headers, header::CONTENT_TYPE, &content_type);
            put_header(
                &mut resp_headers,
                header::CONTENT_LENGTH,
                &size.to_string(),
            );
            (StatusCode::OK, resp_headers, Body::from_stream(body.stream)).into_response()
        }
    }
}

/// Prefer the backend-assigned validator; otherwise synthesize a weak one
/// from size and upload time.
fn object_etag(info: &ObjectInfo) -> String {
    match info.etag.as_deref() {
        Some(tag) if !tag.is_empty() => tag.to_string(),
        _ => {
            let uploaded_ms = info.uploaded.map(|t| t.timestamp_millis()).unwrap_or(0);
            format!("W/\"{}-{}\"", info.size, uploaded_ms)
        }
    }
}

/// Compare validators for equality, ignoring the weak prefix on either side.
fn validators_match(client_tag: &str, etag: &str) -> bool {
    strip_weak(client_tag.trim()) == strip_weak(etag)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn http_date(t: DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Headers shared by every 200/206/304/416 response.
fn validator_headers(etag: &str, last_modified: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    put_header(&mut headers, header::ETAG, etag);
    if let Some(lm) = last_modified {
        put_header(&mut headers, header::LAST_MODIFIED, lm);
    }
    put_header(&mut headers, header::CACHE_CONTROL, CACHE_CONTROL);
    headers
}

fn put_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => debug!("dropping invalid header value for {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(size: u64, etag: Option<&str>) -> ObjectInfo {
        ObjectInfo {
            size,
            etag: etag.map(str::to_string),
            uploaded: DateTime::from_timestamp_millis(1_700_000_000_000),
            content_type: None,
        }
    }

    #[test]
    fn test_object_etag_prefers_backend_validator() {
        assert_eq!(
            object_etag(&info(10, Some("\"abc123\""))),
            "\"abc123\""
        );
    }

    #[test]
    fn test_object_etag_synthesizes_weak_fallback() {
        assert_eq!(
            object_etag(&info(3_500_000, None)),
            "W/\"3500000-1700000000000\""
        );
        assert_eq!(
            object_etag(&info(3_500_000, Some(""))),
            "W/\"3500000-1700000000000\""
        );
    }

    #[test]
    fn test_validators_match_ignores_weak_prefix() {
        assert!(validators_match("\"abc\"", "\"abc\""));
        assert!(validators_match("W/\"abc\"", "\"abc\""));
        assert!(validators_match("\"abc\"", "W/\"abc\""));
        assert!(!validators_match("\"abc\"", "\"def\""));
    }

    #[test]
    fn test_http_date_format() {
        let t = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(http_date(t), "Thu, 01 Jan 1970 00:00:00 GMT");
    }
}
