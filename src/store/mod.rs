// Backing-store abstraction — the proxy only ever reads: metadata lookup,
// full fetch, and ranged fetch.

pub mod bucket;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

/// Metadata for one stored object, as returned by a `head` lookup.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    /// Object size in bytes.
    pub size: u64,
    /// Backend-assigned validator, when the backend supplies one.
    pub etag: Option<String>,
    /// Upload timestamp, when known.
    pub uploaded: Option<DateTime<Utc>>,
    /// Content type recorded at upload time, when known.
    pub content_type: Option<String>,
}

/// A streaming object body. Bytes are pulled from the store on demand; the
/// whole object is never held in memory.
pub struct ObjectBody {
    pub stream: BoxStream<'static, std::io::Result<Bytes>>,
}

/// Read-only capability the proxy holds on the backing object store.
///
/// A missing object is `Ok(None)`, not an error — key resolution probes
/// keys that are expected to be absent.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Metadata lookup for a key.
    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>>;

    /// Fetch the full object body.
    async fn get(&self, key: &str) -> Result<Option<ObjectBody>>;

    /// Fetch exactly `length` bytes starting at `offset`.
    async fn get_range(&self, key: &str, offset: u64, length: u64) -> Result<Option<ObjectBody>>;
}
