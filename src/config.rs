use serde::Deserialize;

/// Cache policy advertised on every successful or validator response.
/// Media keys are treated as immutable once published; fresh content gets a new key.
pub const CACHE_CONTROL: &str = "public, max-age=86400, immutable";

/// Storage-area prefix tried during key resolution when none is configured.
pub const DEFAULT_STORAGE_PREFIX: &str = "media";

/// Default listen address for the standalone service.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8788";

/// Top-level configuration for the proxy service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Address the HTTP listener binds to.
    pub bind_addr: String,
    /// Logical directory prefix objects may or may not carry in the bucket.
    pub storage_prefix: String,
    /// Bucket name; when absent the media route answers 500.
    pub bucket: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            bucket: None,
        }
    }
}

impl ProxyConfig {
    /// Load configuration, letting environment variables override the defaults.
    /// Bucket credentials themselves are picked up by the object-store builder.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(addr) = std::env::var("MEDIA_PROXY_ADDR") {
            if !addr.is_empty() {
                cfg.bind_addr = addr;
            }
        }
        if let Ok(prefix) = std::env::var("MEDIA_STORAGE_PREFIX") {
            if !prefix.is_empty() {
                cfg.storage_prefix = prefix.trim_matches('/').to_string();
            }
        }
        if let Ok(bucket) = std::env::var("MEDIA_BUCKET") {
            if !bucket.is_empty() {
                cfg.bucket = Some(bucket);
            }
        }
        cfg
    }
}
