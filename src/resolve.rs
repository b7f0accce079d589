// Key resolution — probe candidate keys sequentially and keep the first hit.

use tracing::{debug, warn};

use crate::key::candidate_keys;
use crate::store::{MediaStore, ObjectInfo};

/// A key that answered a metadata lookup during this request.
#[derive(Debug, Clone)]
pub struct ResolvedObject {
    pub key: String,
    pub info: ObjectInfo,
}

/// Try each candidate key against the store, one at a time, returning the
/// first that exists. `None` is a normal outcome (the caller answers 404).
///
/// Lookups are sequential on purpose: once a candidate hits there is no
/// point paying for the rest.
pub async fn resolve_existing_key(
    store: &dyn MediaStore,
    normalized: &str,
    prefix: &str,
) -> Option<ResolvedObject> {
    for candidate in candidate_keys(normalized, prefix) {
        match store.head(&candidate).await {
            Ok(Some(info)) => {
                debug!("resolved key={} size={}", candidate, info.size);
                return Some(ResolvedObject {
                    key: candidate,
                    info,
                });
            }
            Ok(None) => {}
            Err(e) => {
                // A flaky lookup on one candidate should not sink the
                // request while another candidate may still resolve.
                warn!("head failed for candidate={}: {}", candidate, e);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::bucket::BucketStore;
    use object_store::memory::InMemory;
    use object_store::path::Path;
    use object_store::{ObjectStore, PutPayload};
    use std::sync::Arc;

    async fn bucket_with(keys: &[&str]) -> BucketStore {
        let inner = InMemory::new();
        for key in keys {
            inner
                .put(&Path::from(*key), PutPayload::from(vec![0u8; 16]))
                .await
                .unwrap();
        }
        BucketStore::new(Arc::new(inner))
    }

    #[tokio::test]
    async fn test_resolves_bare_key_first() {
        let store = bucket_with(&["album/track.mp3", "media/album/track.mp3"]).await;
        let resolved = resolve_existing_key(&store, "album/track.mp3", "media")
            .await
            .unwrap();
        assert_eq!(resolved.key, "album/track.mp3");
    }

    #[tokio::test]
    async fn test_falls_back_to_prefixed_key() {
        let store = bucket_with(&["media/album/track.mp3"]).await;
        let resolved = resolve_existing_key(&store, "album/track.mp3", "media")
            .await
            .unwrap();
        assert_eq!(resolved.key, "media/album/track.mp3");
    }

    #[tokio::test]
    async fn test_strips_prefix_when_request_carries_it() {
        let store = bucket_with(&["album/track.mp3"]).await;
        let resolved = resolve_existing_key(&store, "media/album/track.mp3", "media")
            .await
            .unwrap();
        assert_eq!(resolved.key, "album/track.mp3");
    }

    #[tokio::test]
    async fn test_no_candidate_is_none() {
        let store = bucket_with(&[]).await;
        assert!(resolve_existing_key(&store, "missing.mp3", "media")
            .await
            .is_none());
    }
}
