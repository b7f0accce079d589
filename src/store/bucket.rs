// MediaStore backed by an `object_store` bucket (S3/R2-compatible, or the
// in-memory store in tests).

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use object_store::path::Path;
use object_store::{Attribute, DynObjectStore, GetOptions, GetRange, GetResult, ObjectStore};

use super::{MediaStore, ObjectBody, ObjectInfo};

pub struct BucketStore {
    inner: Arc<DynObjectStore>,
}

impl BucketStore {
    pub fn new(inner: Arc<DynObjectStore>) -> Self {
        Self { inner }
    }

    fn body_from(result: GetResult) -> ObjectBody {
        let stream = result
            .into_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other))
            .boxed();
        ObjectBody { stream }
    }
}

/// Collapse the store's not-found error into `None`; everything else is a
/// real failure and propagates.
fn absent_as_none<T>(result: object_store::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(object_store::Error::NotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl MediaStore for BucketStore {
    async fn head(&self, key: &str) -> Result<Option<ObjectInfo>> {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = absent_as_none(self.inner.get_opts(&Path::from(key), options).await)?;
        Ok(result.map(|res| {
            let content_type = res
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| v.as_ref().to_string());
            ObjectInfo {
                size: res.meta.size,
                etag: res.meta.e_tag.clone(),
                uploaded: Some(res.meta.last_modified),
                content_type,
            }
        }))
    }

    async fn get(&self, key: &str) -> Result<Option<ObjectBody>> {
        let result = absent_as_none(self.inner.get(&Path::from(key)).await)?;
        Ok(result.map(Self::body_from))
    }

    async fn get_range(&self, key: &str, offset: u64, length: u64) -> Result<Option<ObjectBody>> {
        let options = GetOptions {
            range: Some(GetRange::Bounded(offset..offset + length)),
            ..Default::default()
        };
        let result = absent_as_none(self.inner.get_opts(&Path::from(key), options).await)?;
        Ok(result.map(Self::body_from))
    }
}
