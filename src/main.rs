use std::sync::Arc;

use anyhow::Result;
use object_store::aws::AmazonS3Builder;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use media_proxy::config::ProxyConfig;
use media_proxy::server::handler::{AppState, MediaServer};
use media_proxy::store::bucket::BucketStore;
use media_proxy::store::MediaStore;

/// Build the bucket binding from the environment; credentials and endpoint
/// (e.g. an R2 endpoint) come from the standard AWS_* variables.
fn build_store(config: &ProxyConfig) -> Option<Arc<dyn MediaStore>> {
    let bucket = config.bucket.as_deref()?;
    match AmazonS3Builder::from_env().with_bucket_name(bucket).build() {
        Ok(s3) => Some(Arc::new(BucketStore::new(Arc::new(s3)))),
        Err(e) => {
            error!("failed to build bucket binding for {}: {}", bucket, e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,h2=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = ProxyConfig::from_env();
    let store = build_store(&config);
    if store.is_none() {
        warn!("no media bucket bound; media requests will answer 500");
    }

    let state = AppState {
        store,
        storage_prefix: config.storage_prefix.clone(),
    };

    let server = MediaServer::start(&config.bind_addr, state).await?;
    info!(
        "media proxy listening on {} (prefix={})",
        server.local_addr(),
        config.storage_prefix
    );

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.shutdown();

    Ok(())
}
