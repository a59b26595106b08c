use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use axum::body::Bytes;
use std::time::Duration;

use super::{BlobStore, StorageError};
use crate::config::S3Settings;

/// Upper bound on the startup bucket check, so an unreachable endpoint
/// cannot hold up the server
const BUCKET_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Stores photos as public-read objects in an S3-compatible bucket
pub struct RemoteBlobStore {
    client: S3Client,
    bucket: String,
    public_base: String,
}

impl RemoteBlobStore {
    /// Build a client and make sure the bucket answers
    pub async fn connect(settings: &S3Settings, bucket: &str) -> Result<Self> {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        // Configure custom endpoint for MinIO/LocalStack
        if let Some(ref endpoint_url) = settings.endpoint_url {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint_url);
        }
        if settings.force_path_style {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        let client = S3Client::from_conf(s3_config_builder.build());

        tokio::time::timeout(
            BUCKET_CHECK_TIMEOUT,
            client.head_bucket().bucket(bucket).send(),
        )
        .await
        .context("Timed out waiting for bucket")?
        .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
        .context("Bucket is not accessible")?;

        Ok(Self {
            client,
            bucket: bucket.to_string(),
            public_base: public_base_url(settings, bucket),
        })
    }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    async fn store(
        &self,
        content: Bytes,
        content_type: &str,
        path: &str,
    ) -> Result<String, StorageError> {
        let key = path.trim_start_matches('/');
        let size = content.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::Remote(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Photo uploaded to S3");
        Ok(format!("{}/{}", self.public_base, key))
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

/// Public URL prefix for objects in `bucket`: the explicit override, the
/// path-style URL of a custom endpoint, or the AWS virtual-hosted URL.
fn public_base_url(settings: &S3Settings, bucket: &str) -> String {
    if let Some(base) = settings.public_base_url.as_deref() {
        return base.trim_end_matches('/').to_string();
    }
    match settings.endpoint_url.as_deref() {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, settings.region),
    }
}
