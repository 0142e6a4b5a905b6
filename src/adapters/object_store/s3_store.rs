//! S3-compatible object storage.
//!
//! Works against AWS and any provider exposing the S3 API under a custom
//! endpoint. Network timeouts and retries are left to the SDK defaults.

use std::path::Path;

use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::core::errors::{Result, SyncError};
use crate::core::models::remote_object::{ObjectListing, RemoteObject};
use crate::core::models::run_settings::StoreSettings;
use crate::core::traits::object_store::ObjectStore;

/// Object store backed by the AWS S3 SDK with static credentials.
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint and region.
    pub fn new(settings: &StoreSettings) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            &settings.access_key,
            settings.secret_key.expose_secret(),
            None,
            None,
            "cryptsync-config",
        );

        let config = aws_sdk_s3::Config::builder()
            .region(aws_types::region::Region::new(settings.region.clone()))
            .endpoint_url(endpoint_url(&settings.endpoint))
            .credentials_provider(credentials)
            .behavior_version_latest()
            .build();

        Self {
            client: S3Client::from_conf(config),
        }
    }
}

/// Endpoints are configured as bare host names; HTTPS is implied.
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.starts_with("https://") || endpoint.starts_with("http://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

impl ObjectStore for S3ObjectStore {
    async fn check_access(&self, bucket: &str) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| SyncError::BucketAccess {
                bucket: bucket.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    async fn list(&self, bucket: &str, max_keys: i32) -> Result<ObjectListing> {
        let resp = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| SyncError::BucketListing {
                bucket: bucket.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let objects = resp
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(RemoteObject::new))
            .collect::<Vec<_>>();
        debug!("listed {} objects in s3://{bucket}", objects.len());

        Ok(ObjectListing {
            objects,
            truncated: resp.is_truncated().unwrap_or(false),
        })
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let failed = |reason: String| SyncError::TransferFailed {
            key: key.to_string(),
            reason,
        };

        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| failed(format!("download failed: {}", DisplayErrorContext(&e))))?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| failed(format!("failed to read body: {e}")))?;

        let bytes = body.into_bytes().to_vec();
        debug!("downloaded {} bytes from s3://{bucket}/{key}", bytes.len());
        Ok(bytes)
    }

    async fn put(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let failed = |reason: String| SyncError::TransferFailed {
            key: key.to_string(),
            reason,
        };

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| failed(format!("cannot read {}: {e}", path.display())))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| failed(format!("upload failed: {}", DisplayErrorContext(&e))))?;

        debug!("uploaded {} to s3://{bucket}/{key}", path.display());
        Ok(())
    }
}
