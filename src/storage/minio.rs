use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials},
    primitives::ByteStream,
    types::{BucketCannedAcl, ObjectCannedAcl},
    Client, Config,
};
use bytes::Bytes;
use uuid::Uuid;

use super::{content_type_for, file_name_of, read_asset, AssetUploader};
use crate::{
    config::MinioConfig,
    error::{AppResult, UploadError, UploadResult},
};

/// Uploads assets straight into an S3-compatible bucket.
#[derive(Clone)]
pub struct MinioClient {
    client: Client,
    config: MinioConfig,
    timeout: Duration,
}

impl MinioClient {
    pub fn new(config: &MinioConfig, timeout: Duration) -> Self {
        let creds = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "minio",
        );

        let s3_config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(creds)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            config: config.clone(),
            timeout,
        }
    }

    pub async fn ensure_bucket(&self) -> AppResult<()> {
        let bucket = &self.config.stickers_bucket;
        let result = self.client.head_bucket().bucket(bucket).send().await;

        if result.is_err() {
            self.client
                .create_bucket()
                .bucket(bucket)
                .acl(BucketCannedAcl::PublicRead)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create bucket: {}", e))?;
            tracing::info!("Created bucket: {}", bucket);
        }

        Ok(())
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> UploadResult<()> {
        self.client
            .put_object()
            .bucket(&self.config.stickers_bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| UploadError::Store(e.to_string()))?;

        Ok(())
    }

    async fn delete_object(&self, key: &str) -> UploadResult<()> {
        self.client
            .delete_object()
            .bucket(&self.config.stickers_bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| UploadError::Store(e.to_string()))?;

        Ok(())
    }

    fn bucket_url(&self) -> String {
        let base = self
            .config
            .public_url
            .as_deref()
            .unwrap_or(&self.config.endpoint);
        format!("{}/{}", base.trim_end_matches('/'), self.config.stickers_bucket)
    }

    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}", self.bucket_url(), key)
    }

    /// Object key for a URL produced by [`MinioClient::get_file_url`].
    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = self.bucket_url();
        url.strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl AssetUploader for MinioClient {
    async fn upload(&self, path: &Path, owner_id: &str) -> UploadResult<String> {
        let file_name = file_name_of(path)?;
        let data = read_asset(path).await?;
        let key = format!("{}/{}_{}", owner_id, Uuid::new_v4().simple(), file_name);

        tokio::time::timeout(
            self.timeout,
            self.put_object(&key, Bytes::from(data), content_type_for(path)),
        )
        .await
        .map_err(|_| UploadError::Timeout)??;

        Ok(self.get_file_url(&key))
    }

    async fn discard(&self, url: &str) -> UploadResult<()> {
        let key = self
            .key_from_url(url)
            .ok_or_else(|| UploadError::Store(format!("URL outside bucket: {}", url)))?;

        tokio::time::timeout(self.timeout, self.delete_object(key))
            .await
            .map_err(|_| UploadError::Timeout)?
    }
}
