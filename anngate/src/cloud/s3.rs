use super::{BucketStore, CloudError};
use crate::config::CloudConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// S3-backed [`BucketStore`].
///
/// Credentials come from the ambient AWS configuration (environment,
/// profile, IMDS). A custom endpoint plus `force_path_style` covers
/// S3-compatible stores like MinIO.
pub struct S3BucketStore {
    client: aws_sdk_s3::Client,
}

impl S3BucketStore {
    pub async fn from_config(config: &CloudConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.as_str());
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, CloudError> {
        match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| CloudError::Other(anyhow::Error::new(e)))?;
                Ok(data.into_bytes())
            }
            Err(err) => {
                if err.as_service_error().map(GetObjectError::is_no_such_key).unwrap_or(false) {
                    return Err(CloudError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                Err(CloudError::Other(anyhow::Error::new(err)))
            }
        }
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), CloudError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| {
                // NoSuchBucket is not a modeled PutObject variant, so match on
                // the error code from the response metadata.
                if err.as_service_error().and_then(|e| e.code()) == Some("NoSuchBucket") {
                    CloudError::BucketNotFound {
                        bucket: bucket.to_string(),
                    }
                } else {
                    CloudError::Other(anyhow::Error::new(err))
                }
            })?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), CloudError> {
        // S3 DeleteObject is idempotent; a missing key already succeeds.
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| CloudError::Other(anyhow::Error::new(err)))?;
        Ok(())
    }
}
