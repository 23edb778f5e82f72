//! S3-compatible backend.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use promptshelf_core::storage::{public_url, validate_key};

use crate::{ObjectBody, StorageConfig, StorageError, StorageGateway, StoredObject};

/// Objects in one bucket of an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    /// Build a client from the config. Custom endpoints (MinIO and friends)
    /// use path-style addressing.
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()));
        if let (Some(key_id), Some(secret)) =
            (&config.s3_access_key_id, &config.s3_secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "static",
            ));
        }
        if let Some(endpoint) = &config.s3_endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.s3_endpoint.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn check_key(key: &str) -> Result<(), StorageError> {
        validate_key(key).map_err(|_| StorageError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl StorageGateway for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_url(&self, key: &str) -> String {
        public_url(&self.public_base_url, &self.bucket, key)
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        Self::check_key(key)?;
        let size = bytes.len() as u64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %DisplayErrorContext(&e), "S3 put failed");
                StorageError::Write {
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        Ok(StoredObject {
            key: key.to_string(),
            public_url: self.public_url(key),
            size,
        })
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }
        let delete_err = |message: String| StorageError::Delete {
            keys: keys.to_vec(),
            message,
        };

        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| delete_err(e.to_string()))?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| delete_err(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| delete_err(DisplayErrorContext(&e).to_string()))?;

        let failed: Vec<String> = output
            .errors()
            .iter()
            .filter(|e| e.code() != Some("NoSuchKey"))
            .filter_map(|e| e.key().map(str::to_string))
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(StorageError::Delete {
                message: format!("{} object(s) could not be deleted", failed.len()),
                keys: failed,
            })
        }
    }

    async fn sign(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        Self::check_key(key)?;
        let sign_err = |message: String| StorageError::Sign {
            key: key.to_string(),
            message,
        };

        // Presigning never checks existence, so ask first.
        if let Err(e) = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            let not_found = e.as_service_error().is_some_and(|se| se.is_not_found());
            return Err(if not_found {
                StorageError::NotFound(key.to_string())
            } else {
                sign_err(DisplayErrorContext(&e).to_string())
            });
        }

        let presigning = PresigningConfig::expires_in(ttl).map_err(|e| sign_err(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| sign_err(DisplayErrorContext(&e).to_string()))?;
        Ok(request.uri().to_string())
    }

    async fn read(&self, key: &str) -> Result<ObjectBody, StorageError> {
        Self::check_key(key)?;
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Read {
                        key: key.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        Ok(ObjectBody {
            content_length: object.content_length().and_then(|n| u64::try_from(n).ok()),
            content_type: object.content_type().map(str::to_string),
            reader: Box::pin(object.body.into_async_read()),
        })
    }
}
