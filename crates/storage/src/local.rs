//! Filesystem backend.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use promptshelf_core::signing::sign_object;
use promptshelf_core::storage::{public_url, validate_key, SIGNED_OBJECT_PATH};

use crate::{ObjectBody, StorageConfig, StorageError, StorageGateway, StoredObject};

/// Stores objects as files under `{root}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
    signing_secret: String,
}

impl LocalStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.root.clone(),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            signing_secret: config.signing_secret.clone(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key).map_err(|_| StorageError::InvalidKey(key.to_string()))?;
        Ok(self.root.join(&self.bucket).join(key))
    }
}

#[async_trait]
impl StorageGateway for LocalStorage {
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
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.path_for(key)?;
        let write_err = |e: std::io::Error| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let size = bytes.len() as u64;
        tokio::fs::write(&path, bytes).await.map_err(write_err)?;

        tracing::debug!(key, size, "Stored object");
        Ok(StoredObject {
            key: key.to_string(),
            public_url: self.public_url(key),
            size,
        })
    }

    async fn remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut failed = Vec::new();
        let mut last_message = String::new();

        for key in keys {
            let path = match self.path_for(key) {
                Ok(path) => path,
                Err(e) => {
                    last_message = e.to_string();
                    failed.push(key.clone());
                    continue;
                }
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    last_message = e.to_string();
                    failed.push(key.clone());
                }
            }
        }

        if failed.is_empty() {
            tracing::debug!(count = keys.len(), "Removed objects");
            Ok(())
        } else {
            Err(StorageError::Delete {
                keys: failed,
                message: last_message,
            })
        }
    }

    async fn sign(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        if ttl.is_zero() {
            return Err(StorageError::Sign {
                key: key.to_string(),
                message: "ttl must be greater than zero".into(),
            });
        }
        let path = self.path_for(key)?;
        match tokio::fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => return Err(StorageError::NotFound(key.to_string())),
            Err(e) => {
                return Err(StorageError::Sign {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }

        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = chrono::Utc::now().timestamp().saturating_add(ttl_secs);
        let token = sign_object(
            self.signing_secret.as_bytes(),
            &self.bucket,
            key,
            expires_at,
        );
        Ok(format!(
            "{}{SIGNED_OBJECT_PATH}/{}/{key}?token={token}",
            self.public_base_url, self.bucket
        ))
    }

    async fn read(&self, key: &str) -> Result<ObjectBody, StorageError> {
        let path = self.path_for(key)?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::Read {
                key: key.to_string(),
                message: e.to_string(),
            },
        })?;
        let content_length = file.metadata().await.ok().map(|m| m.len());
        Ok(ObjectBody {
            reader: Box::pin(file),
            content_length,
            content_type: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use promptshelf_core::signing::verify_object;
    use promptshelf_core::storage::key_from_public_url;
    use tokio::io::AsyncReadExt;

    use super::*;

    const SECRET: &str = "test-signing-secret";

    fn storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(&StorageConfig::local(
            dir.path(),
            "http://localhost:3000/",
            SECRET,
        ))
    }

    #[tokio::test]
    async fn put_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);

        let stored = storage.put("7/1-cat.png", b"meow".to_vec(), "image/png").await.unwrap();
        assert_eq!(stored.size, 4);
        assert_eq!(
            stored.public_url,
            "http://localhost:3000/storage/v1/object/public/results/7/1-cat.png"
        );
        assert_eq!(
            key_from_public_url(&stored.public_url, "results").as_deref(),
            Some("7/1-cat.png")
        );

        let mut body = storage.read("7/1-cat.png").await.unwrap();
        let mut buf = Vec::new();
        body.reader.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"meow");
        assert_eq!(body.content_length, Some(4));
    }

    #[tokio::test]
    async fn traversal_keys_never_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        assert_matches!(
            storage.put("../escape.png", vec![1], "image/png").await,
            Err(StorageError::InvalidKey(_))
        );
    }

    #[tokio::test]
    async fn sign_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        assert_matches!(
            storage.sign("nope.png", Duration::from_secs(60)).await,
            Err(StorageError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn signed_url_carries_a_verifiable_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        storage.put("1_a.png", vec![0; 8], "image/png").await.unwrap();

        let url = storage.sign("1_a.png", Duration::from_secs(60)).await.unwrap();
        let prefix = "http://localhost:3000/storage/v1/object/sign/results/1_a.png?token=";
        assert!(url.starts_with(prefix), "{url}");

        let token = &url[prefix.len()..];
        let now = chrono::Utc::now().timestamp();
        assert!(verify_object(SECRET.as_bytes(), "results", "1_a.png", token, now).is_ok());
    }

    #[tokio::test]
    async fn zero_ttl_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        storage.put("a.png", vec![1], "image/png").await.unwrap();
        assert_matches!(
            storage.sign("a.png", Duration::ZERO).await,
            Err(StorageError::Sign { .. })
        );
    }

    #[tokio::test]
    async fn remove_tolerates_missing_objects() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        storage.put("a.png", vec![1], "image/png").await.unwrap();

        storage
            .remove(&["a.png".to_string(), "never-existed.png".to_string()])
            .await
            .unwrap();
        assert_matches!(storage.read("a.png").await, Err(StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_reports_invalid_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        let err = storage.remove(&["../x".to_string()]).await.unwrap_err();
        assert_matches!(err, StorageError::Delete { keys, .. } if keys == vec!["../x".to_string()]);
    }
}
