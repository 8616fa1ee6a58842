use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<AccessToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Token store backed by a JSON file, so a session survives across CLI runs.
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredCredentials, TokenStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| TokenStoreError::Corrupt(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredCredentials::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, mut stored: StoredCredentials) -> Result<(), TokenStoreError> {
        stored.updated_at = Some(Utc::now());
        let raw = serde_json::to_vec_pretty(&stored)
            .map_err(|e| TokenStoreError::Io(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "credentials written");
        Ok(())
    }
}

#[async_trait::async_trait]
impl TokenStore for FileTokenStore {
    async fn access_token(&self) -> Result<Option<AccessToken>, TokenStoreError> {
        Ok(self.load().await?.access_token)
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>, TokenStoreError> {
        Ok(self.load().await?.refresh_token)
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.load().await?;
        stored.access_token = Some(token);
        self.save(stored).await
    }

    async fn set_credentials(
        &self,
        credentials: SessionCredentials,
    ) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;
        self.save(StoredCredentials {
            access_token: Some(credentials.access_token),
            refresh_token: Some(credentials.refresh_token),
            updated_at: None,
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), TokenStoreError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "credentials removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));

        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
        store.clear_all().await.unwrap();
    }

    #[tokio::test]
    async fn credentials_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileTokenStore::new(&path);
        store
            .set_credentials(SessionCredentials::new("a1", "r1"))
            .await
            .unwrap();
        store
            .set_access_token(AccessToken("a2".to_string()))
            .await
            .unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(
            reopened.access_token().await.unwrap(),
            Some(AccessToken("a2".to_string()))
        );
        assert_eq!(
            reopened.refresh_token().await.unwrap(),
            Some(RefreshToken("r1".to_string()))
        );

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "a2");
        assert!(raw.get("updatedAt").is_some());
    }

    #[tokio::test]
    async fn clear_all_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileTokenStore::new(&path);
        store
            .set_credentials(SessionCredentials::new("a1", "r1"))
            .await
            .unwrap();
        assert!(path.exists());

        store.clear_all().await.unwrap();
        assert!(!path.exists());
        assert!(store.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(
            store.access_token().await,
            Err(TokenStoreError::Corrupt(_))
        ));
    }
}
