use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

/// Key under which the serialized day collection is mirrored.
pub const JOURNAL_KEY: &str = "calorie_data";
/// Key holding the analysis service credential.
pub const API_KEY_KEY: &str = "analysis_api_key";

/// Single-string-per-key local store. Best-effort mirror of remote state;
/// read only when the remote load fails.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// One file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read store key {key}")),
        }
    }

    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context("create store dir")?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .with_context(|| format!("write store key {key}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        store
            .put(JOURNAL_KEY, r#"[{"date":"2024-05-01"}]"#)
            .await
            .expect("put");
        let value = store.get(JOURNAL_KEY).await.expect("get");
        assert_eq!(value.as_deref(), Some(r#"[{"date":"2024-05-01"}]"#));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        let value = store.get(API_KEY_KEY).await.expect("get");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn put_overwrites_previous_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());

        store.put(API_KEY_KEY, "pplx-old").await.expect("put");
        store.put(API_KEY_KEY, "pplx-new").await.expect("put again");
        let value = store.get(API_KEY_KEY).await.expect("get");
        assert_eq!(value.as_deref(), Some("pplx-new"));
    }
}
