//! Append-only storage for a session's raw audio bytes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::Result;

/// Durable, append-only store for raw upload bytes, keyed by session id.
///
/// Bytes are persisted in arrival order. `read_all` is only called after
/// appends have stopped for that id; the session state machine guarantees
/// this, so implementations need not support concurrent append and read on
/// the same id.
#[async_trait]
pub trait ByteSink: Send + Sync {
    /// Initialize empty storage for a new session.
    async fn create(&self, id: &str) -> Result<()>;

    /// Append bytes, returning the total stored for this id afterwards.
    async fn append(&self, id: &str, bytes: &[u8]) -> Result<u64>;

    /// Read back everything appended for this id, in append order.
    async fn read_all(&self, id: &str) -> Result<Vec<u8>>;

    async fn len(&self, id: &str) -> Result<u64>;
}

/// Filesystem sink: one `{id}.raw` file per session under a base directory.
pub struct FsByteSink {
    raw_dir: PathBuf,
}

impl FsByteSink {
    pub fn new(raw_dir: impl AsRef<Path>) -> Result<Self> {
        let raw_dir = raw_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&raw_dir)?;
        info!("Byte sink directory: {}", raw_dir.display());
        Ok(Self { raw_dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.raw_dir.join(format!("{}.raw", id))
    }
}

#[async_trait]
impl ByteSink for FsByteSink {
    async fn create(&self, id: &str) -> Result<()> {
        tokio::fs::File::create(self.path_for(id)).await?;
        Ok(())
    }

    async fn append(&self, id: &str, bytes: &[u8]) -> Result<u64> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(id))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        let total = file.metadata().await?.len();
        Ok(total)
    }

    async fn read_all(&self, id: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.path_for(id)).await?)
    }

    async fn len(&self, id: &str) -> Result<u64> {
        Ok(tokio::fs::metadata(self.path_for(id)).await?.len())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemorySink {
    buffers: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ByteSink for MemorySink {
    async fn create(&self, id: &str) -> Result<()> {
        self.buffers
            .write()
            .await
            .entry(id.to_string())
            .or_default();
        Ok(())
    }

    async fn append(&self, id: &str, bytes: &[u8]) -> Result<u64> {
        let mut buffers = self.buffers.write().await;
        let buffer = buffers.entry(id.to_string()).or_default();
        buffer.extend_from_slice(bytes);
        Ok(buffer.len() as u64)
    }

    async fn read_all(&self, id: &str) -> Result<Vec<u8>> {
        Ok(self
            .buffers
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn len(&self, id: &str) -> Result<u64> {
        Ok(self
            .buffers
            .read()
            .await
            .get(id)
            .map(|b| b.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_sink_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsByteSink::new(dir.path()).unwrap();

        sink.create("s1").await.unwrap();
        assert_eq!(sink.append("s1", b"abc").await.unwrap(), 3);
        assert_eq!(sink.append("s1", b"def").await.unwrap(), 6);

        assert_eq!(sink.read_all("s1").await.unwrap(), b"abcdef");
        assert_eq!(sink.len("s1").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_fs_sink_sessions_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsByteSink::new(dir.path()).unwrap();

        sink.create("a").await.unwrap();
        sink.create("b").await.unwrap();
        sink.append("a", b"aaaa").await.unwrap();
        sink.append("b", b"bb").await.unwrap();

        assert_eq!(sink.read_all("a").await.unwrap(), b"aaaa");
        assert_eq!(sink.read_all("b").await.unwrap(), b"bb");
    }

    #[tokio::test]
    async fn test_memory_sink_round_trip() {
        let sink = MemorySink::new();
        sink.create("s1").await.unwrap();
        sink.append("s1", &[1, 2]).await.unwrap();
        sink.append("s1", &[3]).await.unwrap();

        assert_eq!(sink.read_all("s1").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(sink.len("s1").await.unwrap(), 3);
    }
}
