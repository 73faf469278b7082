//! Directory-backed slots: one `<key>.json` file per slot

use super::SnapshotSlot;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

/// Slot backend storing each key as a file inside `dir`
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl SnapshotSlot for FileSlot {
    async fn read(&self, key: &str) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, key: &str, text: &str) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write aside then rename so a crash never leaves a half-written slot
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        assert!(slot.read("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("nested"));

        slot.write("profitLossDB", "[1]").await.unwrap();
        slot.write("profitLossDB", "[1,2]").await.unwrap();

        assert_eq!(
            slot.read("profitLossDB").await.unwrap().as_deref(),
            Some("[1,2]")
        );
        assert!(slot.path_for("profitLossDB").exists());
        assert!(!dir.path().join("nested").join(".profitLossDB.json.tmp").exists());
    }
}
