//! Local directory backend.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{Storage, StorageError};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalStorage {
    /// The root directory is created on first save.
    pub fn new(root: PathBuf, public_url: String) -> Self {
        Self {
            root,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn save(
        &self,
        name: &str,
        content: &[u8],
        _media_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content).await?;
        tracing::debug!(path = %path.display(), size = content.len(), "Stored file");
        Ok(format!("{}/{name}", self.public_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("media"), "/media/".into());

        let url = storage.save("abc_note.pdf", b"%PDF-1.7", "application/pdf").await.unwrap();

        assert_eq!(url, "/media/abc_note.pdf");
        let written = std::fs::read(dir.path().join("media/abc_note.pdf")).unwrap();
        assert_eq!(written, b"%PDF-1.7");
    }
}
