use std::path::{Component, Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Filesystem store for uploaded workshop files.
///
/// Files live under `<base>/workshops/<workshop_id>/` and are referred to
/// everywhere else by their path relative to the base directory.
pub struct FileStorageService {
    base_path: PathBuf,
}

impl FileStorageService {
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: PathBuf::from(base_path),
        }
    }

    /// Initializes the storage directory structure
    pub async fn init(&self) -> Result<()> {
        let workshops_dir = self.base_path.join("workshops");
        if !workshops_dir.exists() {
            fs::create_dir_all(&workshops_dir).await.map_err(|e| {
                Error::Internal(format!(
                    "Failed to create storage directory {:?}: {}",
                    workshops_dir, e
                ))
            })?;
        }
        Ok(())
    }

    /// Absolute path of a stored file.
    pub fn absolute_path(&self, relative: &str) -> Result<PathBuf> {
        validate_relative_path(relative)?;
        Ok(self.base_path.join(relative))
    }

    /// Persists an uploaded file under the workshop's directory and returns
    /// the stored path relative to the base directory. The stored name is
    /// uniquified so repeated uploads never clobber each other.
    pub async fn store_workshop_file(
        &self,
        workshop_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> Result<String> {
        self.store_in(&format!("workshops/{}", workshop_id), filename, content)
            .await
    }

    /// Persists an agenda upload under the shared `agendas/` directory.
    pub async fn store_agenda(&self, filename: &str, content: &[u8]) -> Result<String> {
        self.store_in("agendas", filename, content).await
    }

    async fn store_in(&self, dir: &str, filename: &str, content: &[u8]) -> Result<String> {
        let safe_name = sanitize_filename(filename);
        let relative = format!("{}/{}_{}", dir, Uuid::now_v7(), safe_name);
        let full_path = self.base_path.join(&relative);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::Internal(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }

        fs::write(&full_path, content)
            .await
            .map_err(|e| Error::Internal(format!("Failed to write file {:?}: {}", full_path, e)))?;

        Ok(relative)
    }

    /// Reads a stored file back.
    pub async fn read_file(&self, relative: &str) -> Result<Vec<u8>> {
        let full_path = self.absolute_path(relative)?;

        if !full_path.exists() {
            return Err(Error::NotFound(format!("File not found on disk: {}", relative)));
        }

        fs::read(&full_path)
            .await
            .map_err(|e| Error::Internal(format!("Failed to read file {:?}: {}", full_path, e)))
    }

    /// Removes a stored file. Missing files are ignored; the goal "file is
    /// gone" is already met and database metadata stays authoritative.
    pub async fn remove_file(&self, relative: &str) -> Result<()> {
        let full_path = self.absolute_path(relative)?;

        if !full_path.exists() {
            return Ok(());
        }

        fs::remove_file(&full_path)
            .await
            .map_err(|e| Error::Internal(format!("Failed to remove file {:?}: {}", full_path, e)))
    }
}

/// Rejects stored paths that would escape the storage base directory.
fn validate_relative_path(relative: &str) -> Result<()> {
    let path = Path::new(relative);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(Error::field("path", "Path cannot contain parent directory references"));
    }
    Ok(())
}

/// Reduces an uploaded filename to a safe single path component.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> FileStorageService {
        let dir = std::env::temp_dir().join(format!("workshophub-test-{}", Uuid::now_v7()));
        FileStorageService::new(dir.to_str().unwrap())
    }

    #[test]
    fn test_sanitize_filename_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir\\evil.pdf"), "evil.pdf");
        assert_eq!(sanitize_filename("agenda final.pdf"), "agenda_final.pdf");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn test_validate_relative_path_rejects_traversal() {
        assert!(validate_relative_path("workshops/x/file.pdf").is_ok());
        assert!(validate_relative_path("../outside").is_err());
        assert!(validate_relative_path("workshops/../../outside").is_err());
        assert!(validate_relative_path("/etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_store_read_remove_roundtrip() {
        let storage = temp_storage();
        storage.init().await.unwrap();
        let workshop_id = Uuid::now_v7();

        let stored = storage
            .store_workshop_file(workshop_id, "agenda.pdf", b"%PDF-1.4 test")
            .await
            .unwrap();
        assert!(stored.starts_with(&format!("workshops/{}/", workshop_id)));
        assert!(stored.ends_with("_agenda.pdf"));

        let bytes = storage.read_file(&stored).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4 test");

        storage.remove_file(&stored).await.unwrap();
        assert!(storage.read_file(&stored).await.is_err());
        // Removing twice is fine.
        storage.remove_file(&stored).await.unwrap();
    }

    #[tokio::test]
    async fn test_stored_names_are_unique() {
        let storage = temp_storage();
        let workshop_id = Uuid::now_v7();

        let first = storage
            .store_workshop_file(workshop_id, "a.pdf", b"one")
            .await
            .unwrap();
        let second = storage
            .store_workshop_file(workshop_id, "a.pdf", b"two")
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(storage.read_file(&first).await.unwrap(), b"one");
        assert_eq!(storage.read_file(&second).await.unwrap(), b"two");
    }
}
