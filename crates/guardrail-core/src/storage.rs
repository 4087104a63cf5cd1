//! Blob storage collaborator seam.
//!
//! The engine treats storage paths as opaque strings: it saves bytes,
//! remembers the path it got back, and later opens or deletes through the
//! same interface. The built-in implementation keeps files flat under an
//! evidence directory and qualifies colliding names so no save ever
//! overwrites an earlier one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TrackerError};

/// External byte-storage collaborator.
pub trait BlobStore: Send + Sync {
    /// Persist bytes under a name derived from `suggested_name`, returning
    /// the opaque storage path for later retrieval.
    fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String>;

    /// Read back the bytes at a previously issued storage path.
    fn open(&self, path: &str) -> Result<Vec<u8>>;

    /// Discard the bytes at a previously issued storage path. Deleting a
    /// path that is already gone is not an error.
    fn delete(&self, path: &str) -> Result<()>;
}

/// Filesystem-backed blob store rooted at an evidence directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at the given directory. The directory is
    /// created lazily on the first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Strips path separators and other hostile characters so a suggested
    /// name can never escape the evidence directory.
    fn sanitize(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        let trimmed = cleaned.trim_matches(|c| c == '-' || c == '.');
        if trimmed.is_empty() {
            "evidence".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Picks a path under the root that does not exist yet, qualifying the
    /// name with a counter on collision.
    fn unique_path(&self, suggested_name: &str) -> PathBuf {
        let sanitized = Self::sanitize(suggested_name);
        let candidate = self.root.join(&sanitized);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, extension) = match sanitized.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{ext}")),
            _ => (sanitized, String::new()),
        };

        let mut counter = 1u32;
        loop {
            let candidate = self.root.join(format!("{stem}-{counter}{extension}"));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }
}

impl BlobStore for FsBlobStore {
    fn save(&self, bytes: &[u8], suggested_name: &str) -> Result<String> {
        fs::create_dir_all(&self.root).map_err(|e| TrackerError::FileSystem {
            path: self.root.clone(),
            source: e,
        })?;

        let path = self.unique_path(suggested_name);
        fs::write(&path, bytes).map_err(|e| TrackerError::FileSystem {
            path: path.clone(),
            source: e,
        })?;

        Ok(path.to_string_lossy().into_owned())
    }

    fn open(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| TrackerError::FileSystem {
            path: Path::new(path).to_path_buf(),
            source: e,
        })
    }

    fn delete(&self, path: &str) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrackerError::FileSystem {
                path: Path::new(path).to_path_buf(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store() -> (TempDir, FsBlobStore) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FsBlobStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_save_and_open_round_trip() {
        let (_dir, store) = store();
        let path = store.save(b"inspection report", "report.md").unwrap();
        assert_eq!(store.open(&path).unwrap(), b"inspection report");
    }

    #[test]
    fn test_save_never_overwrites() {
        let (_dir, store) = store();
        let first = store.save(b"first", "report.md").unwrap();
        let second = store.save(b"second", "report.md").unwrap();
        assert_ne!(first, second);
        assert_eq!(store.open(&first).unwrap(), b"first");
        assert_eq!(store.open(&second).unwrap(), b"second");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store) = store();
        let path = store.save(b"bytes", "report.md").unwrap();
        store.delete(&path).unwrap();
        store.delete(&path).unwrap();
        assert!(store.open(&path).is_err());
    }

    #[test]
    fn test_sanitize_strips_separators() {
        assert_eq!(FsBlobStore::sanitize("../../etc/passwd"), "etc-passwd");
        assert_eq!(FsBlobStore::sanitize("plan 2025.pdf"), "plan-2025.pdf");
        assert_eq!(FsBlobStore::sanitize("///"), "evidence");
    }
}
