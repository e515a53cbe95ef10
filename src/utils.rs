use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Write a file.
pub(crate) async fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, contents)
        .await
        .context(format!("Unable to write to {}", path.to_string_lossy()))
}

/// Read a file to a `String`.
pub(crate) async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read file at {}", path.display()))
}

/// Create a directory and its parents if they do not exist.
pub(crate) async fn make_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Unable to create directory at {}", path.to_string_lossy()))
}

/// Resolve `path` to an absolute path with symlinks removed. The path must exist.
pub(crate) async fn canonicalize(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    tokio::fs::canonicalize(path).await.with_context(|| {
        format!(
            "Unable to canonicalize the path {}",
            path.to_string_lossy()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        write(&path, "xin chào").await.unwrap();
        assert_eq!(read(&path).await.unwrap(), "xin chào");
    }

    #[tokio::test]
    async fn test_make_dir_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        make_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        // Creating again is fine
        make_dir(&nested).await.unwrap();
    }

    #[tokio::test]
    async fn test_canonicalize_missing() {
        let dir = TempDir::new().unwrap();
        assert!(canonicalize(dir.path().join("missing")).await.is_err());
    }
}
