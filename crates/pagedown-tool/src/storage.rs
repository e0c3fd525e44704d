//! Writing Markdown to disk.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::{Result, ToolError};

/// Write `content` to `path`, creating missing parent directories.
///
/// Returns the number of bytes written.
pub fn save_markdown(path: &Path, content: &str) -> Result<usize> {
    let io_err = |source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)?;

    info!(path = %path.display(), bytes = content.len(), "saved markdown");
    Ok(content.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes/2024/page.md");

        let written = save_markdown(&path, "# Título\n").unwrap();

        assert_eq!(written, "# Título\n".len());
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Título\n");
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.md");
        save_markdown(&path, "old content").unwrap();
        save_markdown(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_save_into_file_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = save_markdown(&blocker.join("page.md"), "x").unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to write"));
    }
}
