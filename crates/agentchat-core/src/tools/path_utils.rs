//! Shared path validation utilities for tool implementations

use std::path::{Path, PathBuf};

use crate::tools::registry::ToolResult;

/// Resolve `path` against `root` and make sure it stays inside it.
///
/// Both sides are canonicalized, so `..` segments and symlinks pointing
/// outside the root are rejected.
pub fn validate_path(path: &str, root: &Path) -> Result<PathBuf, ToolResult> {
    let resolved = if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        root.join(path)
    };

    let root = root
        .canonicalize()
        .map_err(|e| ToolResult::error(format!("Cannot resolve project root: {}", e)))?;

    let canonical = resolved.canonicalize().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolResult::error(format!("File not found: {}", path))
        } else {
            ToolResult::error(format!("Cannot resolve path '{}': {}", path, e))
        }
    })?;

    if !canonical.starts_with(&root) {
        return Err(ToolResult::error(format!(
            "Access denied: path '{}' is outside the project root",
            path
        )));
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_paths_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hi").unwrap();

        let path = validate_path("a.txt", dir.path()).unwrap();
        assert!(path.ends_with("a.txt"));
    }

    #[test]
    fn rejects_traversal() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "s").unwrap();

        let err = validate_path("../secret.txt", &root).unwrap_err();
        assert!(err.is_error);
        assert!(err.output.contains("outside the project root"));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), "s").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link")).unwrap();

        assert!(validate_path("link", &root).is_err());
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_path("nope.txt", dir.path()).unwrap_err();
        assert!(err.output.contains("File not found"));
    }
}
