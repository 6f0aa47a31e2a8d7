use crate::error::{DbxError, Result};
use std::fs::File;
use std::path::Path;
use tracing::debug;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => DbxError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DbxError::from(e),
        })?;
    }
    Ok(())
}

pub fn is_existing_dir(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Create or truncate a local download target.
pub fn create_output_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| DbxError::LocalWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove a partially written download target, ignoring failures.
pub fn remove_partial_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        debug!(path = %path.display(), error = %e, "could not remove partial file");
    }
}

#[cfg(unix)]
pub fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir_exists(&nested).unwrap();
        assert!(is_existing_dir(&nested));
        ensure_dir_exists(&nested).unwrap();
    }

    #[test]
    fn test_is_existing_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("f.txt");
        std::fs::write(&file, b"x").unwrap();

        assert!(is_existing_dir(tmp.path()));
        assert!(!is_existing_dir(&file));
        assert!(!is_existing_dir(&tmp.path().join("missing")));
    }

    #[test]
    fn test_create_output_file_truncates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.bin");
        std::fs::write(&path, b"old contents that are long").unwrap();

        let mut file = create_output_file(&path).unwrap();
        file.write_all(b"new").unwrap();
        drop(file);

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_create_output_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing-dir").join("out.bin");

        match create_output_file(&path) {
            Err(DbxError::LocalWriteFailed { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected LocalWriteFailed, got {other:?}"),
        }
    }
}
