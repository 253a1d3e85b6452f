//! Filesystem helpers shared by the pipeline stages

use crate::exceptions::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Recursively copy a directory tree, creating the destination root
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Remove a file, tolerating its absence
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Remove a directory tree, tolerating its absence
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copies_nested_structure_and_content() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");

        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("top.bin"), b"top").unwrap();
        fs::write(src.join("a/mid.bin"), b"mid").unwrap();
        fs::write(src.join("a/b/deep.bin"), b"deep").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read(dst.join("top.bin")).unwrap(), b"top");
        assert_eq!(fs::read(dst.join("a/mid.bin")).unwrap(), b"mid");
        assert_eq!(fs::read(dst.join("a/b/deep.bin")).unwrap(), b"deep");
    }

    #[test]
    fn copy_creates_destination_root() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();

        let dst = dir.path().join("does/not/exist/yet");
        copy_dir_all(&src, &dst).unwrap();
        assert!(dst.is_dir());
    }

    #[test]
    fn tolerant_removals_accept_missing_targets() {
        let dir = TempDir::new().unwrap();
        remove_file_if_exists(&dir.path().join("gone.bin")).unwrap();
        remove_dir_if_exists(&dir.path().join("gone-dir")).unwrap();

        let file = dir.path().join("there.bin");
        fs::write(&file, b"x").unwrap();
        remove_file_if_exists(&file).unwrap();
        assert!(!file.exists());
    }
}
