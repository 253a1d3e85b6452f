//! Extraction-tree cache management
//!
//! A previously built extraction tree is reusable only if its sentinel
//! fingerprint file matches the current image. The sentinel is a
//! zero-byte file named `<digest>.hash` at the tree root.

use crate::exceptions::Result;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Extension of the sentinel fingerprint file
pub const SENTINEL_EXT: &str = "hash";

/// Read the digest encoded in the tree's sentinel file, if any.
///
/// Returns `None` when the tree has no sentinel (including when the
/// tree itself does not exist).
pub fn sentinel_digest(tree: &Path) -> Result<Option<String>> {
    if !tree.is_dir() {
        return Ok(None);
    }

    for entry in fs::read_dir(tree)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(SENTINEL_EXT) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                return Ok(Some(stem.to_string()));
            }
        }
    }

    Ok(None)
}

/// Write a fresh sentinel for `digest`, replacing any previous one
pub fn write_sentinel(tree: &Path, digest: &str) -> Result<()> {
    if let Some(old) = sentinel_digest(tree)? {
        fs::remove_file(tree.join(format!("{old}.{SENTINEL_EXT}")))?;
    }

    fs::File::create(tree.join(format!("{digest}.{SENTINEL_EXT}")))?;
    debug!("Wrote sentinel {digest}.{SENTINEL_EXT}");
    Ok(())
}

/// Decide whether an existing extraction tree may be reused for an
/// image with the given fingerprint.
///
/// A stale or sentinel-less tree is removed entirely; the caller must
/// re-run extraction afterwards.
pub fn reuse_or_discard(tree: &Path, digest: &str) -> Result<bool> {
    if !tree.is_dir() {
        return Ok(false);
    }

    match sentinel_digest(tree)? {
        Some(found) if found == digest => {
            info!("Extraction cache is valid, skipping unpack");
            Ok(true)
        }
        Some(found) => {
            info!("Extraction cache is stale ({found} != {digest}), discarding");
            fs::remove_dir_all(tree)?;
            Ok(false)
        }
        None => {
            info!("Extraction tree has no fingerprint sentinel, discarding");
            fs::remove_dir_all(tree)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_tree_is_not_reusable() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("original");
        assert!(!reuse_or_discard(&tree, "abcd").unwrap());
    }

    #[test]
    fn matching_sentinel_allows_reuse() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("original");
        fs::create_dir(&tree).unwrap();
        write_sentinel(&tree, "00ffee1122334455").unwrap();

        assert!(reuse_or_discard(&tree, "00ffee1122334455").unwrap());
        assert!(tree.exists());
    }

    #[test]
    fn stale_sentinel_discards_tree() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("original");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("HeaderNCCH.bin"), b"header").unwrap();
        write_sentinel(&tree, "1111111111111111").unwrap();

        assert!(!reuse_or_discard(&tree, "2222222222222222").unwrap());
        assert!(!tree.exists());
    }

    #[test]
    fn sentinel_less_tree_discards_tree() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path().join("original");
        fs::create_dir(&tree).unwrap();
        fs::write(tree.join("leftover.bin"), b"junk").unwrap();

        assert!(!reuse_or_discard(&tree, "abcd").unwrap());
        assert!(!tree.exists());
    }

    #[test]
    fn write_sentinel_replaces_previous() {
        let dir = TempDir::new().unwrap();
        let tree = dir.path();
        write_sentinel(tree, "aaaaaaaaaaaaaaaa").unwrap();
        write_sentinel(tree, "bbbbbbbbbbbbbbbb").unwrap();

        assert_eq!(
            sentinel_digest(tree).unwrap().as_deref(),
            Some("bbbbbbbbbbbbbbbb")
        );
        assert!(!tree.join("aaaaaaaaaaaaaaaa.hash").exists());
        assert_eq!(
            fs::metadata(tree.join("bbbbbbbbbbbbbbbb.hash"))
                .unwrap()
                .len(),
            0
        );
    }
}
