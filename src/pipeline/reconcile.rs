//! Reconciliation ("unstage") of the edited working tree
//!
//! Strict allow-list policy: exactly one subtree (`ExtractedRomFS`)
//! is editable; every other file reverts to its extraction-tree
//! counterpart, and files the editor deleted outside that subtree are
//! brought back. A sentinel `.code.bin` anywhere in the tree is
//! renamed to its canonical name in place.

use crate::exceptions::Result;
use log::debug;
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

/// Sentinel filename some editors leave behind for the code binary
pub const CODE_SENTINEL: &str = ".code.bin";

/// Canonical name the sentinel is renamed to
pub const CODE_CANONICAL: &str = "code.bin";

/// The single subtree whose edits survive reconciliation
pub const EDITABLE_SUBTREE: &str = "ExtractedRomFS";

fn in_editable_subtree(rel: &Path) -> bool {
    rel.components()
        .any(|c| matches!(c, Component::Normal(name) if name == OsStr::new(EDITABLE_SUBTREE)))
}

/// Reconcile the working tree against the extraction tree: revert
/// everything outside the editable subtree to the extraction tree's
/// content, byte for byte.
///
/// Files the editor created outside the allow-list have no counterpart
/// to revert to and are removed; files it deleted outside the
/// allow-list are restored.
pub fn run(working: &Path, extraction: &Path) -> Result<()> {
    // Snapshot the tree first; renames during the walk must not make
    // the renamed file show up again as a later entry
    let mut files = Vec::new();
    for entry in WalkDir::new(working) {
        let entry = entry
            .map_err(|e| crate::exceptions::LunaError::Generic(format!("Walk failed: {e}")))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    for path in &files {
        if path.file_name() == Some(OsStr::new(CODE_SENTINEL)) {
            let canonical = path.with_file_name(CODE_CANONICAL);
            debug!("Renaming {} -> {}", path.display(), canonical.display());
            fs::rename(path, canonical)?;
            continue;
        }

        let rel = match path.strip_prefix(working) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if in_editable_subtree(rel) {
            continue;
        }

        let source = extraction.join(rel);
        if source.is_file() {
            fs::copy(&source, path)?;
        } else {
            debug!("Dropping stray file {}", rel.display());
            fs::remove_file(path)?;
        }
    }

    // Files the editor deleted outside the allow-list come back from
    // the extraction tree
    for entry in WalkDir::new(extraction) {
        let entry = entry
            .map_err(|e| crate::exceptions::LunaError::Generic(format!("Walk failed: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = match entry.path().strip_prefix(extraction) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if in_editable_subtree(rel) {
            continue;
        }

        let target = working.join(rel);
        if !target.exists() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            debug!("Restoring deleted file {}", rel.display());
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
