//! Image discovery and output naming

use crate::exceptions::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Input image extension, matched case-insensitively
pub const IMAGE_EXT: &str = ".3ds";

/// Suffix appended to the stem of the output image
pub const OUTPUT_SUFFIX: &str = "_modded";

/// Scan a directory for candidate images.
///
/// Matches `*.3ds` case-insensitively and excludes files already
/// carrying the output suffix. Results are sorted for a stable
/// selection prompt.
pub fn find_images(dir: &Path) -> Result<Vec<String>> {
    let output_marker = format!("{OUTPUT_SUFFIX}{IMAGE_EXT}");
    let mut images = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let lower = name.to_lowercase();
        if lower.ends_with(IMAGE_EXT) && !lower.ends_with(&output_marker) {
            images.push(name);
        }
    }

    images.sort();
    Ok(images)
}

/// Derive the output image name: stem + suffix + original extension.
///
/// `game.3ds` becomes `game_modded.3ds`; the extension keeps whatever
/// case the input used.
pub fn output_name(rom: &Path) -> PathBuf {
    let stem = rom
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = rom
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = if ext.is_empty() {
        format!("{stem}{OUTPUT_SUFFIX}")
    } else {
        format!("{stem}{OUTPUT_SUFFIX}.{ext}")
    };

    match rom.parent() {
        Some(parent) if parent != Path::new("") => parent.join(name),
        _ => PathBuf::from(name),
    }
}
