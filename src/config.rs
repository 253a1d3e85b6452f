//! Session configuration and the static partition map
//!
//! Everything a pipeline stage needs to know is captured once, up
//! front, in an immutable [`SessionConfig`] value that is passed down
//! by reference. Stages never mutate shared state.

use crate::runner::FailurePolicy;
use std::path::{Path, PathBuf};

/// Relative name of the extraction tree
pub const EXTRACT_DIR: &str = "original";

/// Relative name of the working tree handed to the editor
pub const WORKING_DIR: &str = "modded";

/// Default archive (de)packer binary
pub const DEFAULT_PACKER: &str = "3dstool";

/// Default interactive editor binary
pub const DEFAULT_EDITOR: &str = "pk3DS";

/// Generated partition blobs at or below this size are placeholder
/// partitions and get pruned after repacking
pub const PRUNE_THRESHOLD: u64 = 20_000;

/// One logical partition of a cartridge image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Partition index as understood by the packer (`-0` .. `-7`)
    pub index: u8,
    /// Logical name, empty for the primary content partition
    pub name: &'static str,
}

impl Partition {
    /// The primary (executable content) partition is packed as CXI,
    /// everything else as CFA
    pub fn is_primary(&self) -> bool {
        self.index == 0
    }
}

/// Fixed, ordered partition map. Drives which extraction and packing
/// commands are generated and in what order.
pub const PARTITIONS: [Partition; 5] = [
    Partition { index: 0, name: "" },
    Partition {
        index: 1,
        name: "Manual",
    },
    Partition {
        index: 2,
        name: "DownloadPlay",
    },
    Partition {
        index: 6,
        name: "N3DSUpdate",
    },
    Partition {
        index: 7,
        name: "O3DSUpdate",
    },
];

/// Immutable per-session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Input image filename (relative to the working directory)
    pub rom: PathBuf,
    /// Output image filename, derived from the input name
    pub output: PathBuf,
    /// Extraction tree root
    pub extract_dir: PathBuf,
    /// Working tree root
    pub working_dir: PathBuf,
    /// Packer binary name or path
    pub packer: String,
    /// Editor binary name or path
    pub editor: String,
    /// Subprocess failure policy for packer invocations
    pub policy: FailurePolicy,
    /// Preserve the extraction tree at session end (fingerprint cache)
    pub keep_cache: bool,
    /// Preserve the working tree at session end (debugging aid)
    pub keep_working: bool,
}

impl SessionConfig {
    /// Build a config for the given input image with default layout
    /// and tool names
    pub fn new(rom: impl Into<PathBuf>) -> Self {
        let rom = rom.into();
        let output = crate::discovery::output_name(&rom);
        SessionConfig {
            rom,
            output,
            extract_dir: PathBuf::from(EXTRACT_DIR),
            working_dir: PathBuf::from(WORKING_DIR),
            packer: DEFAULT_PACKER.to_string(),
            editor: DEFAULT_EDITOR.to_string(),
            policy: FailurePolicy::default(),
            keep_cache: true,
            keep_working: false,
        }
    }

    /// Path of a blob or subdirectory inside the extraction tree,
    /// rendered as a command-line argument
    pub fn blob(&self, name: &str) -> String {
        path_arg(&self.extract_dir.join(name))
    }

    /// Path of an entry inside the working tree, rendered as a
    /// command-line argument
    pub fn working(&self, name: &str) -> String {
        path_arg(&self.working_dir.join(name))
    }
}

/// Render a path as a single subprocess argument
pub fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
