//! High-level API for lunahack operations

use crate::config::SessionConfig;
use crate::discovery;
use crate::exceptions::{LunaError, Result};
use crate::prompts;
use crate::runner::FailurePolicy;
use crate::session::Session;
use std::env;
use std::path::PathBuf;

/// Options for running a modding session
#[derive(Debug, Default)]
pub struct SessionOptions {
    /// Use this image instead of scanning the working directory
    pub image: Option<PathBuf>,
    /// Subprocess failure policy for packer invocations
    pub policy: FailurePolicy,
    /// Override the packer binary
    pub packer: Option<String>,
    /// Override the editor binary
    pub editor: Option<String>,
    /// Remove the extraction tree at session end instead of keeping
    /// it as the fingerprint cache
    pub no_cache: bool,
    /// Keep the working tree at session end (debugging aid)
    pub keep_working: bool,
}

/// Run a full modding session and return the output image path.
///
/// Without an explicit image this scans the current working directory;
/// zero candidates is an error, one is auto-selected, several go
/// through an interactive choice.
pub fn run_session(options: SessionOptions) -> Result<PathBuf> {
    let rom = match options.image {
        Some(image) => image,
        None => select_image()?,
    };

    let mut cfg = SessionConfig::new(rom);
    cfg.policy = options.policy;
    cfg.keep_cache = !options.no_cache;
    cfg.keep_working = options.keep_working;
    if let Some(packer) = options.packer {
        cfg.packer = packer;
    }
    if let Some(editor) = options.editor {
        cfg.editor = editor;
    }

    let output = cfg.output.clone();
    Session::new(cfg).run()?;
    Ok(output)
}

fn select_image() -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    let images = discovery::find_images(&cwd)?;

    match images.as_slice() {
        [] => {
            prompts::acknowledge_no_images()?;
            Err(LunaError::NoImages)
        }
        [only] => Ok(PathBuf::from(only)),
        _ => Ok(PathBuf::from(prompts::pick_image(&images)?)),
    }
}
