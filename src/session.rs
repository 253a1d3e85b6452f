//! Session orchestration
//!
//! Runs the whole pipeline sequentially: cache check / extraction,
//! working-tree duplication, editor loop, reconciliation, repack,
//! cleanup. The post-edit prompt is an explicit finite-state loop over
//! {proceed, retry-edit, abort}, not recursion.

use crate::cache;
use crate::config::SessionConfig;
use crate::exceptions::{LunaError, Result};
use crate::fingerprint;
use crate::fsutil::{copy_dir_all, remove_dir_if_exists, remove_file_if_exists};
use crate::pipeline::{extract, rebuild, reconcile};
use crate::progress::StageSpinner;
use crate::prompts::{self, PostEditChoice};
use crate::runner::{self, ToolRunner};
use log::info;

/// One extraction/edit/repack session over a single image
#[derive(Debug)]
pub struct Session {
    cfg: SessionConfig,
}

impl Session {
    /// Create a session from an immutable configuration
    pub fn new(cfg: SessionConfig) -> Self {
        Session { cfg }
    }

    /// The session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    /// Run the session end to end
    pub fn run(&self) -> Result<()> {
        let cfg = &self.cfg;
        let runner = ToolRunner::new(&cfg.packer, cfg.policy);

        // Leftovers from a previous run; the extraction tree is kept
        // for the cache check below
        remove_dir_if_exists(&cfg.working_dir)?;
        remove_file_if_exists(&cfg.output)?;

        self.ensure_extraction(&runner)?;

        let spinner = StageSpinner::start("Creating modding directory. This may take a while...");
        copy_dir_all(&cfg.extract_dir, &cfg.working_dir)?;
        spinner.finish_with_message("Modding directory created.");

        self.edit_loop()?;

        reconcile::run(&cfg.working_dir, &cfg.extract_dir)?;
        rebuild::run(cfg, &runner)?;

        let spinner = StageSpinner::start("Cleaning up...");
        if !cfg.keep_working {
            remove_dir_if_exists(&cfg.working_dir)?;
        }
        if !cfg.keep_cache {
            remove_dir_if_exists(&cfg.extract_dir)?;
        }
        spinner.finish_with_message("Cleaned up.");

        info!("Grand success!");
        info!(
            "Your modded ROM has been created, and is named '{}'.",
            cfg.output.display()
        );
        Ok(())
    }

    /// Reuse a cached extraction tree when its sentinel matches the
    /// current image, otherwise unpack fresh and write a new sentinel
    fn ensure_extraction(&self, runner: &ToolRunner) -> Result<()> {
        let cfg = &self.cfg;

        let digest = {
            let _spinner = StageSpinner::start("Fingerprinting the ROM...");
            fingerprint::fingerprint_file(&cfg.rom)?
        };
        info!("ROM fingerprint is {digest}");

        if cache::reuse_or_discard(&cfg.extract_dir, &digest)? {
            return Ok(());
        }

        extract::run(cfg, runner)?;
        cache::write_sentinel(&cfg.extract_dir, &digest)?;
        Ok(())
    }

    /// Launch the editor, then loop on the three-way prompt until the
    /// user proceeds or aborts
    fn edit_loop(&self) -> Result<()> {
        let cfg = &self.cfg;

        loop {
            {
                let _spinner = StageSpinner::start(&format!(
                    "Waiting for {} to be closed...",
                    cfg.editor
                ));
                runner::run_interactive(&cfg.editor, &cfg.working_dir)?;
            }

            match prompts::post_edit_choice(&cfg.editor)? {
                PostEditChoice::Proceed => return Ok(()),
                PostEditChoice::RetryEdit => {}
                PostEditChoice::Abort => return Err(LunaError::Aborted),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FailurePolicy;
    use std::fs;
    use tempfile::TempDir;

    fn session_in(dir: &TempDir) -> Session {
        let mut cfg = SessionConfig::new(dir.path().join("game.3ds"));
        cfg.extract_dir = dir.path().join("original");
        cfg.working_dir = dir.path().join("modded");
        cfg.policy = FailurePolicy::Permissive;
        Session::new(cfg)
    }

    #[test]
    fn cached_extraction_is_reused_without_unpacking() {
        let dir = TempDir::new().unwrap();
        let session = session_in(&dir);
        let cfg = session.config();

        fs::write(&cfg.rom, b"rom bytes").unwrap();
        let digest = fingerprint::fingerprint_file(&cfg.rom).unwrap();

        fs::create_dir(&cfg.extract_dir).unwrap();
        fs::write(cfg.extract_dir.join("HeaderNCCH.bin"), b"cached").unwrap();
        cache::write_sentinel(&cfg.extract_dir, &digest).unwrap();

        // Packer binary does not exist; a cache hit must not invoke it
        let runner = ToolRunner::new("lunahack-test-no-such-packer", cfg.policy);
        session.ensure_extraction(&runner).unwrap();

        assert_eq!(
            fs::read(cfg.extract_dir.join("HeaderNCCH.bin")).unwrap(),
            b"cached"
        );
    }

    #[test]
    fn stale_extraction_is_discarded_before_unpacking() {
        let dir = TempDir::new().unwrap();
        let session = session_in(&dir);
        let cfg = session.config();

        fs::write(&cfg.rom, b"new rom bytes").unwrap();
        fs::create_dir(&cfg.extract_dir).unwrap();
        cache::write_sentinel(&cfg.extract_dir, "0000000000000000").unwrap();

        let runner = ToolRunner::new("lunahack-test-no-such-packer", cfg.policy);
        // The stale tree must be gone even though the unpack itself
        // fails to spawn the packer
        assert!(session.ensure_extraction(&runner).is_err());
        assert!(!cfg.extract_dir.join("0000000000000000.hash").exists());
    }
}
