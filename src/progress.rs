//! Scoped terminal spinner
//!
//! Cosmetic only. The spinner is a resource: acquired at stage start,
//! released on every exit path via `Drop`, including early returns
//! from `?`.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a named pipeline stage is in progress
#[derive(Debug)]
pub struct StageSpinner {
    bar: ProgressBar,
    finished: bool,
}

impl StageSpinner {
    /// Start spinning with the given message
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        StageSpinner {
            bar,
            finished: false,
        }
    }

    /// Stop the spinner and leave a final line on the terminal
    pub fn finish_with_message(mut self, message: &str) {
        self.bar.finish_with_message(message.to_string());
        self.finished = true;
    }
}

impl Drop for StageSpinner {
    fn drop(&mut self) {
        // Clear the in-progress line unless an explicit finish already
        // printed a final one
        if !self.finished {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_is_released_on_drop() {
        let spinner = StageSpinner::start("working...");
        drop(spinner);
    }

    #[test]
    fn explicit_finish_then_drop_is_fine() {
        let spinner = StageSpinner::start("working...");
        spinner.finish_with_message("done");
    }

    #[test]
    fn spinner_survives_early_exit_paths() {
        fn fallible() -> Result<(), ()> {
            let _spinner = StageSpinner::start("doomed stage");
            Err(())
        }
        assert!(fallible().is_err());
    }
}
