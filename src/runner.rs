//! External tool invocation

use crate::exceptions::{LunaError, Result};
use log::{debug, warn};
use std::path::Path;
use std::process::{Command, Stdio};

/// What to do when an external tool exits non-zero.
///
/// The legacy behavior is `Permissive`: exit codes are logged and
/// discarded, and the pipeline proceeds. `Strict` turns any non-zero
/// exit into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log non-zero exits at `warn` and keep going (legacy)
    #[default]
    Permissive,
    /// Fail the pipeline on the first non-zero exit
    Strict,
}

/// Resolve an executable name via PATH.
///
/// Absolute Unix paths are reduced to their basename first, so a
/// configured `/usr/local/bin/3dstool` still resolves on machines
/// where it lives elsewhere. Falls back to the basename if resolution
/// fails.
pub fn resolve_executable(executable: &str) -> String {
    let exec_name = if executable.starts_with('/') {
        executable.rsplit('/').next().unwrap_or(executable)
    } else {
        executable
    };

    if let Ok(path) = which::which(exec_name) {
        let resolved = path.to_string_lossy().to_string();
        debug!("🔍 Resolved '{executable}' to '{resolved}'");
        resolved
    } else {
        debug!("⚠️  Could not resolve '{executable}' in PATH, using '{exec_name}'");
        exec_name.to_string()
    }
}

/// Runs one external tool repeatedly with a fixed failure policy
#[derive(Debug, Clone)]
pub struct ToolRunner {
    tool: String,
    policy: FailurePolicy,
}

impl ToolRunner {
    /// Create a runner for `tool`
    pub fn new(tool: &str, policy: FailurePolicy) -> Self {
        ToolRunner {
            tool: tool.to_string(),
            policy,
        }
    }

    /// Run the tool with the given arguments, output captured.
    ///
    /// A failure to spawn at all (tool not installed) is an IO error
    /// under either policy; only non-zero exits are policy-dependent.
    pub fn run(&self, args: &[String]) -> Result<()> {
        debug!("🏃 Running: {} {:?}", self.tool, args);

        let output = Command::new(resolve_executable(&self.tool))
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        if output.status.success() {
            return Ok(());
        }

        let status = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match self.policy {
            FailurePolicy::Permissive => {
                warn!(
                    "Tool '{}' exited with status {status}, continuing: {}",
                    self.tool,
                    stderr.trim()
                );
                Ok(())
            }
            FailurePolicy::Strict => Err(LunaError::Tool {
                tool: self.tool.clone(),
                status,
                stderr,
            }),
        }
    }

    /// Run every command in sequence
    pub fn run_all(&self, commands: &[Vec<String>]) -> Result<()> {
        for args in commands {
            self.run(args)?;
        }
        Ok(())
    }
}

/// Launch an interactive program against a tree and block until it
/// exits. Stdio is inherited; the exit status is always ignored.
pub fn run_interactive(program: &str, tree: &Path) -> Result<()> {
    debug!("🏃 Launching editor: {program} {}", tree.display());

    let status = Command::new(resolve_executable(program)).arg(tree).status()?;
    debug!("Editor exited with {status}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_basename() {
        let resolved = resolve_executable("/no/such/dir/definitely-not-a-real-tool");
        assert_eq!(resolved, "definitely-not-a-real-tool");
    }

    #[cfg(unix)]
    #[test]
    fn permissive_tolerates_failure() {
        let runner = ToolRunner::new("false", FailurePolicy::Permissive);
        assert!(runner.run(&[]).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn strict_reports_failure() {
        let runner = ToolRunner::new("false", FailurePolicy::Strict);
        match runner.run(&[]) {
            Err(LunaError::Tool { status, .. }) => assert_ne!(status, 0),
            other => panic!("expected tool error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn strict_accepts_success() {
        let runner = ToolRunner::new("true", FailurePolicy::Strict);
        assert!(runner.run(&["ignored".to_string()]).is_ok());
    }

    #[test]
    fn missing_tool_is_an_io_error_even_when_permissive() {
        let runner = ToolRunner::new(
            "lunahack-test-tool-that-does-not-exist",
            FailurePolicy::Permissive,
        );
        match runner.run(&[]) {
            Err(LunaError::Io(_)) => {}
            other => panic!("expected IO error, got {other:?}"),
        }
    }
}
