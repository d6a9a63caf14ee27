//
// project_root.rs
//
// Resolve the directory `alwaysInclude` patterns are relative to
//
// The host reports a project root alongside each open file. Some editors
// leave it empty; in that case we fall back to the git repository root of
// the first open file. That lookup is best-effort: any failure resolves to
// "no root" and the session carries on.
//

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::process::Command;

use crate::debug::{debug, DebugKind};

/// Fallible lookup of a project boundary starting from a directory.
#[async_trait(?Send)]
pub trait ProjectRootLocator {
    /// Return the enclosing project root of `start_dir`, or `None`.
    async fn locate(&self, start_dir: &Path) -> Option<PathBuf>;
}

/// Locates the project root with `git rev-parse --show-toplevel`.
#[derive(Debug, Clone)]
pub struct GitRootLocator {
    git_path: PathBuf,
    timeout: Duration,
}

impl Default for GitRootLocator {
    fn default() -> Self {
        Self {
            git_path: PathBuf::from("git"),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl GitRootLocator {
    /// Upper bound on a single git invocation.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_git_path(mut self, git_path: PathBuf) -> Self {
        self.git_path = git_path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run git and return the trimmed top-level directory.
    pub async fn show_toplevel(&self, cwd: &Path) -> Result<PathBuf> {
        let mut cmd = Command::new(&self.git_path);
        cmd.args(["rev-parse", "--show-toplevel"])
            .current_dir(cwd)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn git in {}", cwd.display()))?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.with_context(|| format!("failed to run git in {}", cwd.display()))?,
            Err(_) => {
                return Err(anyhow!("git rev-parse timed out after {:?}", self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "git rev-parse --show-toplevel failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() {
            return Err(anyhow!("git rev-parse --show-toplevel returned empty path"));
        }
        Ok(PathBuf::from(root))
    }
}

#[async_trait(?Send)]
impl ProjectRootLocator for GitRootLocator {
    async fn locate(&self, start_dir: &Path) -> Option<PathBuf> {
        match self.show_toplevel(start_dir).await {
            Ok(root) => Some(root),
            Err(e) => {
                log::trace!("git root lookup failed: {:#}", e);
                None
            }
        }
    }
}

/// Lowercase a path so it compares equal to host-folded file names.
pub fn fold_path(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}

/// Determine the project root for a session.
///
/// Uses the first open file: its host-reported root when present, otherwise
/// the root found by `locator` starting from the file's directory. The path
/// is returned as reported; callers fold it with [`fold_path`] before
/// comparing it against file names.
pub async fn resolve_project_root(
    open_files: &IndexMap<String, Option<PathBuf>>,
    locator: &dyn ProjectRootLocator,
    debug_enabled: bool,
) -> Option<PathBuf> {
    let Some((open_file, reported_root)) = open_files.first() else {
        debug(
            debug_enabled,
            "getProjectRootPath",
            "no open files found",
            DebugKind::Err,
        );
        return None;
    };

    // Some editors report an empty root instead of none
    if let Some(root) = reported_root.as_ref().filter(|root| !root.as_os_str().is_empty()) {
        return Some(root.clone());
    }

    debug(
        debug_enabled,
        "getProjectRootPath",
        "using fallback to find projectRootPath by the git repository root",
        DebugKind::Info,
    );

    let start_dir = Path::new(open_file)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    match locator.locate(&start_dir).await {
        Some(root) => Some(root),
        None => {
            debug(
                debug_enabled,
                "getProjectRootPath",
                &format!(
                    "error finding the git repository root from {}",
                    start_dir.display()
                ),
                DebugKind::Err,
            );
            None
        }
    }
}
