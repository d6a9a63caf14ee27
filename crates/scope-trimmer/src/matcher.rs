//
// matcher.rs
//
// "Always include" glob matching against candidate files
//

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::debug::{debug, DebugKind};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Compiled `alwaysInclude` patterns bound to a project root.
#[derive(Debug, Clone, Default)]
pub struct AlwaysIncludeMatcher {
    patterns: Vec<Pattern>,
    project_root: Option<PathBuf>,
}

impl AlwaysIncludeMatcher {
    /// Compile `patterns`. Patterns that fail to compile are logged and
    /// skipped; the remaining ones still apply.
    pub fn new(patterns: &[String], project_root: Option<PathBuf>, debug_enabled: bool) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    log::warn!("Ignoring invalid alwaysInclude pattern {:?}: {}", raw, e);
                    debug(
                        debug_enabled,
                        "AlwaysIncludeMatcher",
                        &format!("invalid pattern {:?}: {}", raw, e),
                        DebugKind::Err,
                    );
                    None
                }
            })
            .collect();

        Self {
            patterns,
            project_root,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The string a candidate is matched as.
    ///
    /// Relative to the project root when the candidate lies under it. With
    /// no root, or for a file outside the root, the absolute path is used
    /// as-is.
    pub fn match_path<'a>(&self, candidate: &'a str) -> std::borrow::Cow<'a, str> {
        let Some(root) = &self.project_root else {
            return candidate.into();
        };

        match Path::new(candidate).strip_prefix(root) {
            Ok(relative) => relative.to_string_lossy().into_owned().into(),
            Err(_) => candidate.into(),
        }
    }

    /// True when `candidate` matches any pattern.
    pub fn is_match(&self, candidate: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let path = self.match_path(candidate);
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(&path, MATCH_OPTIONS))
    }
}
