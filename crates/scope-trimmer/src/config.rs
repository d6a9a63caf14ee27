//
// config.rs
//
// Plugin configuration: defaults, inline session settings and the
// per-project config file, merged into one record per session
//

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::debug::{debug, DebugKind};
use crate::host::PluginCreateInfo;
use crate::project_root::{fold_path, resolve_project_root, ProjectRootLocator};

/// Name of the per-project config file, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "scope-trimmer.json";

/// Older name of the config file, still read when [`CONFIG_FILE_NAME`] is
/// absent so existing project setups keep working.
pub const LEGACY_CONFIG_FILE_NAME: &str = "ts-scope-trimmer.json";

/// User-facing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Whether the plugin intercepts anything at all
    pub enabled: bool,
    /// Whether per-call diagnostics are written to the log
    pub debug: bool,
    /// Glob patterns, relative to the project root, that are always in scope
    pub always_include: Vec<String>,
}

/// A config source in which any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialUserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_include: Option<Vec<String>>,
}

impl PartialUserConfig {
    /// Extract the known fields from a JSON object.
    ///
    /// Fields with an unexpected JSON type are skipped individually; the
    /// remaining fields still apply. Non-string entries in `alwaysInclude`
    /// are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use scope_trimmer::config::PartialUserConfig;
    ///
    /// let value = serde_json::json!({ "name": "scope-trimmer", "enabled": true });
    /// let partial = PartialUserConfig::from_json(&value);
    /// assert_eq!(partial.enabled, Some(true));
    /// assert_eq!(partial.debug, None);
    /// ```
    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut partial = Self::default();

        if let Some(v) = value.get("enabled").and_then(|v| v.as_bool()) {
            partial.enabled = Some(v);
        }
        if let Some(v) = value.get("debug").and_then(|v| v.as_bool()) {
            partial.debug = Some(v);
        }
        if let Some(patterns) = value.get("alwaysInclude").and_then(|v| v.as_array()) {
            partial.always_include = Some(
                patterns
                    .iter()
                    .filter_map(|p| p.as_str())
                    .map(str::to_string)
                    .collect(),
            );
        }

        partial
    }

    /// Overlay the fields present in `self` onto `base`.
    pub fn apply_to(&self, base: &mut UserConfig) {
        if let Some(v) = self.enabled {
            base.enabled = v;
        }
        if let Some(v) = self.debug {
            base.debug = v;
        }
        if let Some(v) = &self.always_include {
            base.always_include = v.clone();
        }
    }
}

/// Effective configuration of one project session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub enabled: bool,
    pub debug: bool,
    pub always_include: Vec<String>,
    /// Lowercased base directory for `always_include` matching
    pub project_root_path: Option<PathBuf>,
}

impl Config {
    /// Merge config sources with priority: file > session > defaults.
    ///
    /// The project root always comes from root resolution, never from a
    /// config source.
    pub fn merge(
        session: &PartialUserConfig,
        file: Option<&PartialUserConfig>,
        project_root_path: Option<PathBuf>,
    ) -> Self {
        let mut user = UserConfig::default();
        session.apply_to(&mut user);
        if let Some(file) = file {
            file.apply_to(&mut user);
        }

        Self {
            enabled: user.enabled,
            debug: user.debug,
            always_include: user.always_include,
            project_root_path,
        }
    }

    /// Compact JSON rendering for log lines.
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Read and parse a config file.
pub fn read_config_file(path: &Path) -> Result<PartialUserConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(PartialUserConfig::from_json(&value))
}

/// Load the config file from the project root.
///
/// [`CONFIG_FILE_NAME`] wins over [`LEGACY_CONFIG_FILE_NAME`] when both
/// exist. A missing root or a missing file yields `None`. A file that
/// cannot be read or parsed is logged and also yields `None`; it never
/// fails the session.
pub fn load_config_file(
    project_root_path: Option<&Path>,
    debug_enabled: bool,
) -> Option<PartialUserConfig> {
    let root = project_root_path?;
    let Some(config_path) = [CONFIG_FILE_NAME, LEGACY_CONFIG_FILE_NAME]
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.exists())
    else {
        debug(
            debug_enabled,
            "loadConfigFile",
            &format!(
                "config file not found at {}",
                root.join(CONFIG_FILE_NAME).display()
            ),
            DebugKind::Info,
        );
        return None;
    };

    match read_config_file(&config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            debug(
                debug_enabled,
                "loadConfigFile",
                &format!(
                    "error parsing config file at {}: {:#}",
                    config_path.display(),
                    e
                ),
                DebugKind::Err,
            );
            None
        }
    }
}

/// Build the effective config for a new project session.
///
/// Resolves the project root first, since the config file lives there. The
/// file is read from the root as reported; the stored root is lowercased
/// for matching against folded file names. Diagnostics emitted before the
/// merge are gated on the inline session settings.
pub async fn load_config(info: &PluginCreateInfo, locator: &dyn ProjectRootLocator) -> Config {
    let session = PartialUserConfig::from_json(&info.config);
    let session_debug = session.debug.unwrap_or(false);

    let open_files = info.project_service.open_files();
    let reported_root = resolve_project_root(&open_files, locator, session_debug).await;

    if reported_root.is_none() {
        debug(
            session_debug,
            "loadConfig",
            &format!(
                "no project root path found, which means: user config from {} won't be loaded; \"alwaysInclude\" might work incorrectly if there are relative paths",
                CONFIG_FILE_NAME
            ),
            DebugKind::Info,
        );
    }

    let file = load_config_file(reported_root.as_deref(), session_debug);
    let project_root_path = reported_root.as_deref().map(fold_path);
    let config = Config::merge(&session, file.as_ref(), project_root_path);

    let render = |partial: Option<&PartialUserConfig>| {
        partial
            .and_then(|p| serde_json::to_string(p).ok())
            .unwrap_or_else(|| "null".to_string())
    };
    debug(
        config.debug,
        "loadConfig",
        &format!(
            "plugin config: {} | file config: {} | projectRootPath: {:?}",
            render(Some(&session)),
            render(file.as_ref()),
            config.project_root_path
        ),
        DebugKind::Info,
    );

    config
}
