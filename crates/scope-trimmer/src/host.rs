//
// host.rs
//
// Capabilities the plugin consumes from the language-service host
//
// The host owns all of these objects. The plugin only wraps them: it never
// changes a signature, so the host cannot tell a wrapped member from the
// original one.
//

use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;

/// Result type of host calls. Errors raised by the host pass through the
/// plugin untouched.
pub type HostResult<T> = anyhow::Result<T>;

/// The host-side provider the language service pulls its inputs from.
pub trait LanguageServiceHost {
    /// Every file the host considers part of the project, in host order.
    fn script_file_names(&self) -> HostResult<Vec<String>>;

    /// Version token for a file, bumped by the host on every edit.
    fn script_version(&self, file_name: &str) -> String;

    /// Current text of a file, if the host can provide it.
    fn script_snapshot(&self, file_name: &str) -> Option<String>;

    fn current_directory(&self) -> PathBuf;

    fn file_exists(&self, path: &str) -> bool;

    fn read_file(&self, path: &str) -> Option<String>;

    /// Opaque compiler settings, forwarded as-is.
    fn compilation_settings(&self) -> serde_json::Value;
}

/// The compiled file graph the engine currently holds.
pub trait Program {
    /// Every file the engine loaded, including files it reached through
    /// imports and re-exports.
    fn source_file_names(&self) -> Vec<String>;
}

/// A diagnostic reported by the engine, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file_name: String,
    pub start: usize,
    pub length: usize,
    pub message: String,
}

/// Target of a go-to-definition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLocation {
    pub file_name: String,
    pub start: usize,
    pub length: usize,
}

/// The analysis engine the host queries on behalf of the editor.
pub trait LanguageService {
    /// The currently compiled graph, or `None` when nothing is compiled yet.
    fn program(&self) -> HostResult<Option<Rc<dyn Program>>>;

    fn semantic_diagnostics(&self, file_name: &str) -> HostResult<Vec<Diagnostic>>;

    fn definition_at(&self, file_name: &str, offset: usize)
        -> HostResult<Vec<DefinitionLocation>>;

    fn cleanup_semantic_cache(&self);
}

/// The host's per-process bookkeeping of editor state.
pub trait ProjectService {
    /// Open files mapped to the project root the editor reported for them.
    ///
    /// Keys are already lowercased by the host. Some editors never report a
    /// root, in which case the value is `None`.
    fn open_files(&self) -> IndexMap<String, Option<PathBuf>>;
}

/// Builds a language service on top of a host, the way the host runtime
/// itself does when a project is created.
pub trait LanguageServiceFactory {
    fn create_language_service(&self, host: Rc<dyn LanguageServiceHost>)
        -> Box<dyn LanguageService>;
}

/// Everything the host hands to a plugin when a project session starts.
pub struct PluginCreateInfo {
    pub language_service_host: Rc<dyn LanguageServiceHost>,
    pub language_service: Box<dyn LanguageService>,
    pub project_service: Rc<dyn ProjectService>,
    /// Inline plugin settings from the project configuration. May carry a
    /// `name` entry identifying the plugin, which is ignored.
    pub config: serde_json::Value,
}
