//
// lib.rs
//
// Scope trimming for language-service hosts.
//
// The host asks "which files exist?" and "what is compiled?". This crate
// wraps both questions: file enumeration is narrowed to the files in scope,
// and every file the engine compiles is added to the scope. Scope starts
// with the open files and the "always include" globs, and only grows.
//

pub mod config;
pub mod debug;
pub mod host;
pub mod interceptor;
pub mod matcher;
pub mod plugin;
pub mod project_root;
pub mod scope;
// test_utils is available in test builds and when the `test-support` feature is enabled.
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;


pub use config::{
    Config, PartialUserConfig, UserConfig, CONFIG_FILE_NAME, LEGACY_CONFIG_FILE_NAME,
};
pub use host::{
    HostResult, LanguageService, LanguageServiceFactory, LanguageServiceHost, PluginCreateInfo,
    Program, ProjectService,
};
pub use interceptor::{TrimmedHost, TrimmedLanguageService};
pub use plugin::ScopeTrimmerPlugin;
pub use project_root::{GitRootLocator, ProjectRootLocator};
pub use scope::{FileIdentity, ScopeTracker};
