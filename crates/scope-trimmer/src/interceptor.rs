//
// interceptor.rs
//
// Decorators over the host and the language service that narrow what the
// engine sees and widen the scope with what the engine resolves
//
// Both decorators share one ScopeTracker. The host side filters file
// enumeration down to the scope; the service side feeds every file of the
// compiled program back into the scope, so files reached only through
// re-export chains show up in the next enumeration.
//

use std::path::PathBuf;
use std::rc::Rc;

use crate::config::Config;
use crate::debug::{debug, DebugKind};
use crate::host::{
    DefinitionLocation, Diagnostic, HostResult, LanguageService, LanguageServiceHost, Program,
    ProjectService,
};
use crate::matcher::AlwaysIncludeMatcher;
use crate::scope::{FileIdentity, ScopeTracker};

/// Host wrapper whose file enumeration only returns in-scope files.
pub struct TrimmedHost {
    inner: Rc<dyn LanguageServiceHost>,
    project_service: Rc<dyn ProjectService>,
    scope: ScopeTracker,
    always_include: AlwaysIncludeMatcher,
    debug: bool,
}

impl TrimmedHost {
    pub fn new(
        inner: Rc<dyn LanguageServiceHost>,
        project_service: Rc<dyn ProjectService>,
        scope: ScopeTracker,
        config: &Config,
    ) -> Self {
        let always_include = AlwaysIncludeMatcher::new(
            &config.always_include,
            config.project_root_path.clone(),
            config.debug,
        );

        Self {
            inner,
            project_service,
            scope,
            always_include,
            debug: config.debug,
        }
    }

    pub fn scope(&self) -> &ScopeTracker {
        &self.scope
    }

    fn filter_to_scope(&self) -> HostResult<Vec<String>> {
        let open_files: Vec<String> = self.project_service.open_files().into_keys().collect();

        let all_file_names: Vec<FileIdentity> = self
            .inner
            .script_file_names()?
            .iter()
            .map(FileIdentity::from)
            .collect();

        self.scope.extend(open_files.iter());
        debug(
            self.debug,
            "TrimmedHost::script_file_names",
            &format!(
                "{} open files added to the scope: {}. Scope size: {}",
                open_files.len(),
                open_files.join(", "),
                self.scope.len()
            ),
            DebugKind::Info,
        );

        if !self.always_include.is_empty() {
            let always_included: Vec<&FileIdentity> = all_file_names
                .iter()
                .filter(|file| self.always_include.is_match(file.as_str()))
                .collect();

            self.scope.extend(always_included.iter().map(|file| (*file).clone()));
            debug(
                self.debug,
                "TrimmedHost::script_file_names",
                &format!(
                    "{} files matching \"always include\" pattern added to the scope: {}. Scope size: {}",
                    always_included.len(),
                    always_included
                        .iter()
                        .map(|file| file.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    self.scope.len()
                ),
                DebugKind::Info,
            );
        }

        let total = all_file_names.len();
        let filtered: Vec<String> = all_file_names
            .into_iter()
            .filter(|file| self.scope.contains_identity(file))
            .map(FileIdentity::into_string)
            .collect();

        debug(
            self.debug,
            "TrimmedHost::script_file_names",
            &format!("{} out of {} files returned", filtered.len(), total),
            DebugKind::Info,
        );

        Ok(filtered)
    }
}

impl LanguageServiceHost for TrimmedHost {
    fn script_file_names(&self) -> HostResult<Vec<String>> {
        self.filter_to_scope()
    }

    fn script_version(&self, file_name: &str) -> String {
        self.inner.script_version(file_name)
    }

    fn script_snapshot(&self, file_name: &str) -> Option<String> {
        self.inner.script_snapshot(file_name)
    }

    fn current_directory(&self) -> PathBuf {
        self.inner.current_directory()
    }

    fn file_exists(&self, path: &str) -> bool {
        self.inner.file_exists(path)
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.inner.read_file(path)
    }

    fn compilation_settings(&self) -> serde_json::Value {
        self.inner.compilation_settings()
    }
}

/// Language service wrapper that records every file of the compiled
/// program in the scope. The program itself is returned untouched.
pub struct TrimmedLanguageService {
    inner: Box<dyn LanguageService>,
    scope: ScopeTracker,
    debug: bool,
}

impl TrimmedLanguageService {
    pub fn new(inner: Box<dyn LanguageService>, scope: ScopeTracker, config: &Config) -> Self {
        Self {
            inner,
            scope,
            debug: config.debug,
        }
    }

    pub fn scope(&self) -> &ScopeTracker {
        &self.scope
    }
}

impl LanguageService for TrimmedLanguageService {
    fn program(&self) -> HostResult<Option<Rc<dyn Program>>> {
        let program = self.inner.program()?;

        let source_file_names: Vec<FileIdentity> = program
            .as_ref()
            .map(|program| {
                program
                    .source_file_names()
                    .iter()
                    .map(FileIdentity::from)
                    .collect()
            })
            .unwrap_or_default();

        self.scope.extend(source_file_names.iter().cloned());
        debug(
            self.debug,
            "TrimmedLanguageService::program",
            &format!(
                "{} source files added to the scope: {}. Scope size: {}",
                source_file_names.len(),
                source_file_names
                    .iter()
                    .map(FileIdentity::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                self.scope.len()
            ),
            DebugKind::Info,
        );

        Ok(program)
    }

    fn semantic_diagnostics(&self, file_name: &str) -> HostResult<Vec<Diagnostic>> {
        self.inner.semantic_diagnostics(file_name)
    }

    fn definition_at(
        &self,
        file_name: &str,
        offset: usize,
    ) -> HostResult<Vec<DefinitionLocation>> {
        self.inner.definition_at(file_name, offset)
    }

    fn cleanup_semantic_cache(&self) {
        self.inner.cleanup_semantic_cache()
    }
}
