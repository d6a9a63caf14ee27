//! In-memory stand-ins for the host objects a plugin session wraps.
//!
//! `FakeHost` and `FakeProjectService` hold mutable state behind `RefCell`
//! so tests can open and close files between calls. `ResolvingLanguageService`
//! plays the analysis engine: it compiles whatever the host enumerates and
//! follows an import graph from there, which is enough to drive the
//! enumerate / compile feedback loop end to end.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::anyhow;
use indexmap::IndexMap;

use crate::host::{
    DefinitionLocation, Diagnostic, HostResult, LanguageService, LanguageServiceFactory,
    LanguageServiceHost, PluginCreateInfo, Program, ProjectService,
};

// ============================================================================
// Host
// ============================================================================

/// Host with a fixed candidate list and optional file contents.
pub struct FakeHost {
    candidates: RefCell<Vec<String>>,
    contents: RefCell<HashMap<String, String>>,
    enumeration_error: RefCell<Option<String>>,
    enumeration_calls: Cell<usize>,
}

impl FakeHost {
    pub fn new(candidates: &[&str]) -> Self {
        Self {
            candidates: RefCell::new(candidates.iter().map(|c| c.to_string()).collect()),
            contents: RefCell::new(HashMap::new()),
            enumeration_error: RefCell::new(None),
            enumeration_calls: Cell::new(0),
        }
    }

    pub fn set_candidates(&self, candidates: &[&str]) {
        *self.candidates.borrow_mut() = candidates.iter().map(|c| c.to_string()).collect();
    }

    pub fn set_content(&self, file_name: &str, content: &str) {
        self.contents
            .borrow_mut()
            .insert(file_name.to_string(), content.to_string());
    }

    /// Make the next `script_file_names` call fail with `message`.
    pub fn fail_next_enumeration(&self, message: &str) {
        *self.enumeration_error.borrow_mut() = Some(message.to_string());
    }

    pub fn enumeration_calls(&self) -> usize {
        self.enumeration_calls.get()
    }
}

impl LanguageServiceHost for FakeHost {
    fn script_file_names(&self) -> HostResult<Vec<String>> {
        self.enumeration_calls.set(self.enumeration_calls.get() + 1);
        if let Some(message) = self.enumeration_error.borrow_mut().take() {
            return Err(anyhow!(message));
        }
        Ok(self.candidates.borrow().clone())
    }

    fn script_version(&self, file_name: &str) -> String {
        format!("{}@1", file_name)
    }

    fn script_snapshot(&self, file_name: &str) -> Option<String> {
        self.contents.borrow().get(file_name).cloned()
    }

    fn current_directory(&self) -> PathBuf {
        PathBuf::from("/fake/cwd")
    }

    fn file_exists(&self, path: &str) -> bool {
        self.contents.borrow().contains_key(path)
            || self
                .candidates
                .borrow()
                .iter()
                .any(|c| c.eq_ignore_ascii_case(path))
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.contents.borrow().get(path).cloned()
    }

    fn compilation_settings(&self) -> serde_json::Value {
        serde_json::json!({ "strict": true, "module": "esnext" })
    }
}

// ============================================================================
// Project service
// ============================================================================

/// Open-file registry. Keys are lowercased on insert, like the real host.
#[derive(Default)]
pub struct FakeProjectService {
    open_files: RefCell<IndexMap<String, Option<PathBuf>>>,
}

impl FakeProjectService {
    /// Open `files` with no reported project root.
    pub fn new(files: &[&str]) -> Self {
        let service = Self::default();
        service.set_open_files(files);
        service
    }

    /// Open `files`, all reporting `root` as their project root.
    pub fn with_root(files: &[&str], root: &str) -> Self {
        let service = Self::default();
        {
            let mut open_files = service.open_files.borrow_mut();
            for file in files {
                open_files.insert(file.to_lowercase(), Some(PathBuf::from(root)));
            }
        }
        service
    }

    /// Replace the open set; previous files are closed.
    pub fn set_open_files(&self, files: &[&str]) {
        let mut open_files = self.open_files.borrow_mut();
        open_files.clear();
        for file in files {
            open_files.insert(file.to_lowercase(), None);
        }
    }
}

impl ProjectService for FakeProjectService {
    fn open_files(&self) -> IndexMap<String, Option<PathBuf>> {
        self.open_files.borrow().clone()
    }
}

// ============================================================================
// Programs and language services
// ============================================================================

/// A compiled graph with a fixed file list.
#[derive(Debug, Clone)]
pub struct FakeProgram {
    files: Vec<String>,
}

impl FakeProgram {
    pub fn new(files: Vec<String>) -> Self {
        Self { files }
    }
}

impl Program for FakeProgram {
    fn source_file_names(&self) -> Vec<String> {
        self.files.clone()
    }
}

#[derive(Default)]
struct FakeServiceState {
    program: RefCell<Option<Rc<dyn Program>>>,
    program_error: RefCell<Option<String>>,
    program_calls: Cell<usize>,
    cleanup_calls: Cell<usize>,
}

/// Language service returning a preset program. Clones share state.
#[derive(Clone, Default)]
pub struct FakeLanguageService {
    state: Rc<FakeServiceState>,
}

impl FakeLanguageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `files` as the next program. Until called, there is none.
    pub fn set_program(&self, files: &[&str]) {
        let program = FakeProgram::new(files.iter().map(|f| f.to_string()).collect());
        *self.state.program.borrow_mut() = Some(Rc::new(program));
    }

    pub fn fail_next_program(&self, message: &str) {
        *self.state.program_error.borrow_mut() = Some(message.to_string());
    }

    pub fn program_calls(&self) -> usize {
        self.state.program_calls.get()
    }

    pub fn cleanup_calls(&self) -> usize {
        self.state.cleanup_calls.get()
    }
}

impl LanguageService for FakeLanguageService {
    fn program(&self) -> HostResult<Option<Rc<dyn Program>>> {
        self.state.program_calls.set(self.state.program_calls.get() + 1);
        if let Some(message) = self.state.program_error.borrow_mut().take() {
            return Err(anyhow!(message));
        }
        Ok(self.state.program.borrow().clone())
    }

    fn semantic_diagnostics(&self, file_name: &str) -> HostResult<Vec<Diagnostic>> {
        Ok(vec![Diagnostic {
            file_name: file_name.to_string(),
            start: 0,
            length: 1,
            message: "fake diagnostic".to_string(),
        }])
    }

    fn definition_at(&self, file_name: &str, offset: usize) -> HostResult<Vec<DefinitionLocation>> {
        Ok(vec![DefinitionLocation {
            file_name: file_name.to_string(),
            start: offset,
            length: 1,
        }])
    }

    fn cleanup_semantic_cache(&self) {
        self.state.cleanup_calls.set(self.state.cleanup_calls.get() + 1);
    }
}

/// Engine stand-in that compiles the files its host enumerates plus
/// everything they import, transitively.
pub struct ResolvingLanguageService {
    host: Rc<dyn LanguageServiceHost>,
    imports: Rc<HashMap<String, Vec<String>>>,
}

impl ResolvingLanguageService {
    pub fn new(host: Rc<dyn LanguageServiceHost>, imports: Rc<HashMap<String, Vec<String>>>) -> Self {
        Self { host, imports }
    }
}

impl LanguageService for ResolvingLanguageService {
    fn program(&self) -> HostResult<Option<Rc<dyn Program>>> {
        let roots = self.host.script_file_names()?;
        if roots.is_empty() {
            return Ok(None);
        }

        let mut seen = HashSet::new();
        let mut files = Vec::new();
        let mut queue: VecDeque<String> = roots.into_iter().collect();
        while let Some(file) = queue.pop_front() {
            if !seen.insert(file.clone()) {
                continue;
            }
            if let Some(deps) = self.imports.get(&file) {
                queue.extend(deps.iter().cloned());
            }
            files.push(file);
        }

        Ok(Some(Rc::new(FakeProgram::new(files))))
    }

    fn semantic_diagnostics(&self, _file_name: &str) -> HostResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }

    fn definition_at(&self, _file_name: &str, _offset: usize) -> HostResult<Vec<DefinitionLocation>> {
        Ok(Vec::new())
    }

    fn cleanup_semantic_cache(&self) {}
}

/// Factory producing `ResolvingLanguageService`s over a shared import graph.
#[derive(Default)]
pub struct ResolvingServiceFactory {
    imports: Rc<HashMap<String, Vec<String>>>,
    created: Cell<usize>,
}

impl ResolvingServiceFactory {
    /// `imports` maps a file to the files it imports or re-exports from.
    pub fn new(imports: &[(&str, &[&str])]) -> Self {
        let imports = imports
            .iter()
            .map(|(file, deps)| {
                (
                    file.to_string(),
                    deps.iter().map(|d| d.to_string()).collect(),
                )
            })
            .collect();
        Self::from_map(imports)
    }

    pub fn from_map(imports: HashMap<String, Vec<String>>) -> Self {
        Self {
            imports: Rc::new(imports),
            created: Cell::new(0),
        }
    }

    pub fn created(&self) -> usize {
        self.created.get()
    }
}

impl LanguageServiceFactory for ResolvingServiceFactory {
    fn create_language_service(&self, host: Rc<dyn LanguageServiceHost>) -> Box<dyn LanguageService> {
        self.created.set(self.created.get() + 1);
        Box::new(ResolvingLanguageService::new(host, self.imports.clone()))
    }
}

impl LanguageServiceFactory for Rc<ResolvingServiceFactory> {
    fn create_language_service(&self, host: Rc<dyn LanguageServiceHost>) -> Box<dyn LanguageService> {
        (**self).create_language_service(host)
    }
}

// ============================================================================
// Session fixtures
// ============================================================================

/// A host, its project service and the service the host would have used
/// without the plugin.
pub struct FakeSession {
    pub host: Rc<FakeHost>,
    pub project: Rc<FakeProjectService>,
    pub original_service: FakeLanguageService,
}

impl FakeSession {
    pub fn new(candidates: &[&str], project: FakeProjectService) -> Self {
        Self {
            host: Rc::new(FakeHost::new(candidates)),
            project: Rc::new(project),
            original_service: FakeLanguageService::new(),
        }
    }

    /// Build the create info handed to a plugin, with `config` as the
    /// inline session settings.
    pub fn create_info(&self, config: serde_json::Value) -> PluginCreateInfo {
        PluginCreateInfo {
            language_service_host: self.host.clone(),
            language_service: Box::new(self.original_service.clone()),
            project_service: self.project.clone(),
            config,
        }
    }
}
