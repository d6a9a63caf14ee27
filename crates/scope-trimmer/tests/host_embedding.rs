//! Embedding the plugin from a host crate, using only the public API.
//!
//! The host here is a tiny in-memory project: a list of files and a map of
//! which file imports which. It creates one trimmed session and checks what
//! its engine ends up compiling.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::json;

use scope_trimmer::host::{DefinitionLocation, Diagnostic};
use scope_trimmer::{
    HostResult, LanguageService, LanguageServiceFactory, LanguageServiceHost, PluginCreateInfo,
    Program, ProjectRootLocator, ProjectService, ScopeTracker, ScopeTrimmerPlugin,
};

struct MemoryHost {
    files: Vec<String>,
}

impl LanguageServiceHost for MemoryHost {
    fn script_file_names(&self) -> HostResult<Vec<String>> {
        Ok(self.files.clone())
    }

    fn script_version(&self, _file_name: &str) -> String {
        "0".to_string()
    }

    fn script_snapshot(&self, _file_name: &str) -> Option<String> {
        None
    }

    fn current_directory(&self) -> PathBuf {
        PathBuf::from("/repo")
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    fn read_file(&self, _path: &str) -> Option<String> {
        None
    }

    fn compilation_settings(&self) -> serde_json::Value {
        json!({})
    }
}

struct MemoryProgram(Vec<String>);

impl Program for MemoryProgram {
    fn source_file_names(&self) -> Vec<String> {
        self.0.clone()
    }
}

/// Compiles the enumerated files plus their direct imports.
struct MemoryService {
    host: Rc<dyn LanguageServiceHost>,
    imports: HashMap<String, Vec<String>>,
}

impl LanguageService for MemoryService {
    fn program(&self) -> HostResult<Option<Rc<dyn Program>>> {
        let mut files = self.host.script_file_names()?;
        let imported: Vec<String> = files
            .iter()
            .flat_map(|f| self.imports.get(f).cloned().unwrap_or_default())
            .collect();
        for file in imported {
            if !files.contains(&file) {
                files.push(file);
            }
        }
        Ok(Some(Rc::new(MemoryProgram(files))))
    }

    fn semantic_diagnostics(&self, _file_name: &str) -> HostResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }

    fn definition_at(&self, _file_name: &str, _offset: usize) -> HostResult<Vec<DefinitionLocation>> {
        Ok(Vec::new())
    }

    fn cleanup_semantic_cache(&self) {}
}

struct MemoryFactory {
    imports: HashMap<String, Vec<String>>,
}

impl LanguageServiceFactory for MemoryFactory {
    fn create_language_service(&self, host: Rc<dyn LanguageServiceHost>) -> Box<dyn LanguageService> {
        Box::new(MemoryService {
            host,
            imports: self.imports.clone(),
        })
    }
}

struct Editor {
    open: RefCell<IndexMap<String, Option<PathBuf>>>,
}

impl ProjectService for Editor {
    fn open_files(&self) -> IndexMap<String, Option<PathBuf>> {
        self.open.borrow().clone()
    }
}

struct RootAt(&'static str);

#[async_trait(?Send)]
impl ProjectRootLocator for RootAt {
    async fn locate(&self, _start_dir: &Path) -> Option<PathBuf> {
        Some(PathBuf::from(self.0))
    }
}

#[tokio::test]
async fn test_trimmed_session_compiles_open_files_and_their_imports() {
    let files = vec![
        "/repo/src/main.ts".to_string(),
        "/repo/src/util.ts".to_string(),
        "/repo/src/unused.ts".to_string(),
        "/repo/types/global.d.ts".to_string(),
    ];
    let mut imports = HashMap::new();
    imports.insert("/repo/src/main.ts".to_string(), vec!["/repo/src/util.ts".to_string()]);

    let factory = MemoryFactory { imports: imports.clone() };
    let host: Rc<dyn LanguageServiceHost> = Rc::new(MemoryHost { files });
    let original = factory.create_language_service(host.clone());

    let mut open = IndexMap::new();
    open.insert("/repo/src/main.ts".to_string(), None);
    let editor = Rc::new(Editor { open: RefCell::new(open) });

    let plugin = ScopeTrimmerPlugin::new(factory)
        .with_scope_tracker(ScopeTracker::new())
        .with_root_locator(RootAt("/repo"));
    let service = plugin
        .create(PluginCreateInfo {
            language_service_host: host,
            language_service: original,
            project_service: editor.clone(),
            config: json!({ "name": "scope-trimmer", "enabled": true, "alwaysInclude": ["types/**"] }),
        })
        .await;

    let compiled = service.program().unwrap().unwrap().source_file_names();
    assert_eq!(
        compiled,
        vec![
            "/repo/src/main.ts".to_string(),
            "/repo/types/global.d.ts".to_string(),
            "/repo/src/util.ts".to_string(),
        ]
    );

    // Closing the file does not shrink what the engine sees
    editor.open.borrow_mut().clear();
    let compiled = service.program().unwrap().unwrap().source_file_names();
    assert_eq!(compiled.len(), 3);
    assert!(!compiled.contains(&"/repo/src/unused.ts".to_string()));
}
