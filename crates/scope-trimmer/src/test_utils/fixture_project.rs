//! Deterministic synthetic project layout for benchmarks and tests.
//!
//! Generates file names and an import graph only; nothing touches disk.
//! Files are grouped into modules, each with a barrel `index.ts` that
//! re-exports every file of its module, and each barrel re-exports the
//! next module's barrel up to `barrel_chain_depth` modules deep.

use std::collections::HashMap;

/// Configuration for generating a fixture project.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub module_count: usize,
    pub files_per_module: usize,
    pub barrel_chain_depth: usize,
}

impl FixtureConfig {
    /// Small project: 10 modules of 10 files, barrel chain depth 3.
    pub fn small() -> Self {
        Self {
            module_count: 10,
            files_per_module: 10,
            barrel_chain_depth: 3,
        }
    }

    /// Large project: 200 modules of 50 files, barrel chain depth 10.
    pub fn large() -> Self {
        Self {
            module_count: 200,
            files_per_module: 50,
            barrel_chain_depth: 10,
        }
    }
}

/// A generated project: the host's candidate list plus the engine's view
/// of which file pulls in which.
#[derive(Debug, Clone)]
pub struct FixtureProject {
    pub root: String,
    pub candidates: Vec<String>,
    pub imports: Vec<(String, Vec<String>)>,
}

impl FixtureProject {
    pub fn barrel(&self, module: usize) -> String {
        barrel_path(&self.root, module)
    }

    pub fn file(&self, module: usize, index: usize) -> String {
        file_path(&self.root, module, index)
    }

    pub fn import_map(&self) -> HashMap<String, Vec<String>> {
        self.imports.iter().cloned().collect()
    }
}

fn barrel_path(root: &str, module: usize) -> String {
    format!("{}/src/module_{}/index.ts", root, module)
}

fn file_path(root: &str, module: usize, index: usize) -> String {
    format!("{}/src/module_{}/file_{}.ts", root, module, index)
}

/// Generate a project under `root`. Calling this twice with the same
/// arguments yields identical output.
pub fn create_fixture_project(root: &str, config: &FixtureConfig) -> FixtureProject {
    let mut candidates = Vec::new();
    let mut imports = Vec::new();

    for module in 0..config.module_count {
        let barrel = barrel_path(root, module);
        let files: Vec<String> = (0..config.files_per_module)
            .map(|i| file_path(root, module, i))
            .collect();

        let mut reexports = files.clone();
        if module < config.barrel_chain_depth && module + 1 < config.module_count {
            reexports.push(barrel_path(root, module + 1));
        }

        candidates.push(barrel.clone());
        candidates.extend(files);
        imports.push((barrel, reexports));
    }

    FixtureProject {
        root: root.to_string(),
        candidates,
        imports,
    }
}
