//
// plugin.rs
//
// Session bootstrap: load the config, then either step aside or wrap the
// host and the language service
//

use std::rc::Rc;

use crate::config::{load_config, Config};
use crate::host::{LanguageService, LanguageServiceFactory, LanguageServiceHost, PluginCreateInfo};
use crate::interceptor::{TrimmedHost, TrimmedLanguageService};
use crate::project_root::{GitRootLocator, ProjectRootLocator};
use crate::scope::ScopeTracker;

/// Plugin entry point the host instantiates once and calls per project.
pub struct ScopeTrimmerPlugin<F> {
    factory: F,
    scope: Option<ScopeTracker>,
    root_locator: Box<dyn ProjectRootLocator>,
}

impl<F: LanguageServiceFactory> ScopeTrimmerPlugin<F> {
    /// `factory` is the host runtime's way of building a language service
    /// over a host; the plugin uses it to build one over the wrapped host.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            scope: None,
            root_locator: Box::new(GitRootLocator::new()),
        }
    }

    /// Track scope in `scope` instead of the process-wide tracker.
    ///
    /// Use one tracker per session when a single process hosts unrelated
    /// projects that must not see each other's files.
    pub fn with_scope_tracker(mut self, scope: ScopeTracker) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Replace the git-based fallback used when the host reports no root.
    pub fn with_root_locator(mut self, locator: impl ProjectRootLocator + 'static) -> Self {
        self.root_locator = Box::new(locator);
        self
    }

    fn scope(&self) -> ScopeTracker {
        self.scope.clone().unwrap_or_else(ScopeTracker::process_wide)
    }

    /// Set up the plugin for one project session.
    ///
    /// When the merged config leaves the plugin disabled, the original
    /// language service is returned and nothing is wrapped.
    pub async fn create(&self, info: PluginCreateInfo) -> Box<dyn LanguageService> {
        let config = load_config(&info, self.root_locator.as_ref()).await;

        if !config.enabled {
            log::info!("scope-trimmer is disabled");
            return info.language_service;
        }

        log::info!(
            "scope-trimmer is enabled to narrow the analysis scope, config: {}",
            config.to_log_string()
        );

        self.wrap(info, &config)
    }

    fn wrap(&self, info: PluginCreateInfo, config: &Config) -> Box<dyn LanguageService> {
        let scope = self.scope();

        let host: Rc<dyn LanguageServiceHost> = Rc::new(TrimmedHost::new(
            info.language_service_host,
            info.project_service,
            scope.clone(),
            config,
        ));
        let service = self.factory.create_language_service(host);

        Box::new(TrimmedLanguageService::new(service, scope, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::test_utils::fake_host::{FakeProjectService, FakeSession, ResolvingServiceFactory};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::{Path, PathBuf};

    struct NoRoot;

    #[async_trait(?Send)]
    impl ProjectRootLocator for NoRoot {
        async fn locate(&self, _start_dir: &Path) -> Option<PathBuf> {
            None
        }
    }

    fn plugin(factory: Rc<ResolvingServiceFactory>) -> ScopeTrimmerPlugin<Rc<ResolvingServiceFactory>> {
        ScopeTrimmerPlugin::new(factory)
            .with_scope_tracker(ScopeTracker::new())
            .with_root_locator(NoRoot)
    }

    #[tokio::test]
    async fn test_disabled_returns_original_service() {
        let factory = Rc::new(ResolvingServiceFactory::default());
        let session = FakeSession::new(&["/p/a.ts", "/p/b.ts"], FakeProjectService::new(&["/p/a.ts"]));
        session.original_service.set_program(&["/p/a.ts", "/p/b.ts"]);

        let service = plugin(factory.clone()).create(session.create_info(json!({}))).await;

        assert_eq!(factory.created(), 0);
        let program = service.program().unwrap().unwrap();
        assert_eq!(program.source_file_names().len(), 2);
        assert_eq!(session.original_service.program_calls(), 1);
    }

    #[tokio::test]
    async fn test_enabled_wraps_host_and_service() {
        let factory = Rc::new(ResolvingServiceFactory::default());
        let session = FakeSession::new(&["/p/a.ts", "/p/b.ts"], FakeProjectService::new(&["/p/a.ts"]));

        let service = plugin(factory.clone())
            .create(session.create_info(json!({ "name": "scope-trimmer", "enabled": true })))
            .await;

        assert_eq!(factory.created(), 1);
        let program = service.program().unwrap().unwrap();
        assert_eq!(program.source_file_names(), vec!["/p/a.ts".to_string()]);
        assert_eq!(session.original_service.program_calls(), 0);
    }

    #[tokio::test]
    async fn test_config_file_enables_plugin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "enabled": true, "alwaysInclude": ["src/**"] }"#,
        )
        .unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let folded = root.to_lowercase();
        let in_src = format!("{}/src/util.ts", folded);
        let open = format!("{}/index.ts", folded);
        let other = format!("{}/other.ts", folded);

        let factory = Rc::new(ResolvingServiceFactory::default());
        let session = FakeSession::new(
            &[open.as_str(), in_src.as_str(), other.as_str()],
            FakeProjectService::with_root(&[open.as_str()], &root),
        );

        let service = plugin(factory.clone()).create(session.create_info(json!({}))).await;

        assert_eq!(factory.created(), 1);
        let program = service.program().unwrap().unwrap();
        assert_eq!(program.source_file_names(), vec![open, in_src]);
    }

    #[tokio::test]
    async fn test_malformed_config_file_falls_back_to_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "not json").unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let open = format!("{}/index.ts", root.to_lowercase());

        let factory = Rc::new(ResolvingServiceFactory::default());
        let session = FakeSession::new(
            &[open.as_str()],
            FakeProjectService::with_root(&[open.as_str()], &root),
        );

        plugin(factory.clone())
            .create(session.create_info(json!({ "enabled": true, "debug": true })))
            .await;
        assert_eq!(factory.created(), 1);
    }

    #[tokio::test]
    async fn test_sessions_share_default_tracker() {
        let factory = Rc::new(ResolvingServiceFactory::default());
        let plugin = ScopeTrimmerPlugin::new(factory.clone()).with_root_locator(NoRoot);
        let enabled = json!({ "enabled": true });

        let first = FakeSession::new(&["/one/a.ts"], FakeProjectService::new(&["/one/a.ts"]));
        let second = FakeSession::new(&["/one/a.ts", "/two/b.ts"], FakeProjectService::new(&["/two/b.ts"]));

        let first_service = plugin.create(first.create_info(enabled.clone())).await;
        first_service.program().unwrap();

        // The second project sees the first project's file as in scope
        let second_service = plugin.create(second.create_info(enabled)).await;
        let program = second_service.program().unwrap().unwrap();
        assert_eq!(
            program.source_file_names(),
            vec!["/one/a.ts".to_string(), "/two/b.ts".to_string()]
        );
    }
}
