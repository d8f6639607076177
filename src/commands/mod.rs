pub mod apply;
pub mod plan;

use anyhow::{Context as _, Result};
use fetchkit::{HttpFetcher, LocalFs};
use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::engine::{Catalog, RunContext};
use crate::manifest::Manifest;
use crate::resource::CommandPackageManager;

/// Settings, expanded catalog and run context for one manifest.
pub struct Session {
    pub settings: Settings,
    pub catalog: Arc<Catalog>,
    pub run: Arc<RunContext>,
}

impl Session {
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let settings = Settings::load()?;
        let var_dir = settings.var_dir()?;
        log::debug!("Var dir: {}", var_dir.display());

        let manifest = Manifest::load(manifest_path)?;
        let declared = manifest
            .declare(&var_dir, &LocalFs)
            .with_context(|| format!("Invalid resource in {}", manifest_path.display()))?;
        let declared_count = declared.len();
        let catalog = Arc::new(declared.expand());
        log::debug!(
            "Declared {declared_count} resources, {} after expansion",
            catalog.len()
        );

        let fetcher = match &settings.user_agent {
            Some(agent) => HttpFetcher::with_user_agent(agent.as_str()),
            None => HttpFetcher::new(),
        };
        let run = Arc::new(RunContext::new(
            Box::new(fetcher),
            Box::new(LocalFs),
            Box::new(CommandPackageManager::new(settings.package.clone())),
        ));

        Ok(Self {
            settings,
            catalog,
            run,
        })
    }
}
