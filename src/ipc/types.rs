use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::collections::Collections;
use crate::config::{self, Config};
use crate::seed::SeedData;
use crate::services::Services;
use crate::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub config: Config,
    pub collections: Option<Collections>,
    pub services: Option<Services>,
    pub runtime: tokio::runtime::Runtime,
    /// False when the workspace database could not be opened and the session
    /// runs on in-memory storage.
    pub persistent: bool,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let config = Config::default();
        let services = build_services(&config);
        Ok(Self {
            workspace: None,
            config,
            collections: None,
            services,
            runtime,
            persistent: false,
        })
    }

    /// Loads the workspace config and opens every collection from the
    /// workspace database. If the database cannot be opened the workspace is
    /// still selected, backed by memory only.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let config = config::load_or_init(path)?;

        if let Some(collections) = self.collections.as_mut() {
            collections.flush_all();
        }

        let (storage, persistent): (Arc<dyn KeyValueStorage>, bool) =
            match SqliteStorage::open(path, &config.storage.database_file) {
                Ok(s) => (Arc::new(s), true),
                Err(e) => {
                    tracing::warn!(
                        workspace = %path.to_string_lossy(),
                        error = %e,
                        "workspace database unavailable; continuing without persistence"
                    );
                    (Arc::new(MemoryStorage::new()), false)
                }
            };

        self.collections = Some(Collections::open(
            storage,
            &config.storage.key_prefix,
            SeedData::demo(),
        ));
        self.services = build_services(&config);
        self.config = config;
        self.workspace = Some(path.to_path_buf());
        self.persistent = persistent;
        tracing::info!(workspace = %path.to_string_lossy(), persistent, "workspace opened");
        Ok(())
    }

    pub fn close_workspace(&mut self) {
        if let Some(mut collections) = self.collections.take() {
            collections.flush_all();
        }
        self.workspace = None;
        self.persistent = false;
    }
}

fn build_services(config: &Config) -> Option<Services> {
    match Services::from_config(&config.services) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::error!(error = %e, "failed to build service clients");
            None
        }
    }
}
