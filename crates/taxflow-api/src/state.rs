//! Shared application state
use anyhow::Context;
use std::sync::Arc;
use taxflow_core::{FactSet, FactStore, MemoryFactStore};
use taxflow_out::{DirectorySaver, TemplateRenderer};
use taxflow_questions::Catalog;
use taxflow_registry::CapabilityTable;
use taxflow_returns::Orchestrator;

use crate::computer::FactSheetComputer;
use crate::config::ApiConfig;
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FactStore>,
    pub catalog: Arc<Catalog>,
    pub orchestrator: Arc<Orchestrator>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn FactStore>,
        catalog: Catalog,
        orchestrator: Orchestrator,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            catalog: Arc::new(catalog),
            orchestrator: Arc::new(orchestrator),
            metrics: Metrics::new().context("registering metrics")?,
        })
    }

    /// Wire the in-memory store and reference collaborators from `config`.
    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let catalog = match &config.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("loading catalog {}", path.display()))?,
            None => Catalog::default(),
        };
        let capabilities = match &config.capabilities {
            Some(path) => CapabilityTable::load(path)
                .with_context(|| format!("loading capabilities {}", path.display()))?,
            None => CapabilityTable::builtin(),
        };
        let renderer = match &config.templates {
            Some(path) => TemplateRenderer::load(path)
                .with_context(|| format!("loading templates {}", path))?,
            None => TemplateRenderer::builtin().context("compiling builtin templates")?,
        };

        let orchestrator = Orchestrator::new(
            capabilities,
            Arc::new(FactSheetComputer::new()),
            Arc::new(renderer),
            Arc::new(DirectorySaver::new(&config.output_dir)),
        )
        .with_policy(config.secondary_errors);

        let initial = FactSet {
            active_year: config.active_year,
            ..FactSet::default()
        };
        let store = Arc::new(MemoryFactStore::spawn(initial));

        tracing::info!(
            catalog = catalog.version(),
            questions = catalog.len(),
            output_dir = %config.output_dir.display(),
            "application state ready"
        );
        Self::new(store, catalog, orchestrator)
    }
}
