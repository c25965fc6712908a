//! Application root
//!
//! Owns the status store and the collaborators every form shares. Forms are
//! opened from here so they all see the same store, and [`App::shutdown`]
//! releases what [`App::init`] set up.
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use super::api::{ApiClient, HttpApiClient};
use super::config::AppConfig;
use super::controller::FormController;
use super::form::FormState;
use super::history::SubmissionLog;
use super::navigation::Router;
use super::screens::Screen;
use super::status::{StatusStore, SubscriptionId};

pub struct App {
    store: StatusStore,
    client: Arc<dyn ApiClient>,
    router: Arc<dyn Router>,
    history: Option<(SubmissionLog, SubscriptionId)>,
}

impl App {
    pub fn init(
        config: &AppConfig,
        client: Arc<dyn ApiClient>,
        router: Arc<dyn Router>,
    ) -> anyhow::Result<Self> {
        let store = StatusStore::new();

        let history = match &config.history.path {
            Some(path) => {
                let log = SubmissionLog::open(path)?;
                let subscription = log.record_from(&store);
                Some((log, subscription))
            }
            None => None,
        };

        info!(history = history.is_some(), "application initialised");

        Ok(Self {
            store,
            client,
            router,
            history,
        })
    }

    /// Builds the HTTP client from `config.api`
    pub fn with_http(config: &AppConfig, router: Arc<dyn Router>) -> anyhow::Result<Self> {
        let client = HttpApiClient::new(&config.api.base_url)
            .context("failed to build the HTTP client")?;
        Self::init(config, Arc::new(client), router)
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn history(&self) -> Option<&SubmissionLog> {
        self.history.as_ref().map(|(log, _)| log)
    }

    pub fn open(&self, screen: Screen) -> FormController {
        let state = FormState::new(screen.schema(), screen.initial_values());

        FormController::new(
            screen.form_id(),
            state,
            screen.chain(),
            &self.store,
            Arc::clone(&self.client),
        )
        .navigate_on_success(screen.destination(), Arc::clone(&self.router))
    }

    /// Opens the form mounted at `path`, if any
    pub fn resolve(&self, path: &str) -> Option<FormController> {
        Screen::from_path(path).map(|screen| self.open(screen))
    }

    pub fn shutdown(self) -> anyhow::Result<()> {
        if let Some((log, subscription)) = &self.history {
            self.store.unsubscribe(*subscription);
            log.flush().context("failed to flush submission history")?;
        }
        self.store.clear();

        info!("application shut down");
        Ok(())
    }
}
