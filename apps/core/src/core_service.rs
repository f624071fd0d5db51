use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;

use crate::action_executor::PathOpener;
use crate::autocomplete::{AutoCompleteResult, AutoCompleter};
use crate::catalog::{CatalogError, CommandCatalog};
use crate::config::{validate, Config};
use crate::history::History;
use crate::history_store::{self, StoreError};
use crate::logging;
use crate::path_complete::{local_roots, PathSearchBounds};
use crate::process::ProcessRunner;
use crate::resolver::{CommandResolver, ResolveError};

#[derive(Debug)]
pub enum ServiceError {
    Config(String),
    Store(StoreError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Store(error) => write!(f, "store error: {error}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Cloneable, thread-safe view of the service for background work.
#[derive(Clone)]
pub struct CommandWorker {
    resolver: CommandResolver,
    completer: AutoCompleter,
}

impl CommandWorker {
    pub fn execute(&self, text: &str) -> Result<bool, ResolveError> {
        self.resolver.execute_user_command(text)
    }

    /// Reloads the catalog; a failing list program only disables the
    /// catalog tier.
    pub fn complete(&self, history: &History, input_text: &str) -> AutoCompleteResult {
        let catalog = match self.resolver.load_catalog() {
            Ok(catalog) => catalog,
            Err(error) => {
                logging::warn(&format!("catalog unavailable for autocomplete: {error}"));
                CommandCatalog::default()
            }
        };
        self.completer.complete(&catalog, history, input_text)
    }
}

/// Owns the configuration, the history and its store, and the command worker.
pub struct CoreService {
    config: Config,
    db: Connection,
    history: History,
    worker: CommandWorker,
}

impl CoreService {
    pub fn new(config: Config) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let db = history_store::open_from_config(&config)?;
        Self::with_connection(config, db)
    }

    pub fn with_connection(config: Config, db: Connection) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let history = history_store::load(&db)?;
        let resolver =
            CommandResolver::new(&config.command_list_program, &config.command_execute_program);
        let bounds = PathSearchBounds {
            max_depth: config.path_search_max_depth as usize,
            budget: Duration::from_millis(config.path_search_budget_ms),
        };
        let worker = CommandWorker {
            resolver,
            completer: AutoCompleter::new(local_roots(), bounds),
        };
        Ok(Self {
            config,
            db,
            history,
            worker,
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.worker.resolver = self.worker.resolver.with_runner(runner);
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn PathOpener>) -> Self {
        self.worker.resolver = self.worker.resolver.with_opener(opener);
        self
    }

    pub fn with_completer(mut self, completer: AutoCompleter) -> Self {
        self.worker.completer = completer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn worker(&self) -> CommandWorker {
        self.worker.clone()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn list_commands(&self) -> Result<CommandCatalog, CatalogError> {
        self.worker.resolver.load_catalog()
    }

    /// Runs the text and records it in history when it was handled.
    pub fn execute(&mut self, text: &str) -> Result<bool, ResolveError> {
        let handled = self.worker.execute(text)?;
        if handled {
            self.record_history(text);
        }
        Ok(handled)
    }

    pub fn complete(&self, input_text: &str) -> AutoCompleteResult {
        self.worker.complete(&self.history, input_text)
    }

    /// Moves `text` to the front of history and persists it. A store failure
    /// is logged, not surfaced: the command already ran.
    pub fn record_history(&mut self, text: &str) {
        self.history.insert(text);
        if let Err(error) = self.save_history() {
            logging::error(&format!("failed to save history: {error}"));
        }
    }

    pub fn save_history(&mut self) -> Result<(), ServiceError> {
        history_store::save(&mut self.db, &self.history)?;
        Ok(())
    }

    pub fn clear_history(&mut self) -> Result<(), ServiceError> {
        self.history.clear();
        self.save_history()
    }
}
