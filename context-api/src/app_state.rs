use std::sync::Arc;

use context_engine::{ContextCache, ContextEngine, MemoryTermIndex};
use tokio::sync::Semaphore;

use crate::config::ContextSettings;

pub type Engine = ContextEngine<MemoryTermIndex>;

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Engine admission closed")]
    AdmissionClosed,
    #[error("Engine task failed: {0}")]
    TaskFailed(String),
}

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
    permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(index: MemoryTermIndex, settings: &ContextSettings) -> Self {
        let engine = ContextEngine::new(
            index,
            ContextCache::new(settings.cache_config()),
            settings.engine_config(),
        );
        Self::from_engine(engine, settings.max_concurrent_requests)
    }

    pub fn from_engine(engine: Engine, max_concurrent_requests: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run `task` on the blocking pool once an admission permit is free.
    pub async fn run<T, F>(&self, task: F) -> Result<T, AppStateError>
    where
        F: FnOnce(&Engine) -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppStateError::AdmissionClosed)?;

        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            task(&engine)
        })
        .await
        .map_err(|err| AppStateError::TaskFailed(err.to_string()))
    }
}
