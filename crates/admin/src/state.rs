//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::AdminConfig;
use crate::editor::EditorStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    editors: EditorStore,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// Must be called inside a Tokio runtime (the editor store spawns its
    /// reaper task).
    ///
    /// # Errors
    ///
    /// Returns error if the backend HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let editors = EditorStore::new(config.editor_idle);
        Ok(Self::from_parts(config, backend, editors))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn from_parts(config: AdminConfig, backend: BackendClient, editors: EditorStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                editors,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    #[must_use]
    pub fn editors(&self) -> &EditorStore {
        &self.inner.editors
    }
}
