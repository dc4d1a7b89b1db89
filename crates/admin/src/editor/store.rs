//! In-memory registry of open product editors.
//!
//! Editors are keyed by a random ID and owned by the admin that opened them.
//! Entries expire after a period of inactivity. When an editor closes, its
//! close callback notifies a reaper task that removes the entry.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, MutexGuard, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use fabric_core::ClientId;

use super::{CloseReason, EditorError, OnClose, ProductApi, ProductEditor, ProductRequest};
use crate::backend::Product;

/// Upper bound on concurrently open editors.
const MAX_OPEN_EDITORS: u64 = 1_000;

/// An open editor and the admin it belongs to.
#[derive(Debug)]
pub struct EditorSlot {
    id: Uuid,
    owner: ClientId,
    editor: Mutex<ProductEditor>,
}

impl EditorSlot {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn owner(&self) -> &ClientId {
        &self.owner
    }

    /// Lock the editor for one mutation.
    pub async fn lock(&self) -> MutexGuard<'_, ProductEditor> {
        self.editor.lock().await
    }

    /// Send a request taken from [`ProductEditor::begin_submit`] and settle
    /// the editor with the outcome.
    ///
    /// The work runs on its own task, so the editor leaves the in-flight
    /// state even when the caller stops waiting on the handle.
    pub fn save<A>(
        self: &Arc<Self>,
        request: ProductRequest,
        api: A,
    ) -> JoinHandle<Result<String, EditorError>>
    where
        A: ProductApi + 'static,
    {
        let slot = Arc::clone(self);
        tokio::spawn(async move {
            let result = request.dispatch(&api).await;
            slot.lock().await.finish_submit(result)
        })
    }
}

/// Shared store of open editors. Cheap to clone.
#[derive(Clone)]
pub struct EditorStore {
    inner: Arc<EditorStoreInner>,
}

struct EditorStoreInner {
    editors: Cache<Uuid, Arc<EditorSlot>>,
    closed_tx: mpsc::UnboundedSender<Uuid>,
}

impl std::fmt::Debug for EditorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStore")
            .field("open", &self.inner.editors.entry_count())
            .finish_non_exhaustive()
    }
}

impl EditorStore {
    /// Create a store whose editors expire after `idle` without access.
    ///
    /// Spawns the reaper task, so it must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        let editors: Cache<Uuid, Arc<EditorSlot>> = Cache::builder()
            .max_capacity(MAX_OPEN_EDITORS)
            .time_to_idle(idle)
            .eviction_listener(|id, _slot, cause| {
                debug!(editor_id = %id, ?cause, "Editor released");
            })
            .build();

        let (closed_tx, mut closed_rx) = mpsc::unbounded_channel::<Uuid>();
        let reaper = editors.clone();
        tokio::spawn(async move {
            while let Some(id) = closed_rx.recv().await {
                reaper.invalidate(&id).await;
            }
        });

        Self {
            inner: Arc::new(EditorStoreInner { editors, closed_tx }),
        }
    }

    /// URL prefix under which an editor's staged previews are served.
    #[must_use]
    pub fn preview_base(id: Uuid) -> String {
        format!("/products/editor/{id}/preview")
    }

    /// Open an empty create-mode editor.
    pub async fn open_create(&self, owner: ClientId) -> Arc<EditorSlot> {
        let id = Uuid::new_v4();
        let editor = ProductEditor::create(Self::preview_base(id), self.on_close(id));
        self.insert(id, owner, editor).await
    }

    /// Open an edit-mode editor seeded from `product`.
    pub async fn open_edit(&self, owner: ClientId, product: &Product) -> Arc<EditorSlot> {
        let id = Uuid::new_v4();
        let editor = ProductEditor::edit(product, Self::preview_base(id), self.on_close(id));
        self.insert(id, owner, editor).await
    }

    /// Fetch an open editor if it belongs to `owner`.
    pub async fn get(&self, id: Uuid, owner: &ClientId) -> Option<Arc<EditorSlot>> {
        let slot = self.inner.editors.get(&id).await?;
        if &slot.owner != owner {
            warn!(editor_id = %id, "Editor requested by a different admin");
            return None;
        }
        Some(slot)
    }

    /// Drop an editor regardless of its state.
    pub async fn discard(&self, id: Uuid) {
        self.inner.editors.invalidate(&id).await;
    }

    async fn insert(&self, id: Uuid, owner: ClientId, editor: ProductEditor) -> Arc<EditorSlot> {
        let slot = Arc::new(EditorSlot {
            id,
            owner,
            editor: Mutex::new(editor),
        });
        self.inner.editors.insert(id, Arc::clone(&slot)).await;
        debug!(editor_id = %id, "Editor opened");
        slot
    }

    fn on_close(&self, id: Uuid) -> OnClose {
        let closed_tx = self.inner.closed_tx.clone();
        Box::new(move |reason: CloseReason| {
            debug!(editor_id = %id, ?reason, "Editor closed");
            let _ = closed_tx.send(id);
        })
    }
}
