//! Product insert/update editor.
//!
//! A [`ProductEditor`] owns one [`ProductDraft`] and one [`ImageSet`] for the
//! lifetime of an open editor. It is opened in create mode (empty) or edit
//! mode (seeded from a listed product) and closes exactly once: on a
//! successful submit or an explicit cancel. The close callback handed to the
//! constructor is how the host learns about it.
//!
//! Submission is split into [`ProductEditor::begin_submit`] and
//! [`ProductEditor::finish_submit`] so the host can release its lock on the
//! editor while the request is in flight. The in-flight flag set in between
//! rejects a second submission and any mutation until the first one settles.

mod draft;
mod images;
mod store;
mod submission;

use thiserror::Error;
use tracing::{debug, info, warn};

use fabric_core::{CatalogError, ProductId};

use crate::backend::{ApiResponse, BackendError, Product};

pub use draft::{DraftError, DraftForm, Measurement, ProductDraft};
pub use images::{
    CapacityExceeded, ImagePayload, ImageSet, LocalFile, MAX_IMAGES, PreviewItem, PreviewSource,
    RemoteImage,
};
pub use store::{EditorSlot, EditorStore};
pub use submission::{
    CreateProductRequest, ProductApi, ProductFields, ProductRequest, UpdateProductRequest,
};

/// Errors surfaced by the editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Selecting the files would exceed [`MAX_IMAGES`].
    #[error(transparent)]
    CapacityExceeded(#[from] CapacityExceeded),

    /// The backend answered `success: false`.
    #[error("{message}")]
    ValidationRejected { message: String },

    /// The request failed in transport or on the server.
    #[error("{message}")]
    TransportFailure {
        message: String,
        #[source]
        source: BackendError,
    },

    /// A submission is already in flight.
    #[error("A save is already in progress")]
    SubmissionInFlight,

    /// The editor was already saved or cancelled.
    #[error("This editor has already been closed")]
    EditorClosed,

    /// The sub-category does not belong to the selected category.
    #[error(transparent)]
    InvalidSubCategory(CatalogError),

    /// A field value could not be applied.
    #[error(transparent)]
    InvalidField(DraftError),
}

impl From<DraftError> for EditorError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::Catalog(err @ CatalogError::SubCategoryMismatch { .. }) => {
                Self::InvalidSubCategory(err)
            }
            other => Self::InvalidField(other),
        }
    }
}

/// Whether the editor creates a new product or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { product_id: ProductId },
}

/// Why an editor closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Saved,
    Cancelled,
}

/// Host callback invoked when the editor closes.
pub type OnClose = Box<dyn FnOnce(CloseReason) + Send>;

/// One open product editor.
pub struct ProductEditor {
    mode: EditorMode,
    draft: ProductDraft,
    images: ImageSet,
    in_flight: bool,
    on_close: Option<OnClose>,
}

impl std::fmt::Debug for ProductEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductEditor")
            .field("mode", &self.mode)
            .field("draft", &self.draft)
            .field("images", &self.images)
            .field("in_flight", &self.in_flight)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ProductEditor {
    /// Open an empty editor for a new product.
    #[must_use]
    pub fn create(preview_base: impl Into<String>, on_close: OnClose) -> Self {
        Self {
            mode: EditorMode::Create,
            draft: ProductDraft::default(),
            images: ImageSet::new(preview_base),
            in_flight: false,
            on_close: Some(on_close),
        }
    }

    /// Open an editor seeded from a listed product.
    #[must_use]
    pub fn edit(product: &Product, preview_base: impl Into<String>, on_close: OnClose) -> Self {
        let remote = product.images.iter().map(RemoteImage::from).collect();
        Self {
            mode: EditorMode::Edit {
                product_id: product.id.clone(),
            },
            draft: ProductDraft::from_product(product),
            images: ImageSet::with_remote(preview_base, remote),
            in_flight: false,
            on_close: Some(on_close),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> &EditorMode {
        &self.mode
    }

    #[must_use]
    pub const fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    #[must_use]
    pub const fn images(&self) -> &ImageSet {
        &self.images
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.on_close.is_none()
    }

    /// Apply the field form to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] when the editor is not editable or the form is
    /// invalid; the draft is untouched in that case.
    pub fn update_fields(&mut self, form: &DraftForm) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.draft.apply_form(form)?;
        Ok(())
    }

    /// Stage selected image files.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::CapacityExceeded`] when the files do not fit.
    pub fn add_files(&mut self, files: Vec<LocalFile>) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.images.add_files(files).inspect_err(|err| {
            debug!(
                current = err.current,
                requested = err.requested,
                "Rejected image selection over capacity"
            );
        })?;
        Ok(())
    }

    /// Remove the image at a preview index. Out-of-range indices are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] when the editor is not editable.
    pub fn remove_image(&mut self, preview_index: usize) -> Result<bool, EditorError> {
        self.ensure_editable()?;
        Ok(self.images.remove_at(preview_index))
    }

    /// Append a free-text feature; blank input is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] when the editor is not editable.
    pub fn add_feature(&mut self, input: &str) -> Result<bool, EditorError> {
        self.ensure_editable()?;
        Ok(self.draft.add_feature(input))
    }

    /// Remove the feature at `index`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] when the editor is not editable.
    pub fn remove_feature(&mut self, index: usize) -> Result<Option<String>, EditorError> {
        self.ensure_editable()?;
        Ok(self.draft.remove_feature(index))
    }

    /// Look up a staged file by preview token.
    #[must_use]
    pub fn staged_preview(&self, token: uuid::Uuid) -> Option<&LocalFile> {
        self.images.staged_preview(token)
    }

    /// Build the request for the current state and mark a submission in flight.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::EditorClosed`] or
    /// [`EditorError::SubmissionInFlight`]; nothing changes in that case.
    pub fn begin_submit(&mut self) -> Result<ProductRequest, EditorError> {
        self.ensure_editable()?;

        let fields = self.draft.fields();
        let ImagePayload { files, deleted } = self.images.to_payload();
        let request = match &self.mode {
            EditorMode::Create => ProductRequest::Create(CreateProductRequest {
                fields,
                images: files,
            }),
            EditorMode::Edit { product_id } => ProductRequest::Update(UpdateProductRequest {
                product_id: product_id.clone(),
                fields,
                images: files,
                deleted_images: deleted,
            }),
        };

        self.in_flight = true;
        Ok(request)
    }

    /// Settle an in-flight submission with the API result.
    ///
    /// On success the draft and images are reset, the editor closes and the
    /// backend message is returned. On failure nothing but the in-flight flag
    /// changes and the editor stays open. If the editor was cancelled while
    /// the request ran, the outcome is reported but the editor state is left
    /// alone and the close callback does not fire again.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ValidationRejected`] for `success: false` and
    /// [`EditorError::TransportFailure`] when the call itself failed.
    pub fn finish_submit(
        &mut self,
        result: Result<ApiResponse, BackendError>,
    ) -> Result<String, EditorError> {
        self.in_flight = false;

        match result {
            Ok(response) if response.success => {
                let message = response.message_or(self.success_message());
                if self.is_closed() {
                    info!(mode = ?self.mode, "Product saved after editor was cancelled");
                    return Ok(message);
                }
                info!(mode = ?self.mode, "Product saved");
                self.draft.clear();
                self.images.clear();
                self.close(CloseReason::Saved);
                Ok(message)
            }
            Ok(response) => {
                let message = response.message_or(self.failure_message());
                debug!(%message, "Backend rejected product");
                Err(EditorError::ValidationRejected { message })
            }
            Err(source) => {
                warn!(error = %source, transport = source.is_transport(), "Product save failed");
                Err(EditorError::TransportFailure {
                    message: self.failure_message().to_string(),
                    source,
                })
            }
        }
    }

    /// Submit through `api` in one step.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_submit`] and [`Self::finish_submit`].
    pub async fn submit<A: ProductApi>(&mut self, api: &A) -> Result<String, EditorError> {
        let request = self.begin_submit()?;
        let result = request.dispatch(api).await;
        self.finish_submit(result)
    }

    /// Close without saving. Allowed while a submission is in flight; the
    /// request is not aborted.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::EditorClosed`] when the editor is already closed.
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        if self.is_closed() {
            return Err(EditorError::EditorClosed);
        }
        self.close(CloseReason::Cancelled);
        Ok(())
    }

    /// Generic notice shown when a save fails.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "Failed to add product",
            EditorMode::Edit { .. } => "Failed to update product",
        }
    }

    const fn success_message(&self) -> &'static str {
        match self.mode {
            EditorMode::Create => "Product added successfully",
            EditorMode::Edit { .. } => "Product updated successfully",
        }
    }

    const fn ensure_editable(&self) -> Result<(), EditorError> {
        if self.on_close.is_none() {
            return Err(EditorError::EditorClosed);
        }
        if self.in_flight {
            return Err(EditorError::SubmissionInFlight);
        }
        Ok(())
    }

    fn close(&mut self, reason: CloseReason) {
        if let Some(on_close) = self.on_close.take() {
            on_close(reason);
        }
    }
}
