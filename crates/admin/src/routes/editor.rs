//! Product editor route handlers.
//!
//! Each open editor lives in the [`EditorStore`](crate::editor::EditorStore)
//! under a random ID. Every handler locks the editor for a single mutation,
//! queues a notice where the user needs feedback and redirects back to the
//! editor page. Submitting releases the lock while the backend call runs.

use std::sync::Arc;

use askama::Template;
use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use fabric_core::{Category, ProductId, ProductTag};

use super::dashboard::PageChrome;
use super::products::find_product;
use super::render;
use crate::editor::{
    DraftForm, EditorError, EditorMode, EditorSlot, LocalFile, MAX_IMAGES, Measurement,
    PreviewSource, ProductEditor,
};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, push_notice};
use crate::models::{CurrentAdmin, Notice};
use crate::state::AppState;

/// Multipart field carrying selected image files.
const IMAGES_FIELD: &str = "images";

// =============================================================================
// Views
// =============================================================================

/// A `<select>` option or checkbox.
#[derive(Debug, Clone)]
pub struct ChoiceView {
    pub value: String,
    pub selected: bool,
}

/// A feature row.
#[derive(Debug, Clone)]
pub struct FeatureView {
    pub index: usize,
    pub text: String,
}

/// A measurement input.
#[derive(Debug, Clone)]
pub struct MeasurementView {
    pub field: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// A preview thumbnail.
#[derive(Debug, Clone)]
pub struct PreviewView {
    pub index: usize,
    pub url: String,
    pub is_staged: bool,
}

/// Everything the editor page renders.
#[derive(Debug, Clone)]
pub struct EditorView {
    pub id: String,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub name: String,
    pub categories: Vec<ChoiceView>,
    pub sub_categories: Vec<ChoiceView>,
    pub in_stock: bool,
    pub price: String,
    pub discount_price: String,
    pub description: String,
    pub tags: Vec<ChoiceView>,
    pub features: Vec<FeatureView>,
    pub measurements: Vec<MeasurementView>,
    pub previews: Vec<PreviewView>,
    pub remaining_images: usize,
    pub max_images: usize,
    pub deleted_count: usize,
    pub in_flight: bool,
}

impl EditorView {
    #[must_use]
    pub fn new(id: Uuid, editor: &ProductEditor) -> Self {
        let draft = editor.draft();
        let images = editor.images();
        let (title, submit_label) = match editor.mode() {
            EditorMode::Create => ("Add Product", "Add Product"),
            EditorMode::Edit { .. } => ("Edit Product", "Update Product"),
        };
        let decimal = |d: Option<rust_decimal::Decimal>| d.map(|d| d.to_string()).unwrap_or_default();

        Self {
            id: id.to_string(),
            title,
            submit_label,
            name: draft.name.clone(),
            categories: Category::all()
                .map(|c| ChoiceView {
                    value: c.to_string(),
                    selected: draft.category() == Some(c),
                })
                .collect(),
            sub_categories: draft
                .category()
                .map(|c| c.sub_categories())
                .unwrap_or_default()
                .iter()
                .map(|s| ChoiceView {
                    value: s.to_string(),
                    selected: draft.sub_category() == Some(*s),
                })
                .collect(),
            in_stock: draft.stock.is_in_stock(),
            price: decimal(draft.price),
            discount_price: decimal(draft.discount_price),
            description: draft.description.clone(),
            tags: ProductTag::all()
                .map(|t| ChoiceView {
                    value: t.to_string(),
                    selected: draft.tags().contains(&t),
                })
                .collect(),
            features: draft
                .features()
                .iter()
                .enumerate()
                .map(|(index, text)| FeatureView {
                    index,
                    text: text.clone(),
                })
                .collect(),
            measurements: Measurement::ALL
                .iter()
                .map(|m| MeasurementView {
                    field: m.field_name(),
                    label: m.label(),
                    value: decimal(draft.measurement(*m)),
                })
                .collect(),
            previews: images
                .preview()
                .iter()
                .enumerate()
                .map(|(index, item)| PreviewView {
                    index,
                    url: item.display_url.clone(),
                    is_staged: matches!(item.source, PreviewSource::Staged { .. }),
                })
                .collect(),
            remaining_images: images.remaining_capacity(),
            max_images: MAX_IMAGES,
            deleted_count: images.deleted().len(),
            in_flight: editor.is_in_flight(),
        }
    }
}

/// Editor page template.
#[derive(Template)]
#[template(path = "products/editor.html")]
pub struct EditorTemplate {
    pub chrome: PageChrome,
    pub editor: EditorView,
}

/// Posted feature text.
#[derive(Debug, Deserialize)]
pub struct FeatureForm {
    #[serde(default)]
    pub feature: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn editor_path(id: Uuid) -> String {
    format!("/products/editor/{id}")
}

fn back_to(id: Uuid) -> Redirect {
    Redirect::to(&editor_path(id))
}

/// Resolve an editor owned by `admin`, or send the user back to the list.
async fn load_slot(
    state: &AppState,
    session: &Session,
    admin: &CurrentAdmin,
    id: Uuid,
) -> Result<Arc<EditorSlot>, Response> {
    if let Some(slot) = state.editors().get(id, &admin.id).await {
        return Ok(slot);
    }
    if let Err(e) = push_notice(session, Notice::error("This editor has expired. Please open it again.")).await {
        warn!(editor_id = %id, error = %e, "Failed to store notice");
    }
    Err(Redirect::to("/products").into_response())
}

/// Queue a notice for an editor error, or go back to the list if it closed.
async fn editor_error(session: &Session, id: Uuid, err: EditorError) -> Response {
    let closed = matches!(err, EditorError::EditorClosed);
    if let Err(e) = push_notice(session, Notice::error(err.to_string())).await {
        warn!(editor_id = %id, error = %e, "Failed to store notice");
    }
    if closed {
        Redirect::to("/products").into_response()
    } else {
        back_to(id).into_response()
    }
}

fn draft_form(body: &Bytes) -> DraftForm {
    DraftForm::from_pairs(url::form_urlencoded::parse(body))
}

// =============================================================================
// Handlers
// =============================================================================

/// Open a create-mode editor.
///
/// POST /products/new
#[instrument(skip(admin, state))]
pub async fn open_create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Redirect {
    let slot = state.editors().open_create(admin.id.clone()).await;
    Redirect::to(&editor_path(slot.id()))
}

/// Open an edit-mode editor for a listed product.
///
/// POST /products/{id}/edit
#[instrument(skip(admin, state))]
pub async fn open_edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Redirect, AppError> {
    let product = find_product(&state, &ProductId::new(product_id)).await?;
    let slot = state.editors().open_edit(admin.id.clone(), &product).await;
    Ok(Redirect::to(&editor_path(slot.id())))
}

/// Render the editor.
///
/// GET /products/editor/{editor_id}
#[instrument(skip(admin, state, session))]
pub async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(editor_id): Path<Uuid>,
) -> Response {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let view = EditorView::new(editor_id, &*slot.lock().await);

    render(&EditorTemplate {
        chrome: PageChrome::signed_in(&admin, &session, "/products").await,
        editor: view,
    })
    .into_response()
}

/// Apply the field form.
///
/// POST /products/editor/{editor_id}/fields
#[instrument(skip(admin, state, session, body))]
pub async fn update_fields(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(editor_id): Path<Uuid>,
    body: Bytes,
) -> Response {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let result = slot.lock().await.update_fields(&draft_form(&body));
    match result {
        Ok(()) => back_to(editor_id).into_response(),
        Err(err) => editor_error(&session, editor_id, err).await,
    }
}

/// Stage uploaded image files.
///
/// POST /products/editor/{editor_id}/images
#[instrument(skip(admin, state, session, multipart))]
pub async fn add_images(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(editor_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return Ok(response),
    };

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        // Browsers send an empty part when no file was chosen.
        if file_name.is_empty() && data.is_empty() {
            continue;
        }
        let file = LocalFile::new(file_name, content_type, data.to_vec());
        if !file.is_image() {
            push_notice(&session, Notice::error("Only image files can be uploaded")).await?;
            return Ok(back_to(editor_id).into_response());
        }
        files.push(file);
    }

    let result = slot.lock().await.add_files(files);
    Ok(match result {
        Ok(()) => back_to(editor_id).into_response(),
        Err(err) => editor_error(&session, editor_id, err).await,
    })
}

/// Remove the image at a preview index.
///
/// POST /products/editor/{editor_id}/images/{index}/remove
#[instrument(skip(admin, state, session))]
pub async fn remove_image(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path((editor_id, index)): Path<(Uuid, usize)>,
) -> Response {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let result = slot.lock().await.remove_image(index);
    match result {
        Ok(_) => back_to(editor_id).into_response(),
        Err(err) => editor_error(&session, editor_id, err).await,
    }
}

/// Append a feature.
///
/// POST /products/editor/{editor_id}/features
#[instrument(skip(admin, state, session, form))]
pub async fn add_feature(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(editor_id): Path<Uuid>,
    Form(form): Form<FeatureForm>,
) -> Response {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let result = slot.lock().await.add_feature(&form.feature);
    match result {
        Ok(_) => back_to(editor_id).into_response(),
        Err(err) => editor_error(&session, editor_id, err).await,
    }
}

/// Remove a feature by position.
///
/// POST /products/editor/{editor_id}/features/{index}/remove
#[instrument(skip(admin, state, session))]
pub async fn remove_feature(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path((editor_id, index)): Path<(Uuid, usize)>,
) -> Response {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let result = slot.lock().await.remove_feature(index);
    match result {
        Ok(_) => back_to(editor_id).into_response(),
        Err(err) => editor_error(&session, editor_id, err).await,
    }
}

/// Apply the posted fields and save the product.
///
/// POST /products/editor/{editor_id}/submit
#[instrument(skip(admin, state, session, body))]
pub async fn submit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(editor_id): Path<Uuid>,
    body: Bytes,
) -> Result<Response, AppError> {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return Ok(response),
    };

    let request = {
        let mut editor = slot.lock().await;
        let prepared = editor
            .update_fields(&draft_form(&body))
            .and_then(|()| editor.begin_submit());
        match prepared {
            Ok(request) => request,
            Err(err) => return Ok(editor_error(&session, editor_id, err).await),
        }
    };

    // Settled on its own task so a dropped connection cannot strand the editor
    let outcome = slot
        .save(request, state.backend().clone())
        .await
        .map_err(|e| AppError::Internal(format!("Product save task failed: {e}")))?;

    match outcome {
        Ok(message) => {
            info!(editor_id = %editor_id, "Product editor saved");
            push_notice(&session, Notice::success(message)).await?;
            Ok(Redirect::to("/products").into_response())
        }
        Err(err) => {
            if let EditorError::TransportFailure { source, .. } = &err {
                warn!(editor_id = %editor_id, error = %source, "Product save failed");
            }
            Ok(editor_error(&session, editor_id, err).await)
        }
    }
}

/// Close the editor without saving.
///
/// POST /products/editor/{editor_id}/cancel
#[instrument(skip(admin, state, session))]
pub async fn cancel(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(editor_id): Path<Uuid>,
) -> Response {
    let slot = match load_slot(&state, &session, &admin, editor_id).await {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let result = slot.lock().await.cancel();
    match result {
        Ok(()) => Redirect::to("/products").into_response(),
        Err(err) => editor_error(&session, editor_id, err).await,
    }
}

/// Serve a staged image through its preview URL.
///
/// GET /products/editor/{editor_id}/preview/{token}
#[instrument(skip(admin, state))]
pub async fn preview(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path((editor_id, token)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("preview".to_string());
    let slot = state
        .editors()
        .get(editor_id, &admin.id)
        .await
        .ok_or_else(not_found)?;
    let editor = slot.lock().await;
    let file = editor.staged_preview(token).ok_or_else(not_found)?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type().to_string()),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        file.data().to_vec(),
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::editor::OnClose;
    use crate::middleware::take_notice;

    fn noop() -> OnClose {
        Box::new(|_| {})
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_editor_error_queues_notice_and_returns_to_editor() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let id = Uuid::new_v4();

        let response = editor_error(&session, id, EditorError::SubmissionInFlight).await;

        assert_eq!(location(&response), editor_path(id));
        let notice = take_notice(&session).await.unwrap();
        assert_eq!(notice.message, EditorError::SubmissionInFlight.to_string());
    }

    #[tokio::test]
    async fn test_editor_error_for_closed_editor_returns_to_list() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        let response = editor_error(&session, Uuid::new_v4(), EditorError::EditorClosed).await;

        assert_eq!(location(&response), "/products");
        assert!(take_notice(&session).await.is_some());
    }

    #[test]
    fn test_view_of_empty_create_editor() {
        let editor = ProductEditor::create("/p", noop());
        let view = EditorView::new(Uuid::nil(), &editor);

        assert_eq!(view.title, "Add Product");
        assert_eq!(view.categories.len(), 3);
        assert!(view.categories.iter().all(|c| !c.selected));
        assert!(view.sub_categories.is_empty());
        assert_eq!(view.tags.len(), 5);
        assert_eq!(view.remaining_images, MAX_IMAGES);
        assert_eq!(view.measurements[0].field, "paintMeter");
    }

    #[test]
    fn test_view_lists_sub_categories_of_selected_category() {
        let mut editor = ProductEditor::create("/p", noop());
        editor
            .update_fields(&DraftForm::from_pairs([
                ("category", "Silk Fabric"),
                ("subCategory", "Raw Silk"),
            ]))
            .unwrap();
        let view = EditorView::new(Uuid::nil(), &editor);

        let subs: Vec<&str> = view.sub_categories.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(subs, vec!["Raw Silk", "Banarasi Silk", "Tussar Silk"]);
        assert!(view.sub_categories[0].selected);
    }

    #[test]
    fn test_view_marks_staged_previews() {
        let mut editor = ProductEditor::create("/p", noop());
        editor
            .add_files(vec![LocalFile::new("a.jpg", "image/jpeg", vec![1])])
            .unwrap();
        let view = EditorView::new(Uuid::nil(), &editor);

        assert_eq!(view.previews.len(), 1);
        assert!(view.previews[0].is_staged);
        assert!(view.previews[0].url.starts_with("/p/"));
        assert_eq!(view.remaining_images, MAX_IMAGES - 1);
    }

    #[test]
    fn test_draft_form_keeps_repeated_tags() {
        let body = Bytes::from_static(b"productName=Voile&tags=Trending&tags=Best+Seller&inStock=on");
        let form = draft_form(&body);
        assert_eq!(form.name, "Voile");
        assert_eq!(form.tags, vec!["Trending", "Best Seller"]);
        assert!(form.in_stock);
    }
}
