//! Product editor scenarios through the public library API.
//!
//! The editor submits through a [`FakeProductApi`] that records every request
//! and answers from a script, so these run without a backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use fabric_admin::backend::{ApiResponse, BackendError};
use fabric_admin::editor::{
    CloseReason, CreateProductRequest, DraftForm, EditorError, EditorMode, ImageSet, LocalFile,
    MAX_IMAGES, PreviewItem, PreviewSource, ProductApi, ProductEditor, ProductRequest,
    RemoteImage, UpdateProductRequest,
};
use fabric_core::{Category, ImageId, ProductId, ProductTag, SubCategory};
use fabric_integration_tests::{CloseLog, FakeProductApi, Reply, jpeg, jpegs, silk_product};

const PREVIEW_BASE: &str = "/products/editor/test/preview";

fn create_editor(log: &CloseLog) -> ProductEditor {
    ProductEditor::create(PREVIEW_BASE, log.callback())
}

fn edit_editor(log: &CloseLog, image_count: usize) -> ProductEditor {
    ProductEditor::edit(&silk_product(image_count), PREVIEW_BASE, log.callback())
}

fn ids(names: &[&str]) -> Vec<ImageId> {
    names.iter().map(|n| ImageId::new(*n)).collect()
}

type ImageSnapshot = (Vec<RemoteImage>, Vec<LocalFile>, Vec<ImageId>, Vec<PreviewItem>);

/// Everything observable about an image set.
fn snapshot(set: &ImageSet) -> ImageSnapshot {
    (
        set.remote().to_vec(),
        set.staged().to_vec(),
        set.deleted().to_vec(),
        set.preview().to_vec(),
    )
}

fn text_part(request: &ProductRequest, name: &str) -> Option<String> {
    request
        .text_parts()
        .into_iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_create_with_three_files_sends_three_parts() {
    let log = CloseLog::new();
    let api = FakeProductApi::new();
    let mut editor = create_editor(&log);

    editor.add_files(jpegs(3)).unwrap();
    assert_eq!(editor.images().preview().len(), 3);
    assert!(editor.images().deleted().is_empty());

    editor.submit(&api).await.unwrap();

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(matches!(request, ProductRequest::Create(_)));
    assert_eq!(request.files().len(), 3);
    assert_eq!(text_part(request, "deletedImages"), None);
    assert_eq!(text_part(request, "productId"), None);
}

#[test]
fn test_removing_first_remote_image_marks_it_deleted() {
    let log = CloseLog::new();
    let mut editor = edit_editor(&log, 2);

    assert!(editor.remove_image(0).unwrap());

    let images = editor.images();
    assert_eq!(images.remote().len(), 1);
    assert_eq!(images.remote()[0].id, ImageId::new("img-2.jpg"));
    assert_eq!(images.deleted(), ids(&["img-1.jpg"]).as_slice());
    assert_eq!(images.preview().len(), 1);
}

#[test]
fn test_over_capacity_selection_is_rejected_whole() {
    let log = CloseLog::new();
    let mut editor = edit_editor(&log, 2);
    let before = snapshot(editor.images());

    let err = editor.add_files(jpegs(4)).unwrap_err();

    match err {
        EditorError::CapacityExceeded(exceeded) => {
            assert_eq!(exceeded.current, 2);
            assert_eq!(exceeded.requested, 4);
            assert_eq!(exceeded.max, MAX_IMAGES);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }
    assert_eq!(snapshot(editor.images()), before);
    assert_eq!(editor.images().preview().len(), 2);
    assert!(editor.images().staged().is_empty());
}

#[test]
fn test_blank_feature_is_ignored() {
    let log = CloseLog::new();
    let mut editor = create_editor(&log);

    assert!(editor.add_feature("100% cotton").unwrap());
    assert!(!editor.add_feature("  ").unwrap());

    assert_eq!(editor.draft().features(), ["100% cotton"]);
}

#[tokio::test]
async fn test_failed_submit_leaves_editor_untouched() {
    let log = CloseLog::new();
    let api = FakeProductApi::with_replies([Reply::Fail(502)]);
    let mut editor = edit_editor(&log, 2);
    editor.add_files(jpegs(1)).unwrap();
    editor.remove_image(0).unwrap();
    let draft_before = editor.draft().clone();
    let images_before = snapshot(editor.images());

    let err = editor.submit(&api).await.unwrap_err();

    match &err {
        EditorError::TransportFailure { message, .. } => {
            assert_eq!(message, "Failed to update product");
        }
        other => panic!("expected TransportFailure, got {other:?}"),
    }
    assert_eq!(editor.draft(), &draft_before);
    assert_eq!(snapshot(editor.images()), images_before);
    assert!(!editor.is_closed());
    assert!(!editor.is_in_flight());
    assert!(log.reasons().is_empty());
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_update_request_carries_id_files_and_deletions() {
    let log = CloseLog::new();
    let api = FakeProductApi::with_replies([Reply::Accept("Product updated".to_string())]);
    let mut editor = edit_editor(&log, 3);

    editor.remove_image(1).unwrap();
    editor.add_files(vec![jpeg("new.jpg")]).unwrap();

    let message = editor.submit(&api).await.unwrap();
    assert_eq!(message, "Product updated");

    let requests = api.requests();
    let ProductRequest::Update(update) = &requests[0] else {
        panic!("expected an update request");
    };
    assert_eq!(update.product_id, ProductId::new("p-42"));
    assert_eq!(update.deleted_images, ids(&["img-2.jpg"]));
    assert_eq!(update.images.len(), 1);
    assert_eq!(update.images[0].file_name(), "new.jpg");

    let parts = requests[0].text_parts();
    assert_eq!(parts.first().map(|(k, _)| *k), Some("productId"));
    assert_eq!(parts.last().map(|(k, _)| *k), Some("deletedImages"));
    assert_eq!(
        text_part(&requests[0], "deletedImages").as_deref(),
        Some(r#"["img-2.jpg"]"#)
    );
}

#[tokio::test]
async fn test_successful_submit_resets_and_closes_once() {
    let log = CloseLog::new();
    let api = FakeProductApi::new();
    let mut editor = create_editor(&log);
    editor
        .update_fields(&DraftForm::from_pairs([
            ("productName", "Kalamkari Cotton"),
            ("category", "Cotton Fabric"),
            ("subCategory", "Printed Cotton"),
            ("price", "650"),
            ("tags", "Trending"),
        ]))
        .unwrap();
    editor.add_files(jpegs(2)).unwrap();

    let message = editor.submit(&api).await.unwrap();

    assert_eq!(message, "Product added successfully");
    assert!(editor.is_closed());
    assert!(editor.images().is_empty());
    assert_eq!(editor.draft().name, "");
    assert_eq!(log.reasons(), vec![CloseReason::Saved]);

    let fields = api.requests()[0].fields().clone();
    assert_eq!(fields.name, "Kalamkari Cotton");
    assert_eq!(fields.category, Some(Category::Cotton));
    assert_eq!(fields.sub_category, Some(SubCategory::PrintedCotton));
    assert_eq!(fields.tags, vec![ProductTag::Trending]);

    // A closed editor neither submits again nor signals again
    assert!(matches!(
        editor.submit(&api).await,
        Err(EditorError::EditorClosed)
    ));
    assert!(matches!(editor.cancel(), Err(EditorError::EditorClosed)));
    assert_eq!(api.requests().len(), 1);
    assert_eq!(log.reasons().len(), 1);
}

#[tokio::test]
async fn test_rejected_submit_shows_backend_message() {
    let log = CloseLog::new();
    let api = FakeProductApi::with_replies([Reply::Reject("Product name already exists".to_string())]);
    let mut editor = create_editor(&log);
    editor.add_feature("Hand loomed").unwrap();

    let err = editor.submit(&api).await.unwrap_err();

    assert!(matches!(
        &err,
        EditorError::ValidationRejected { message } if message == "Product name already exists"
    ));
    assert_eq!(editor.draft().features(), ["Hand loomed"]);
    assert!(!editor.is_closed());

    // Never retried automatically; a manual retry goes through
    assert_eq!(api.requests().len(), 1);
    editor.submit(&api).await.unwrap();
    assert_eq!(api.requests().len(), 2);
}

#[tokio::test]
async fn test_in_flight_submission_blocks_everything() {
    let log = CloseLog::new();
    let mut editor = create_editor(&log);

    let request = editor.begin_submit().unwrap();
    assert!(editor.is_in_flight());

    assert!(matches!(
        editor.begin_submit(),
        Err(EditorError::SubmissionInFlight)
    ));
    assert!(matches!(
        editor.add_files(jpegs(1)),
        Err(EditorError::SubmissionInFlight)
    ));
    assert!(matches!(
        editor.add_feature("x"),
        Err(EditorError::SubmissionInFlight)
    ));

    let api = FakeProductApi::new();
    let result = request.dispatch(&api).await;
    editor.finish_submit(result).unwrap();
    assert!(!editor.is_in_flight());
    assert_eq!(log.reasons(), vec![CloseReason::Saved]);
}

#[tokio::test]
async fn test_cancel_during_submission_wins_over_late_success() {
    let log = CloseLog::new();
    let api = FakeProductApi::new();
    let mut editor = create_editor(&log);
    editor.add_files(jpegs(1)).unwrap();

    let request = editor.begin_submit().unwrap();
    editor.cancel().unwrap();
    assert_eq!(log.reasons(), vec![CloseReason::Cancelled]);

    let result = request.dispatch(&api).await;
    editor.finish_submit(result).unwrap();

    assert!(!editor.is_in_flight());
    assert_eq!(log.reasons(), vec![CloseReason::Cancelled]);
    assert!(matches!(editor.begin_submit(), Err(EditorError::EditorClosed)));
}

/// A backend that never answers.
struct HangingApi;

impl ProductApi for HangingApi {
    async fn create_product(&self, _: &CreateProductRequest) -> Result<ApiResponse, BackendError> {
        std::future::pending().await
    }

    async fn update_product(&self, _: &UpdateProductRequest) -> Result<ApiResponse, BackendError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_abandoned_submit_can_still_be_cancelled() {
    let log = CloseLog::new();
    let mut editor = edit_editor(&log, 1);

    let timed_out = tokio::time::timeout(Duration::from_millis(20), editor.submit(&HangingApi)).await;
    assert!(timed_out.is_err());
    assert!(editor.is_in_flight());

    editor.cancel().unwrap();

    assert_eq!(log.reasons(), vec![CloseReason::Cancelled]);
    assert!(matches!(
        editor.add_feature("late"),
        Err(EditorError::EditorClosed)
    ));
}

#[test]
fn test_cancel_signals_close_once() {
    let log = CloseLog::new();
    let mut editor = edit_editor(&log, 1);

    editor.cancel().unwrap();

    assert!(editor.is_closed());
    assert_eq!(log.reasons(), vec![CloseReason::Cancelled]);
    assert!(matches!(
        editor.add_feature("late"),
        Err(EditorError::EditorClosed)
    ));
}

#[test]
fn test_edit_mode_seeds_draft_from_product() {
    let log = CloseLog::new();
    let editor = edit_editor(&log, 2);

    assert_eq!(
        editor.mode(),
        &EditorMode::Edit {
            product_id: ProductId::new("p-42")
        }
    );
    let draft = editor.draft();
    assert_eq!(draft.name, "Banarasi Brocade");
    assert_eq!(draft.category(), Some(Category::Silk));
    assert_eq!(draft.sub_category(), Some(SubCategory::BanarasiSilk));
    assert!(draft.tags().contains(&ProductTag::BestSeller));
    assert_eq!(draft.features(), ["Pure silk"]);
    assert_eq!(editor.images().remote().len(), 2);
}

#[test]
fn test_changing_category_drops_stale_sub_category() {
    let log = CloseLog::new();
    let mut editor = edit_editor(&log, 0);

    editor
        .update_fields(&DraftForm::from_pairs([
            ("productName", "Banarasi Brocade"),
            ("category", "Linen Fabric"),
            ("subCategory", "Banarasi Silk"),
        ]))
        .unwrap();

    assert_eq!(editor.draft().category(), Some(Category::Linen));
    assert_eq!(editor.draft().sub_category(), None);

    let err = editor
        .update_fields(&DraftForm::from_pairs([
            ("category", "Linen Fabric"),
            ("subCategory", "Raw Silk"),
        ]))
        .unwrap_err();
    assert!(matches!(err, EditorError::InvalidSubCategory(_)));
    assert_eq!(editor.draft().name, "Banarasi Brocade");
}

// ============================================================================
// Image set properties
// ============================================================================

fn remote(count: usize) -> Vec<RemoteImage> {
    (1..=count)
        .map(|n| RemoteImage {
            id: ImageId::new(format!("img-{n}.jpg")),
            url: format!("http://cdn.test/img-{n}.jpg"),
        })
        .collect()
}

/// Deterministic pseudo-random stream for operation sequences.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        usize::try_from((self.0 >> 33) % bound as u64).unwrap()
    }
}

#[test]
fn test_random_operation_sequences_keep_invariants() {
    for seed in 0..64 {
        let mut rng = Lcg(seed);
        let start = rng.next(MAX_IMAGES + 1);
        let mut set = ImageSet::with_remote(PREVIEW_BASE, remote(start));
        let mut deleted_seen = Vec::new();

        for step in 0..40 {
            if rng.next(2) == 0 {
                let files = jpegs(rng.next(4));
                let before = snapshot(&set);
                if set.add_files(files).is_err() {
                    assert_eq!(snapshot(&set), before, "seed {seed} step {step}");
                }
            } else {
                let index = rng.next(MAX_IMAGES + 2);
                let remote_before = set.remote().len();
                let deleted_before = set.deleted().len();
                let removed = set.remove_at(index);

                if removed && index < remote_before {
                    assert_eq!(set.deleted().len(), deleted_before + 1);
                    let id = set.deleted().last().unwrap().clone();
                    assert!(!deleted_seen.contains(&id), "identifier deleted twice");
                    deleted_seen.push(id);
                } else {
                    assert_eq!(set.deleted().len(), deleted_before);
                }
            }

            assert!(set.remote().len() + set.staged().len() <= MAX_IMAGES);
            assert_eq!(set.preview().len(), set.remote().len() + set.staged().len());

            let remote_count = set.remote().len();
            for (position, item) in set.preview().iter().enumerate() {
                match item.source {
                    PreviewSource::Remote(_) => assert!(position < remote_count),
                    PreviewSource::Staged { offset } => {
                        assert_eq!(offset, position - remote_count);
                    }
                }
            }

            assert_eq!(set.to_payload(), set.to_payload());
            let payload = set.to_payload();
            assert_eq!(payload.files.len(), set.staged().len());
            assert_eq!(payload.deleted, set.deleted());
        }
    }
}

#[test]
fn test_staged_previews_resolve_until_removed() {
    let mut set = ImageSet::new(PREVIEW_BASE);
    set.add_files(jpegs(2)).unwrap();

    let url = set.preview()[1].display_url.clone();
    let token = url.rsplit('/').next().unwrap().parse().unwrap();
    assert_eq!(set.staged_preview(token).unwrap().file_name(), "photo-2.jpg");

    set.remove_at(0);
    assert!(set.staged_preview(token).is_none());
    assert_eq!(set.preview().len(), 1);
}
