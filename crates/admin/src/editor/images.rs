//! Image reconciliation for the product editor.
//!
//! An [`ImageSet`] tracks three disjoint collections:
//!
//! - **remote** images already stored by the backend (edit mode only),
//! - **staged** local files selected in this session but not yet uploaded,
//! - **deleted** identifiers of remote images removed in this session.
//!
//! The preview list shown to the user is always `remote ⧺ staged`, rebuilt
//! after every mutation. Staged files are previewed through scoped preview
//! URLs that are revoked whenever the preview list is rebuilt and when the
//! set is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use fabric_core::ImageId;

use crate::backend::ProductImage;

/// Maximum number of images (remote + staged) a product may carry.
pub const MAX_IMAGES: usize = 5;

/// Rejected attempt to stage more images than the product may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("You can only upload up to {max} images ({current} already attached, {requested} selected)")]
pub struct CapacityExceeded {
    pub current: usize,
    pub requested: usize,
    pub max: usize,
}

/// A locally selected image that has not been uploaded yet.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    file_name: String,
    content_type: String,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl LocalFile {
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the declared content type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// An image already persisted by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteImage {
    pub id: ImageId,
    pub url: String,
}

impl From<&ProductImage> for RemoteImage {
    fn from(image: &ProductImage) -> Self {
        Self {
            id: image.id.clone(),
            url: image.url.clone(),
        }
    }
}

/// Where a preview entry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSource {
    Remote(ImageId),
    Staged { offset: usize },
}

/// One entry of the display-ordered preview list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewItem {
    pub source: PreviewSource,
    pub display_url: String,
}

/// What the submission needs from the image state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImagePayload {
    pub files: Vec<LocalFile>,
    pub deleted: Vec<ImageId>,
}

/// A preview index resolved against the live collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Remote(usize),
    Staged(usize),
}

/// Three-way image state of one product editor.
#[derive(Debug)]
pub struct ImageSet {
    remote: Vec<RemoteImage>,
    staged: Vec<LocalFile>,
    deleted: Vec<ImageId>,
    preview: Vec<PreviewItem>,
    preview_urls: PreviewUrls,
}

impl ImageSet {
    /// An empty set, as used by create mode.
    ///
    /// `preview_base` is the URL prefix staged previews are served under.
    #[must_use]
    pub fn new(preview_base: impl Into<String>) -> Self {
        Self::with_remote(preview_base, Vec::new())
    }

    /// A set seeded with the images of a loaded product (edit mode).
    ///
    /// Images beyond [`MAX_IMAGES`] are kept; they only block further adds.
    #[must_use]
    pub fn with_remote(preview_base: impl Into<String>, remote: Vec<RemoteImage>) -> Self {
        let mut set = Self {
            remote,
            staged: Vec::new(),
            deleted: Vec::new(),
            preview: Vec::new(),
            preview_urls: PreviewUrls::new(preview_base.into()),
        };
        set.rebuild_preview();
        set
    }

    #[must_use]
    pub fn remote(&self) -> &[RemoteImage] {
        &self.remote
    }

    #[must_use]
    pub fn staged(&self) -> &[LocalFile] {
        &self.staged
    }

    #[must_use]
    pub fn deleted(&self) -> &[ImageId] {
        &self.deleted
    }

    #[must_use]
    pub fn preview(&self) -> &[PreviewItem] {
        &self.preview
    }

    /// Remote plus staged images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remote.len() + self.staged.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many more images may be staged.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.len())
    }

    /// Stage newly selected files.
    ///
    /// All-or-nothing: when the selection would push the total past
    /// [`MAX_IMAGES`] nothing is staged and the preview is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityExceeded`] when the selection does not fit.
    pub fn add_files(&mut self, selected: Vec<LocalFile>) -> Result<(), CapacityExceeded> {
        if self.len() + selected.len() > MAX_IMAGES {
            return Err(CapacityExceeded {
                current: self.len(),
                requested: selected.len(),
                max: MAX_IMAGES,
            });
        }
        if selected.is_empty() {
            return Ok(());
        }

        self.staged.extend(selected);
        self.rebuild_preview();
        Ok(())
    }

    /// Remove the image shown at `preview_index`.
    ///
    /// Remote images move their identifier into the deleted list; staged
    /// files are simply dropped. Out-of-range indices are ignored. Returns
    /// whether anything was removed.
    pub fn remove_at(&mut self, preview_index: usize) -> bool {
        match self.slot(preview_index) {
            Some(Slot::Remote(index)) => {
                let image = self.remote.remove(index);
                if !self.deleted.contains(&image.id) {
                    self.deleted.push(image.id);
                }
            }
            Some(Slot::Staged(offset)) => {
                self.staged.remove(offset);
            }
            None => return false,
        }
        self.rebuild_preview();
        true
    }

    /// Files to upload and identifiers to delete. Does not mutate.
    #[must_use]
    pub fn to_payload(&self) -> ImagePayload {
        ImagePayload {
            files: self.staged.clone(),
            deleted: self.deleted.clone(),
        }
    }

    /// Drop every image and deletion, releasing all preview URLs.
    pub fn clear(&mut self) {
        self.remote.clear();
        self.staged.clear();
        self.deleted.clear();
        self.rebuild_preview();
    }

    /// Look up a staged file by the token in its preview URL.
    #[must_use]
    pub fn staged_preview(&self, token: Uuid) -> Option<&LocalFile> {
        self.preview_urls
            .resolve(token)
            .and_then(|offset| self.staged.get(offset))
    }

    /// Resolve a preview index against the *current* collections.
    ///
    /// The preview list is always `remote ⧺ staged`, and `remote` shrinks as
    /// images are deleted, so the boundary is the live remote count rather
    /// than the count at load time.
    fn slot(&self, preview_index: usize) -> Option<Slot> {
        let remote_count = self.remote.len();
        if preview_index < remote_count {
            Some(Slot::Remote(preview_index))
        } else if preview_index - remote_count < self.staged.len() {
            Some(Slot::Staged(preview_index - remote_count))
        } else {
            None
        }
    }

    fn rebuild_preview(&mut self) {
        self.preview_urls.revoke_all();

        let remote = self.remote.iter().map(|image| PreviewItem {
            source: PreviewSource::Remote(image.id.clone()),
            display_url: image.url.clone(),
        });
        let staged: Vec<PreviewItem> = (0..self.staged.len())
            .map(|offset| PreviewItem {
                source: PreviewSource::Staged { offset },
                display_url: self.preview_urls.create(offset),
            })
            .collect();

        self.preview = remote.chain(staged).collect();
    }
}

/// Scoped preview URLs for staged files.
///
/// Each URL embeds a random token mapped to a staged offset. Tokens are only
/// valid until the next rebuild.
#[derive(Debug)]
struct PreviewUrls {
    base: String,
    live: HashMap<Uuid, usize>,
}

impl PreviewUrls {
    fn new(base: String) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            live: HashMap::new(),
        }
    }

    fn create(&mut self, offset: usize) -> String {
        let token = Uuid::new_v4();
        self.live.insert(token, offset);
        format!("{}/{token}", self.base)
    }

    fn resolve(&self, token: Uuid) -> Option<usize> {
        self.live.get(&token).copied()
    }

    fn revoke_all(&mut self) {
        if !self.live.is_empty() {
            tracing::trace!(released = self.live.len(), "Revoked staged preview URLs");
            self.live.clear();
        }
    }
}

impl Drop for PreviewUrls {
    fn drop(&mut self) {
        self.revoke_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const BASE: &str = "/products/editor/test/preview";

    fn file(name: &str) -> LocalFile {
        LocalFile::new(name, "image/jpeg", name.as_bytes().to_vec())
    }

    fn files(count: usize) -> Vec<LocalFile> {
        (0..count).map(|i| file(&format!("local-{i}.jpg"))).collect()
    }

    fn remote(count: usize) -> Vec<RemoteImage> {
        (0..count)
            .map(|i| RemoteImage {
                id: ImageId::new(format!("remote-{i}.jpg")),
                url: format!("http://cdn/remote-{i}.jpg"),
            })
            .collect()
    }

    fn token_of(item: &PreviewItem) -> Uuid {
        let token = item.display_url.rsplit('/').next().unwrap();
        Uuid::parse_str(token).unwrap()
    }

    fn assert_consistent(set: &ImageSet) {
        assert!(set.len() <= MAX_IMAGES);
        assert_eq!(set.preview().len(), set.remote().len() + set.staged().len());
        for (i, item) in set.preview().iter().enumerate() {
            if i < set.remote().len() {
                assert_eq!(item.source, PreviewSource::Remote(set.remote()[i].id.clone()));
            } else {
                assert_eq!(
                    item.source,
                    PreviewSource::Staged {
                        offset: i - set.remote().len()
                    }
                );
            }
        }
    }

    #[test]
    fn test_add_files_in_create_mode() {
        let mut set = ImageSet::new(BASE);
        set.add_files(files(3)).unwrap();

        assert_eq!(set.preview().len(), 3);
        assert!(set.deleted().is_empty());
        assert!(set.preview()[0].display_url.starts_with(BASE));
        assert_consistent(&set);
    }

    #[test]
    fn test_seeded_remote_images_preview_first() {
        let mut set = ImageSet::with_remote(BASE, remote(2));
        set.add_files(files(1)).unwrap();

        assert_eq!(set.preview()[0].display_url, "http://cdn/remote-0.jpg");
        assert_eq!(set.preview()[1].display_url, "http://cdn/remote-1.jpg");
        assert_eq!(set.preview()[2].source, PreviewSource::Staged { offset: 0 });
    }

    #[test]
    fn test_over_capacity_add_leaves_state_unchanged() {
        let mut set = ImageSet::with_remote(BASE, remote(2));
        let before = set.preview().to_vec();

        let err = set.add_files(files(4)).unwrap_err();

        assert_eq!(
            err,
            CapacityExceeded {
                current: 2,
                requested: 4,
                max: MAX_IMAGES
            }
        );
        assert_eq!(set.remote().len(), 2);
        assert!(set.staged().is_empty());
        assert_eq!(set.preview(), before.as_slice());
    }

    #[test]
    fn test_over_capacity_add_keeps_existing_preview_urls() {
        let mut set = ImageSet::new(BASE);
        set.add_files(files(4)).unwrap();
        let before = set.preview().to_vec();

        assert!(set.add_files(files(2)).is_err());

        assert_eq!(set.preview(), before.as_slice());
        assert!(set.staged_preview(token_of(&before[3])).is_some());
    }

    #[test]
    fn test_fill_to_exactly_max() {
        let mut set = ImageSet::with_remote(BASE, remote(2));
        set.add_files(files(3)).unwrap();
        assert_eq!(set.len(), MAX_IMAGES);
        assert_eq!(set.remaining_capacity(), 0);
        assert!(set.add_files(files(1)).is_err());
    }

    #[test]
    fn test_remove_remote_moves_identifier_to_deleted() {
        let mut set = ImageSet::with_remote(BASE, remote(2));

        assert!(set.remove_at(0));

        assert_eq!(set.remote().len(), 1);
        assert_eq!(set.deleted(), &[ImageId::new("remote-0.jpg")]);
        assert_eq!(set.preview().len(), 1);
        assert_eq!(set.preview()[0].display_url, "http://cdn/remote-1.jpg");
        assert!(set.to_payload().files.is_empty());
    }

    #[test]
    fn test_remove_uses_live_remote_count_after_prior_deletion() {
        // remote: [r0, r1], staged: [l0, l1]
        let mut set = ImageSet::with_remote(BASE, remote(2));
        set.add_files(files(2)).unwrap();

        // Delete r0; preview becomes [r1, l0, l1].
        set.remove_at(0);
        // Index 1 is now the first staged file, not r1.
        set.remove_at(1);

        assert_eq!(set.remote().len(), 1);
        assert_eq!(set.remote()[0].id.as_str(), "remote-1.jpg");
        assert_eq!(set.staged().len(), 1);
        assert_eq!(set.staged()[0].file_name(), "local-1.jpg");
        assert_eq!(set.deleted(), &[ImageId::new("remote-0.jpg")]);
        assert_consistent(&set);
    }

    #[test]
    fn test_remove_staged_at_offset() {
        let mut set = ImageSet::with_remote(BASE, remote(1));
        set.add_files(files(3)).unwrap();

        set.remove_at(2);

        let names: Vec<&str> = set.staged().iter().map(LocalFile::file_name).collect();
        assert_eq!(names, vec!["local-0.jpg", "local-2.jpg"]);
        assert!(set.deleted().is_empty());
    }

    #[test]
    fn test_remove_out_of_bounds_is_ignored() {
        let mut set = ImageSet::with_remote(BASE, remote(1));
        set.add_files(files(1)).unwrap();
        let before = set.preview().to_vec();

        assert!(!set.remove_at(2));
        assert!(!set.remove_at(usize::MAX));

        assert_eq!(set.preview(), before.as_slice());
    }

    #[test]
    fn test_payload_is_idempotent() {
        let mut set = ImageSet::with_remote(BASE, remote(3));
        set.add_files(files(2)).unwrap();
        set.remove_at(1);

        assert_eq!(set.to_payload(), set.to_payload());
        let payload = set.to_payload();
        assert_eq!(payload.files.len(), 2);
        assert_eq!(payload.deleted, vec![ImageId::new("remote-1.jpg")]);
    }

    #[test]
    fn test_rebuild_revokes_previous_preview_urls() {
        let mut set = ImageSet::new(BASE);
        set.add_files(files(2)).unwrap();
        let old_token = token_of(&set.preview()[1]);
        assert_eq!(set.staged_preview(old_token).unwrap().file_name(), "local-1.jpg");

        set.remove_at(0);

        assert!(set.staged_preview(old_token).is_none());
        let new_token = token_of(&set.preview()[0]);
        assert_eq!(set.staged_preview(new_token).unwrap().file_name(), "local-1.jpg");
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut set = ImageSet::with_remote(BASE, remote(2));
        set.add_files(files(1)).unwrap();
        let token = token_of(&set.preview()[2]);
        set.remove_at(0);

        set.clear();

        assert!(set.is_empty());
        assert!(set.preview().is_empty());
        assert!(set.deleted().is_empty());
        assert!(set.staged_preview(token).is_none());
    }

    #[test]
    fn test_capacity_holds_over_mixed_sequence() {
        let mut set = ImageSet::with_remote(BASE, remote(2));
        let steps: [(bool, usize); 10] = [
            (true, 2),
            (true, 2),
            (false, 0),
            (true, 1),
            (true, 1),
            (false, 3),
            (false, 0),
            (true, 3),
            (false, 9),
            (true, 4),
        ];
        for (add, n) in steps {
            if add {
                let _ = set.add_files(files(n));
            } else {
                set.remove_at(n);
            }
            assert_consistent(&set);
        }
    }

    #[test]
    fn test_non_image_content_type() {
        assert!(file("a.jpg").is_image());
        assert!(!LocalFile::new("notes.txt", "text/plain", Vec::<u8>::new()).is_image());
    }
}
