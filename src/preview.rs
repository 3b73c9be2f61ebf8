//! Preview store for scan images.
//!
//! Each image set on a scan session gets a revocable `preview://{id}` handle.
//! The handle removes its entry when dropped, so superseding or resetting a
//! session image always releases the previous copy.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use uuid::Uuid;

use crate::scan_image::ScanImage;

const PREVIEW_SCHEME: &str = "preview://";

#[derive(Debug, Clone)]
struct PreviewEntry {
    mime: String,
    bytes: Arc<Vec<u8>>,
}

/// In-memory preview registry, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct PreviewStore {
    inner: Arc<RwLock<HashMap<String, PreviewEntry>>>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, PreviewEntry>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, PreviewEntry>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a preview for an image. Released when the handle drops.
    pub fn create(&self, image: &ScanImage) -> PreviewHandle {
        let id = Uuid::new_v4().simple().to_string();
        self.write().insert(
            id.clone(),
            PreviewEntry {
                mime: image.mime.clone(),
                bytes: Arc::new(image.bytes.clone()),
            },
        );
        tracing::debug!(
            "PreviewStore: created '{}' for {} ({} bytes)",
            id,
            image.filename,
            image.len()
        );
        PreviewHandle {
            uri: format!("{}{}", PREVIEW_SCHEME, id),
            store: self.clone(),
        }
    }

    /// Render a preview as a `data:` URL.
    pub fn data_url(&self, uri: &str) -> Option<String> {
        let id = uri.strip_prefix(PREVIEW_SCHEME)?;
        let store = self.read();
        let entry = store.get(id)?;
        Some(format!("data:{};base64,{}", entry.mime, BASE64.encode(entry.bytes.as_slice())))
    }

    pub fn contains(&self, uri: &str) -> bool {
        uri.strip_prefix(PREVIEW_SCHEME)
            .map(|id| self.read().contains_key(id))
            .unwrap_or(false)
    }

    /// Number of live previews.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn revoke(&self, uri: &str) {
        if let Some(id) = uri.strip_prefix(PREVIEW_SCHEME) {
            if self.write().remove(id).is_some() {
                tracing::debug!("PreviewStore: revoked '{}'", id);
            }
        }
    }
}

/// Owned reference to a live preview. Revokes it on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    uri: String,
    store: PreviewStore,
}

impl PreviewHandle {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn data_url(&self) -> Option<String> {
        self.store.data_url(&self.uri)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.revoke(&self.uri);
    }
}
