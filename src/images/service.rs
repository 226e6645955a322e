use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::listings::dto::ListingResponse;
use crate::state::AppState;
use crate::storage::StorageClient;
use crate::store::{Field, ListingStore, Predicate, Value};

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Upload listing photos and append their public URLs to the record.
/// All-or-nothing: if any upload or the record update fails, objects
/// already written are deleted on a best-effort basis and the listing
/// keeps its previous image set.
pub async fn attach_listing_images(
    state: &AppState,
    owner_id: Uuid,
    listing_id: Uuid,
    files: Vec<UploadItem>,
) -> Result<ListingResponse, ApiError> {
    let mut listing = state
        .listings
        .find_one(&[
            Predicate::Eq(Field::Id, Value::Id(listing_id)),
            Predicate::Eq(Field::OwnerId, Value::Id(owner_id)),
        ])
        .await?
        .ok_or(ApiError::NotFound)?;

    let mut exts = Vec::with_capacity(files.len());
    for file in &files {
        match ext_from_mime(&file.content_type) {
            Some(ext) => exts.push(ext),
            None => {
                return Err(ApiError::Validation(vec![format!(
                    "Unsupported image type: {}",
                    file.content_type
                )]))
            }
        }
    }

    let mut uploaded: Vec<String> = Vec::with_capacity(files.len());
    for (file, ext) in files.into_iter().zip(exts) {
        let key = format!("pg-listings/{}/{}.{}", owner_id, Uuid::new_v4(), ext);
        if let Err(e) = state
            .storage
            .put_object(&key, file.body, &file.content_type)
            .await
        {
            rollback_uploads(state, &uploaded).await;
            return Err(ApiError::internal(e.context("upload listing image")));
        }
        uploaded.push(key);
    }

    let mut images = listing.images.clone();
    images.extend(uploaded.iter().map(|key| state.storage.object_url(key)));
    listing.images = images;

    match state.listings.update(&listing).await {
        Ok(saved) => {
            info!(listing_id = %saved.id, count = uploaded.len(), "listing images attached");
            Ok(saved.into())
        }
        Err(e) => {
            rollback_uploads(state, &uploaded).await;
            Err(e.into())
        }
    }
}

async fn rollback_uploads(state: &AppState, keys: &[String]) {
    for key in keys {
        if let Err(e) = state.storage.delete_object(key).await {
            warn!(key = %key, error = %e, "rollback delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::service::test_support::ListingFixture;
    use crate::storage::StorageClient;
    use crate::store::memory::MemStore;
    use axum::async_trait;
    use std::sync::{Arc, Mutex};

    fn upload(content_type: &str) -> UploadItem {
        UploadItem {
            body: Bytes::from_static(b"img-bytes"),
            content_type: content_type.to_string(),
        }
    }

    async fn seeded_state(owner_id: Uuid) -> (AppState, Uuid) {
        let mut state = AppState::fake();
        let mem = MemStore::new();
        let listing = ListingFixture::default().build(owner_id, "Sunrise");
        let id = listing.id;
        mem.seed_listing(listing);
        let store = Arc::new(mem);
        state.listings = store.clone();
        state.owners = store.clone();
        state.users = store;
        (state, id)
    }

    #[tokio::test]
    async fn attaches_urls_to_listing() {
        let owner_id = Uuid::new_v4();
        let (state, listing_id) = seeded_state(owner_id).await;

        let resp = attach_listing_images(
            &state,
            owner_id,
            listing_id,
            vec![upload("image/jpeg"), upload("image/png")],
        )
        .await
        .unwrap();

        assert_eq!(resp.images.len(), 2);
        assert!(resp.images[0].starts_with("https://fake.local/pg-listings/"));
        assert!(resp.images[0].ends_with(".jpg"));
        assert!(resp.images[1].ends_with(".png"));
    }

    #[tokio::test]
    async fn rejects_non_image_uploads_without_touching_storage() {
        let owner_id = Uuid::new_v4();
        let (state, listing_id) = seeded_state(owner_id).await;

        let err = attach_listing_images(
            &state,
            owner_id,
            listing_id,
            vec![upload("image/jpeg"), upload("application/pdf")],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let listing = state
            .listings
            .find_one(&[Predicate::Eq(Field::Id, Value::Id(listing_id))])
            .await
            .unwrap()
            .unwrap();
        assert!(listing.images.is_empty());
    }

    #[tokio::test]
    async fn wrong_owner_is_not_found() {
        let owner_id = Uuid::new_v4();
        let (state, listing_id) = seeded_state(owner_id).await;

        let err =
            attach_listing_images(&state, Uuid::new_v4(), listing_id, vec![upload("image/png")])
                .await
                .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    /// Fails every put after the first and records deletions.
    struct FlakyStorage {
        puts: Mutex<u32>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl StorageClient for FlakyStorage {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            let mut puts = self.puts.lock().unwrap();
            *puts += 1;
            if *puts > 1 {
                anyhow::bail!("storage unavailable");
            }
            Ok(())
        }
        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
        fn object_url(&self, key: &str) -> String {
            format!("https://fake.local/{}", key)
        }
    }

    #[tokio::test]
    async fn failed_upload_rolls_back_earlier_objects() {
        let owner_id = Uuid::new_v4();
        let (mut state, listing_id) = seeded_state(owner_id).await;
        let storage = Arc::new(FlakyStorage {
            puts: Mutex::new(0),
            deleted: Mutex::new(Vec::new()),
        });
        state.storage = storage.clone();

        let err = attach_listing_images(
            &state,
            owner_id,
            listing_id,
            vec![upload("image/jpeg"), upload("image/png")],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        // the one object that made it in was deleted again
        assert_eq!(storage.deleted.lock().unwrap().len(), 1);

        let listing = state
            .listings
            .find_one(&[Predicate::Eq(Field::Id, Value::Id(listing_id))])
            .await
            .unwrap()
            .unwrap();
        assert!(listing.images.is_empty());
    }
}
