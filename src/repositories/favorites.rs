use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::error::{RepositoryError, Result};
use crate::storage::BlobStore;

const FAVORITES_KEY_PREFIX: &str = "user_favorites";

pub fn favorites_key(user_id: &str) -> String {
    format!("{}_{}", FAVORITES_KEY_PREFIX, user_id)
}

#[derive(Debug, Default)]
struct Loaded {
    user_id: Option<String>,
    property_ids: Vec<String>,
}

/// Saved property ids for the signed-in user
pub struct FavoritesRepository {
    blobs: Arc<BlobStore>,
    loaded: RwLock<Loaded>,
}

impl FavoritesRepository {
    pub fn new(blobs: Arc<BlobStore>) -> Self {
        Self {
            blobs,
            loaded: RwLock::new(Loaded::default()),
        }
    }

    /// Switch to `user_id` and load their favourites. `None` (signed out)
    /// clears the list.
    pub async fn load(&self, user_id: Option<&str>) -> Result<()> {
        let mut loaded = self.loaded.write().await;

        let Some(user_id) = user_id.filter(|u| !u.trim().is_empty()) else {
            *loaded = Loaded::default();
            return Ok(());
        };

        let key = favorites_key(user_id);
        let property_ids = self.blobs.load::<String>(&key).await.map_err(|e| {
            error!("Error loading favorites for {}: {}", user_id, e);
            RepositoryError::from(e)
        });

        match property_ids {
            Ok(property_ids) => {
                debug!("Loaded {} favorites for {}", property_ids.len(), user_id);
                *loaded = Loaded {
                    user_id: Some(user_id.to_string()),
                    property_ids,
                };
                Ok(())
            }
            Err(e) => {
                *loaded = Loaded {
                    user_id: Some(user_id.to_string()),
                    property_ids: Vec::new(),
                };
                Err(e)
            }
        }
    }

    /// Add `property_id` to the user's favourites, or remove it if already
    /// there. Returns whether it is a favourite afterwards.
    pub async fn toggle(&self, user_id: &str, property_id: &str) -> Result<bool> {
        if user_id.trim().is_empty() {
            warn!("Favorite toggled without a signed-in user");
            return Err(RepositoryError::Unauthenticated);
        }

        let mut loaded = self.loaded.write().await;
        let key = favorites_key(user_id);

        let (now_favorite, property_ids) = self
            .blobs
            .update(&key, |ids: &mut Vec<String>| {
                let now_favorite = match ids.iter().position(|id| id == property_id) {
                    Some(pos) => {
                        ids.remove(pos);
                        false
                    }
                    None => {
                        ids.push(property_id.to_string());
                        true
                    }
                };
                (now_favorite, ids.clone())
            })
            .await
            .map_err(|e| {
                error!("Error toggling favorite {}: {}", property_id, e);
                RepositoryError::from(e)
            })?;

        if loaded.user_id.as_deref() == Some(user_id) {
            loaded.property_ids = property_ids;
        }

        info!(
            "{} {} for {}",
            if now_favorite { "Saved" } else { "Removed" },
            property_id,
            user_id
        );
        Ok(now_favorite)
    }

    pub async fn is_favorite(&self, user_id: &str, property_id: &str) -> bool {
        let loaded = self.loaded.read().await;
        loaded.user_id.as_deref() == Some(user_id)
            && loaded.property_ids.iter().any(|id| id == property_id)
    }

    /// Favourites of the loaded user, in the order they were saved
    pub async fn favorites(&self) -> Vec<String> {
        self.loaded.read().await.property_ids.clone()
    }

    pub async fn current_user(&self) -> Option<String> {
        self.loaded.read().await.user_id.clone()
    }
}
