use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::error::{RepositoryError, Result};
use super::ids;
use super::types::{MigrationReport, PropertyFilters};
use crate::models::{
    normalize_images, Pricing, Property, PropertyDraft, PropertyStatus, PropertyType,
    PropertyUpdate,
};
use crate::storage::BlobStore;

pub const PROPERTIES_KEY: &str = "user_properties";

/// Nightly rates below this are treated as data-entry mistakes
const MIN_REALISTIC_NIGHTLY: f64 = 1_000.0;
const MIN_REALISTIC_VILLA_NIGHTLY: f64 = 50_000.0;

/// Replacement rates used when repairing unrealistic prices
pub fn realistic_pricing(property_type: PropertyType) -> Pricing {
    let (per_night, cleaning_fee) = match property_type {
        PropertyType::Villa => (150_000.0, 15_000.0),
        PropertyType::House => (60_000.0, 7_500.0),
        PropertyType::Townhouse => (50_000.0, 6_000.0),
        PropertyType::Condo => (40_000.0, 5_000.0),
        PropertyType::Apartment | PropertyType::Cabin | PropertyType::Other => (25_000.0, 3_000.0),
    };
    Pricing {
        per_night,
        cleaning_fee,
    }
}

fn has_unrealistic_price(property: &Property) -> bool {
    let per_night = property.pricing.per_night;
    per_night < MIN_REALISTIC_NIGHTLY
        || (property.property_type == PropertyType::Villa
            && per_night < MIN_REALISTIC_VILLA_NIGHTLY)
}

/// Listing order. Ties on `created_at` fall back to the id so pages stay
/// stable.
fn newest_first(properties: &mut [Property]) {
    properties.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Host listings kept as one collection blob
pub struct PropertyRepository {
    blobs: Arc<BlobStore>,
}

impl PropertyRepository {
    pub fn new(blobs: Arc<BlobStore>) -> Self {
        Self { blobs }
    }

    async fn load_all(&self) -> Result<Vec<Property>> {
        self.blobs.load::<Property>(PROPERTIES_KEY).await.map_err(|e| {
            error!("Error loading properties: {}", e);
            RepositoryError::from(e)
        })
    }

    /// List a new property for `user_id` and return its id.
    pub async fn create(
        &self,
        user_id: &str,
        draft: PropertyDraft,
        image_uris: Vec<String>,
    ) -> Result<String> {
        if user_id.trim().is_empty() {
            return Err(RepositoryError::Unauthenticated);
        }
        draft.validate()?;

        let user_id = user_id.to_string();
        let id = self
            .blobs
            .update(PROPERTIES_KEY, |properties: &mut Vec<Property>| {
                let mut id = ids::property_id();
                while properties.iter().any(|p| p.id == id) {
                    id = ids::property_id();
                }
                properties.push(draft.into_property(id.clone(), user_id, image_uris, Utc::now()));
                id
            })
            .await
            .map_err(|e| {
                error!("Error creating property: {}", e);
                RepositoryError::from(e)
            })?;

        info!("Created property {}", id);
        Ok(id)
    }

    /// Look up one record regardless of status
    pub async fn get(&self, id: &str) -> Result<Option<Property>> {
        Ok(self.load_all().await?.into_iter().find(|p| p.id == id))
    }

    /// Everything `user_id` owns, newest first
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Property>> {
        let mut properties: Vec<Property> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .collect();
        newest_first(&mut properties);
        debug!("Loaded {} properties for {}", properties.len(), user_id);
        Ok(properties)
    }

    /// Every active listing, newest first
    pub async fn list_active(&self) -> Result<Vec<Property>> {
        let mut properties: Vec<Property> = self
            .load_all()
            .await?
            .into_iter()
            .filter(Property::is_active)
            .collect();
        newest_first(&mut properties);
        Ok(properties)
    }

    /// One page of listings matching `filters`, newest first. Pass the id of
    /// the last listing seen as `after` to fetch the next page; an id that no
    /// longer exists yields an empty page.
    pub async fn search(&self, filters: &PropertyFilters) -> Result<Vec<Property>> {
        let mut properties = self.load_all().await?;

        let cursor = match filters.after.as_deref() {
            Some(after) => match properties.iter().find(|p| p.id == after) {
                Some(p) => Some((p.created_at, p.id.clone())),
                None => {
                    debug!("Search cursor {} not found", after);
                    return Ok(Vec::new());
                }
            },
            None => None,
        };

        properties.retain(|p| {
            filters.matches(p)
                && cursor
                    .as_ref()
                    .map_or(true, |(at, id)| (p.created_at, &p.id) < (*at, id))
        });
        newest_first(&mut properties);
        if let Some(limit) = filters.limit {
            properties.truncate(limit);
        }
        debug!("Search matched {} properties", properties.len());
        Ok(properties)
    }

    /// Merge `changes` into the record. Returns `false` without writing when
    /// there is no such record.
    pub async fn update(&self, id: &str, changes: PropertyUpdate) -> Result<bool> {
        changes.validate()?;

        let updated = self
            .blobs
            .modify(PROPERTIES_KEY, |properties: &mut Vec<Property>, present| {
                if !present {
                    return None;
                }
                let property = properties.iter_mut().find(|p| p.id == id)?;
                changes.apply_to(property);
                property.updated_at = Utc::now();
                Some(())
            })
            .await
            .map_err(|e| {
                error!("Error updating property {}: {}", id, e);
                RepositoryError::from(e)
            })?;

        match updated {
            Some(()) => info!("Updated property {}", id),
            None => debug!("Property {} not found, nothing updated", id),
        }
        Ok(updated.is_some())
    }

    /// Hide the listing from browsing while keeping the record
    pub async fn soft_delete(&self, id: &str) -> Result<bool> {
        let deactivated = self
            .blobs
            .modify(PROPERTIES_KEY, |properties: &mut Vec<Property>, _| {
                let property = properties.iter_mut().find(|p| p.id == id)?;
                property.status = PropertyStatus::Inactive;
                property.updated_at = Utc::now();
                Some(())
            })
            .await
            .map_err(|e| {
                error!("Error deactivating property {}: {}", id, e);
                RepositoryError::from(e)
            })?;

        if deactivated.is_some() {
            info!("Deactivated property {}", id);
        }
        Ok(deactivated.is_some())
    }

    /// Remove the record for good
    pub async fn hard_delete(&self, id: &str) -> Result<bool> {
        let removed = self
            .blobs
            .modify(PROPERTIES_KEY, |properties: &mut Vec<Property>, _| {
                let before = properties.len();
                properties.retain(|p| p.id != id);
                (properties.len() != before).then_some(())
            })
            .await
            .map_err(|e| {
                error!("Error deleting property {}: {}", id, e);
                RepositoryError::from(e)
            })?;

        if removed.is_some() {
            info!("Deleted property {}", id);
        }
        Ok(removed.is_some())
    }

    /// Drop every stored property
    pub async fn clear_all(&self) -> Result<()> {
        self.blobs.clear(PROPERTIES_KEY).await?;
        info!("Cleared all properties");
        Ok(())
    }

    /// One-off repair of legacy records: backfill missing images and replace
    /// nightly rates that are too low for the property type. Running it again
    /// on repaired data changes nothing.
    pub async fn migrate_prices_and_images(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        self.blobs
            .modify(PROPERTIES_KEY, |properties: &mut Vec<Property>, _| {
                let now = Utc::now();
                for property in properties.iter_mut() {
                    report.scanned += 1;
                    let mut changed = false;

                    let images = normalize_images(&property.images);
                    if images != property.images {
                        property.images = images;
                        report.images_backfilled += 1;
                        changed = true;
                    }

                    if has_unrealistic_price(property) {
                        let corrected = realistic_pricing(property.property_type);
                        debug!(
                            "Correcting {} price {} -> {}",
                            property.id, property.pricing.per_night, corrected.per_night
                        );
                        property.pricing = corrected;
                        report.prices_corrected += 1;
                        changed = true;
                    }

                    if changed {
                        property.updated_at = now;
                    }
                }
                report.changed().then_some(())
            })
            .await
            .map_err(|e| {
                error!("Error migrating properties: {}", e);
                RepositoryError::from(e)
            })?;

        info!(
            "Migration scanned {} properties: {} image backfills, {} price corrections",
            report.scanned, report.images_backfilled, report.prices_corrected
        );
        Ok(report)
    }
}
