use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use super::error::{RepositoryError, Result};
use super::ids;
use crate::models::{Booking, BookingDraft, BookingStatus};
use crate::storage::BlobStore;

pub const BOOKINGS_KEY: &str = "user_bookings";

/// Guest bookings with an in-memory mirror of the stored collection.
///
/// Writers hold the mirror's write lock for the whole read-modify-write, so
/// the mirror always reflects the last collection this repository persisted
/// or loaded. Newest bookings come first.
pub struct BookingRepository {
    blobs: Arc<BlobStore>,
    bookings: RwLock<Vec<Booking>>,
}

impl BookingRepository {
    /// Repository with an empty mirror; call [`BookingRepository::refresh`]
    /// to pull in stored bookings.
    pub fn new(blobs: Arc<BlobStore>) -> Self {
        Self {
            blobs,
            bookings: RwLock::new(Vec::new()),
        }
    }

    pub async fn open(blobs: Arc<BlobStore>) -> Result<Self> {
        let repo = Self::new(blobs);
        repo.refresh().await?;
        Ok(repo)
    }

    /// Reload the mirror from storage
    pub async fn refresh(&self) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        *bookings = self.blobs.load::<Booking>(BOOKINGS_KEY).await.map_err(|e| {
            error!("Error loading bookings: {}", e);
            RepositoryError::from(e)
        })?;
        debug!("Loaded {} bookings", bookings.len());
        Ok(())
    }

    /// Record a confirmed stay. The new booking is added to whatever is in
    /// storage at that moment, so bookings written elsewhere are kept.
    pub async fn create(&self, draft: BookingDraft) -> Result<Booking> {
        if draft.user_id.trim().is_empty() {
            return Err(RepositoryError::Unauthenticated);
        }

        let mut mirror = self.bookings.write().await;
        let (booking, all) = self
            .blobs
            .update(BOOKINGS_KEY, |bookings: &mut Vec<Booking>| {
                let mut id = ids::booking_id();
                while bookings.iter().any(|b| b.id == id) {
                    id = ids::booking_id();
                }
                let booking = draft.into_booking(id, Utc::now());
                bookings.insert(0, booking.clone());
                (booking, bookings.clone())
            })
            .await
            .map_err(|e| {
                error!("Error saving booking: {}", e);
                RepositoryError::from(e)
            })?;
        *mirror = all;

        info!(
            "Booked {} for {} ({} guests)",
            booking.property_id, booking.user_id, booking.guests
        );
        Ok(booking)
    }

    /// Mark a booking cancelled. Returns `false` if no booking has that id.
    pub async fn cancel(&self, id: &str) -> Result<bool> {
        let mut mirror = self.bookings.write().await;
        let mut found = false;

        let written = self
            .blobs
            .modify(BOOKINGS_KEY, |bookings: &mut Vec<Booking>, _| {
                let booking = bookings.iter_mut().find(|b| b.id == id)?;
                found = true;
                if booking.status == BookingStatus::Cancelled {
                    return None;
                }
                booking.status = BookingStatus::Cancelled;
                Some(bookings.clone())
            })
            .await
            .map_err(|e| {
                error!("Error cancelling booking {}: {}", id, e);
                RepositoryError::from(e)
            })?;

        if let Some(all) = written {
            *mirror = all;
            info!("Cancelled booking {}", id);
        } else if found {
            debug!("Booking {} already cancelled", id);
        }
        Ok(found)
    }

    pub async fn get(&self, id: &str) -> Option<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    /// Bookings made by `user_id`
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Bookings against any of `property_ids`, i.e. a host's incoming stays
    pub async fn list_for_properties(&self, property_ids: &[String]) -> Vec<Booking> {
        self.bookings
            .read()
            .await
            .iter()
            .filter(|b| property_ids.contains(&b.property_id))
            .cloned()
            .collect()
    }

    pub async fn list_all(&self) -> Vec<Booking> {
        self.bookings.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pricing, PropertySnapshot, SnapshotLocation};
    use crate::storage::{KvStore, MemoryStore};
    use chrono::{DateTime, TimeZone};

    fn blobs() -> (MemoryStore, Arc<BlobStore>) {
        let kv = MemoryStore::new();
        (kv.clone(), Arc::new(BlobStore::new(Arc::new(kv))))
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap()
    }

    fn draft(user_id: &str, property_id: &str) -> BookingDraft {
        BookingDraft {
            property_id: property_id.to_string(),
            user_id: user_id.to_string(),
            check_in: day(10),
            check_out: day(13),
            guests: 2,
            total_price: 75_000.0,
            status: BookingStatus::Confirmed,
            property: PropertySnapshot {
                title: "Lekki Studio".to_string(),
                images: vec!["file:///studio.jpg".to_string()],
                location: SnapshotLocation {
                    city: "Lagos".to_string(),
                    country: "Nigeria".to_string(),
                },
                pricing: Pricing {
                    per_night: 25_000.0,
                    cleaning_fee: 2_000.0,
                },
            },
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_prepends() {
        let (_, blobs) = blobs();
        let repo = BookingRepository::new(blobs);

        let first = repo.create(draft("guest-1", "p1")).await.unwrap();
        let second = repo.create(draft("guest-1", "p2")).await.unwrap();

        assert!(first.id.starts_with("BK-"));
        assert_ne!(first.id, second.id);
        assert_eq!(second.status, BookingStatus::Confirmed);

        let mine = repo.list_for_user("guest-1").await;
        let ids: Vec<&str> = mine.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
    }

    #[tokio::test]
    async fn create_requires_a_user() {
        let (kv, blobs) = blobs();
        let repo = BookingRepository::new(blobs);

        let err = repo.create(draft("", "p1")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Unauthenticated));
        assert!(kv.is_empty().await);
        assert!(repo.list_all().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_for_one_user_keep_both() {
        let (_, blobs) = blobs();
        let repo = BookingRepository::new(Arc::clone(&blobs));

        let (a, b) = tokio::join!(
            repo.create(draft("guest-1", "p1")),
            repo.create(draft("guest-1", "p2"))
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        let mirrored = repo.list_for_user("guest-1").await;
        assert_eq!(mirrored.len(), 2);

        let reopened = BookingRepository::open(blobs).await.unwrap();
        let stored: Vec<String> = reopened.list_all().await.into_iter().map(|b| b.id).collect();
        assert!(stored.contains(&a.id));
        assert!(stored.contains(&b.id));
    }

    #[tokio::test]
    async fn writers_in_separate_repositories_do_not_clobber() {
        let (_, blobs) = blobs();
        let phone = BookingRepository::new(Arc::clone(&blobs));
        let tablet = BookingRepository::new(Arc::clone(&blobs));

        phone.create(draft("guest-1", "p1")).await.unwrap();
        // tablet never saw the first booking
        tablet.create(draft("guest-1", "p2")).await.unwrap();
        tablet.create(draft("guest-2", "p3")).await.unwrap();

        phone.refresh().await.unwrap();
        assert_eq!(phone.list_all().await.len(), 3);
        assert_eq!(phone.list_for_user("guest-1").await.len(), 2);
    }

    #[tokio::test]
    async fn cancel_flips_status_and_persists() {
        let (_, blobs) = blobs();
        let repo = BookingRepository::new(Arc::clone(&blobs));
        let booking = repo.create(draft("guest-1", "p1")).await.unwrap();

        assert!(repo.cancel(&booking.id).await.unwrap());
        assert_eq!(
            repo.get(&booking.id).await.unwrap().status,
            BookingStatus::Cancelled
        );
        // cancelling twice is harmless
        assert!(repo.cancel(&booking.id).await.unwrap());
        assert!(!repo.cancel("BK-0-missing").await.unwrap());

        let reopened = BookingRepository::open(blobs).await.unwrap();
        assert_eq!(
            reopened.get(&booking.id).await.unwrap().status,
            BookingStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn views_partition_the_collection() {
        let (_, blobs) = blobs();
        let repo = BookingRepository::new(blobs);
        repo.create(draft("guest-1", "p1")).await.unwrap();
        repo.create(draft("guest-2", "p1")).await.unwrap();
        repo.create(draft("guest-2", "p2")).await.unwrap();

        assert_eq!(repo.list_all().await.len(), 3);
        assert_eq!(repo.list_for_user("guest-2").await.len(), 2);
        assert_eq!(repo.list_for_properties(&["p1".to_string()]).await.len(), 2);
        assert!(repo.list_for_properties(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn overlapping_stays_are_accepted() {
        let (_, blobs) = blobs();
        let repo = BookingRepository::new(blobs);

        repo.create(draft("guest-1", "p1")).await.unwrap();
        repo.create(draft("guest-2", "p1")).await.unwrap();
        assert_eq!(repo.list_for_properties(&["p1".to_string()]).await.len(), 2);
    }

    /// Bookings as the mobile app wrote them: date-only stay dates and
    /// `[null]` snapshot images.
    const LEGACY_BOOKINGS: &str = r#"[
        {
            "id": "BK-1704067200000-a1b2c3d4e",
            "propertyId": "lvn3k2a1x9q8w7e6r5t",
            "userId": "guest-1",
            "checkIn": "2024-01-01",
            "checkOut": "2024-01-04",
            "guests": 2,
            "totalPrice": 86900,
            "status": "confirmed",
            "createdAt": "2023-12-20T10:15:00.000Z",
            "property": {
                "title": "Banana Island Villa",
                "images": [null],
                "location": {"city": "Lagos", "country": "Nigeria"},
                "pricing": {"perNight": 25000, "cleaningFee": 4000}
            }
        },
        {
            "id": "BK-1704153600000-f5g6h7j8k",
            "propertyId": "lvn3k2b7m1n2b3v4c5x",
            "userId": "guest-2",
            "checkIn": "2024-02-10T14:00:00.000Z",
            "checkOut": "2024-02-12T11:00:00.000Z",
            "guests": 1,
            "totalPrice": 41800,
            "status": "completed",
            "createdAt": "2024-01-02T00:00:00.000Z",
            "property": {
                "title": "Yaba Studio",
                "images": ["file:///studio.jpg"],
                "location": {"city": "Lagos", "country": "Nigeria"},
                "pricing": {"perNight": 18000, "cleaningFee": 2000}
            }
        }
    ]"#;

    #[tokio::test]
    async fn legacy_bookings_open_and_stay_writable() {
        let (kv, blobs) = blobs();
        kv.set(BOOKINGS_KEY, LEGACY_BOOKINGS.to_string()).await.unwrap();

        let repo = BookingRepository::open(blobs).await.unwrap();
        assert_eq!(repo.list_all().await.len(), 2);

        let legacy = repo.get("BK-1704067200000-a1b2c3d4e").await.unwrap();
        assert_eq!(legacy.check_in, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(legacy.check_out, Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap());
        assert!(legacy.property.images.is_empty());

        let completed = repo.get("BK-1704153600000-f5g6h7j8k").await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert_eq!(
            completed.check_in,
            Utc.with_ymd_and_hms(2024, 2, 10, 14, 0, 0).unwrap()
        );

        // writing through the repository keeps the legacy records
        assert!(repo.cancel("BK-1704067200000-a1b2c3d4e").await.unwrap());
        repo.create(draft("guest-1", "p9")).await.unwrap();
        assert_eq!(repo.list_for_user("guest-1").await.len(), 2);

        let raw = kv.get(BOOKINGS_KEY).await.unwrap().unwrap();
        assert!(raw.contains(r#""checkIn":"2024-01-01T00:00:00Z""#));
    }

    #[tokio::test]
    async fn refresh_surfaces_corrupt_storage() {
        let (kv, blobs) = blobs();
        kv.set(BOOKINGS_KEY, "[{".to_string()).await.unwrap();

        let repo = BookingRepository::new(blobs);
        assert!(matches!(
            repo.refresh().await,
            Err(RepositoryError::Storage(_))
        ));
    }
}
