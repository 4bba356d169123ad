//! Local persistence and pricing for a short-stay booking app: host
//! listings, guest bookings and favourites stored as JSON collections in a
//! key-value store.

pub mod config;
pub mod models;
pub mod pricing;
pub mod repositories;
pub mod storage;

pub use config::AppConfig;
pub use models::{Booking, BookingDraft, BookingStatus, Property, PropertyDraft, PropertyStatus, PropertyType};
pub use repositories::{BookingRepository, FavoritesRepository, PropertyRepository, RepositoryError};
pub use storage::{BlobStore, FileStore, KvStore, MemoryStore, StorageError};
