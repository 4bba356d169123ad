pub mod bookings;
pub mod error;
pub mod favorites;
pub mod ids;
pub mod properties;
pub mod types;

pub use bookings::{BookingRepository, BOOKINGS_KEY};
pub use error::{RepositoryError, Result};
pub use favorites::{favorites_key, FavoritesRepository};
pub use properties::{realistic_pricing, PropertyRepository, PROPERTIES_KEY};
pub use types::{MigrationReport, PropertyFilters};
