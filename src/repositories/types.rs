use crate::models::{Property, PropertyType};
use serde::{Deserialize, Serialize};

/// Search parameters for browsing active listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilters {
    /// Matched case-insensitively against city, country and address
    pub location: Option<String>,
    /// Minimum nightly price, inclusive
    pub min_price: Option<f64>,
    /// Maximum nightly price, inclusive
    pub max_price: Option<f64>,
    pub property_type: Option<PropertyType>,
    /// Listing must sleep at least this many guests
    pub min_guests: Option<u32>,
    /// Page size
    pub limit: Option<usize>,
    /// Id of the last listing on the previous page; results continue after it
    pub after: Option<String>,
    /// Also return deactivated listings
    #[serde(default)]
    pub include_inactive: bool,
}

impl PropertyFilters {
    pub fn matches(&self, property: &Property) -> bool {
        if !self.include_inactive && !property.is_active() {
            return false;
        }
        if let Some(term) = self.location.as_deref().map(str::trim) {
            if !term.is_empty() {
                let term = term.to_lowercase();
                let location = &property.location;
                let hit = [&location.city, &location.country, &location.address]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term));
                if !hit {
                    return false;
                }
            }
        }
        if let Some(min) = self.min_price {
            if property.pricing.per_night < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.pricing.per_night > max {
                return false;
            }
        }
        if let Some(property_type) = self.property_type {
            if property.property_type != property_type {
                return false;
            }
        }
        if let Some(min_guests) = self.min_guests {
            if property.guests < min_guests {
                return false;
            }
        }
        true
    }
}

/// Outcome of a price and image repair pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub scanned: usize,
    pub images_backfilled: usize,
    pub prices_corrected: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.images_backfilled > 0 || self.prices_corrected > 0
    }
}
