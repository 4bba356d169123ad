use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod booking;
mod stored;

pub use booking::{Booking, BookingDraft, BookingStatus, PropertySnapshot, SnapshotLocation};
pub use stored::parse_stay_date;

/// Image used when a listing has no usable image URI
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/800x600?text=No+Image";

/// Listing visibility. There is no path back from `Inactive`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Active,
    Inactive,
}

/// Category of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum PropertyType {
    Apartment,
    House,
    Villa,
    Condo,
    Townhouse,
    Cabin,
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Villa => "villa",
            PropertyType::Condo => "condo",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Cabin => "cabin",
            PropertyType::Other => "other",
        }
    }

    /// Classify a category label. Matching is exact (ignoring case and
    /// surrounding whitespace); anything unrecognised is `Other`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "apartment" => PropertyType::Apartment,
            "house" => PropertyType::House,
            "villa" => PropertyType::Villa,
            "condo" => PropertyType::Condo,
            "townhouse" => PropertyType::Townhouse,
            "cabin" => PropertyType::Cabin,
            _ => PropertyType::Other,
        }
    }
}

impl From<String> for PropertyType {
    fn from(value: String) -> Self {
        PropertyType::parse(&value)
    }
}

impl From<PropertyType> for String {
    fn from(value: PropertyType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location information for a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub country: String,
}

/// Nightly rate and the host's cleaning fee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub per_night: f64,
    pub cleaning_fee: f64,
}

/// Core property data model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub location: Location,
    pub amenities: Vec<String>,
    /// Legacy records may hold no images; see [`normalize_images`]
    #[serde(default, deserialize_with = "stored::images")]
    pub images: Vec<String>,
    pub pricing: Pricing,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PropertyStatus,
}

impl Property {
    pub fn is_active(&self) -> bool {
        self.status == PropertyStatus::Active
    }
}

/// Drops blank URIs and falls back to the placeholder so a listing always
/// carries at least one image.
pub fn normalize_images<I, S>(uris: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut images: Vec<String> = uris
        .into_iter()
        .map(|uri| uri.as_ref().trim().to_string())
        .filter(|uri| !uri.is_empty())
        .collect();

    if images.is_empty() {
        images.push(PLACEHOLDER_IMAGE.to_string());
    }

    images
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,
    #[error("A property must host at least one guest")]
    NoGuests,
    #[error("Invalid {field}: {value}")]
    InvalidPrice { field: &'static str, value: f64 },
}

/// Everything a host fills in when listing a property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub guests: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub location: Location,
    pub amenities: Vec<String>,
    pub pricing: Pricing,
    pub description: String,
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.guests == 0 {
            return Err(ValidationError::NoGuests);
        }
        validate_pricing(&self.pricing)
    }

    /// Stored record for this draft. Fields are kept exactly as entered;
    /// only the images are normalized.
    pub fn into_property(
        self,
        id: String,
        user_id: String,
        images: Vec<String>,
        now: DateTime<Utc>,
    ) -> Property {
        Property {
            id,
            user_id,
            title: self.title,
            property_type: self.property_type,
            guests: self.guests,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            location: self.location,
            amenities: self.amenities,
            images: normalize_images(images),
            pricing: self.pricing,
            description: self.description,
            created_at: now,
            updated_at: now,
            status: PropertyStatus::Active,
        }
    }
}

pub(crate) fn validate_pricing(pricing: &Pricing) -> Result<(), ValidationError> {
    if !pricing.per_night.is_finite() || pricing.per_night < 0.0 {
        return Err(ValidationError::InvalidPrice {
            field: "perNight",
            value: pricing.per_night,
        });
    }
    if !pricing.cleaning_fee.is_finite() || pricing.cleaning_fee < 0.0 {
        return Err(ValidationError::InvalidPrice {
            field: "cleaningFee",
            value: pricing.cleaning_fee,
        });
    }
    Ok(())
}

/// Partial edit of a listing; `None` leaves the field alone
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<PropertyType>,
    pub guests: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub location: Option<Location>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub pricing: Option<Pricing>,
    pub description: Option<String>,
}

impl PropertyUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::EmptyTitle);
            }
        }
        if self.guests == Some(0) {
            return Err(ValidationError::NoGuests);
        }
        match &self.pricing {
            Some(pricing) => validate_pricing(pricing),
            None => Ok(()),
        }
    }

    /// Merge into `property`. Timestamps are left to the caller.
    pub fn apply_to(self, property: &mut Property) {
        if let Some(title) = self.title {
            property.title = title;
        }
        if let Some(property_type) = self.property_type {
            property.property_type = property_type;
        }
        if let Some(guests) = self.guests {
            property.guests = guests;
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            property.bathrooms = bathrooms;
        }
        if let Some(location) = self.location {
            property.location = location;
        }
        if let Some(amenities) = self.amenities {
            property.amenities = amenities;
        }
        if let Some(images) = self.images {
            property.images = images;
        }
        if let Some(pricing) = self.pricing {
            property.pricing = pricing;
        }
        if let Some(description) = self.description {
            property.description = description;
        }
        property.images = normalize_images(&property.images);
    }
}
