use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{stored, Pricing, Property};
use crate::pricing::{self, FeeModel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SnapshotLocation {
    pub city: String,
    pub country: String,
}

/// Copy of the listing taken when the booking was made. Later edits to the
/// property never reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertySnapshot {
    pub title: String,
    #[serde(default, deserialize_with = "stored::images")]
    pub images: Vec<String>,
    pub location: SnapshotLocation,
    pub pricing: Pricing,
}

impl From<&Property> for PropertySnapshot {
    fn from(property: &Property) -> Self {
        Self {
            title: property.title.clone(),
            images: property.images.clone(),
            location: SnapshotLocation {
                city: property.location.city.clone(),
                country: property.location.country.clone(),
            },
            pricing: property.pricing,
        }
    }
}

/// A stay reserved by a guest. Stay dates may be stored either as full
/// timestamps or as bare `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub property_id: String,
    pub user_id: String,
    #[serde(deserialize_with = "stored::stay_date")]
    pub check_in: DateTime<Utc>,
    #[serde(deserialize_with = "stored::stay_date")]
    pub check_out: DateTime<Utc>,
    pub guests: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub property: PropertySnapshot,
}

/// Booking fields supplied by the caller; id and creation time are assigned
/// by the repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub property_id: String,
    pub user_id: String,
    #[serde(deserialize_with = "stored::stay_date")]
    pub check_in: DateTime<Utc>,
    #[serde(deserialize_with = "stored::stay_date")]
    pub check_out: DateTime<Utc>,
    pub guests: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub property: PropertySnapshot,
}

impl BookingDraft {
    /// Confirmed booking for `property`, priced with `fee_model`.
    pub fn for_property(
        property: &Property,
        user_id: impl Into<String>,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        guests: u32,
        fee_model: FeeModel,
    ) -> Self {
        let nights = pricing::nights(Some(check_in), Some(check_out));
        let breakdown = pricing::breakdown(property.pricing.per_night, nights, fee_model);

        Self {
            property_id: property.id.clone(),
            user_id: user_id.into(),
            check_in,
            check_out,
            guests,
            total_price: breakdown.total,
            status: BookingStatus::Confirmed,
            property: PropertySnapshot::from(property),
        }
    }

    pub fn into_booking(self, id: String, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            property_id: self.property_id,
            user_id: self.user_id,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            total_price: self.total_price,
            status: self.status,
            created_at,
            property: self.property,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, PropertyDraft, PropertyType};
    use chrono::TimeZone;

    fn property() -> Property {
        PropertyDraft {
            title: "Ikoyi Loft".into(),
            property_type: PropertyType::Apartment,
            guests: 2,
            bedrooms: 1,
            bathrooms: 1,
            location: Location {
                address: "3 Bourdillon Rd".into(),
                city: "Lagos".into(),
                country: "Nigeria".into(),
            },
            amenities: vec!["WiFi".into()],
            pricing: Pricing {
                per_night: 25_000.0,
                cleaning_fee: 4_000.0,
            },
            description: String::new(),
        }
        .into_property("prop-1".into(), "host-1".into(), vec![], Utc::now())
    }

    #[test]
    fn draft_for_property_prices_and_snapshots() {
        let property = property();
        let check_in = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();

        let draft = BookingDraft::for_property(
            &property,
            "guest-1",
            check_in,
            check_out,
            2,
            FeeModel::Host {
                cleaning_fee: property.pricing.cleaning_fee,
            },
        );

        // (25000 * 3 + 4000) * 1.10
        assert_eq!(draft.total_price, 86_900.0);
        assert_eq!(draft.status, BookingStatus::Confirmed);
        assert_eq!(draft.property.title, "Ikoyi Loft");
        assert_eq!(draft.property.location.city, "Lagos");
        assert_eq!(draft.property.pricing, property.pricing);
    }

    #[test]
    fn booking_json_shape() {
        let property = property();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let booking = BookingDraft::for_property(&property, "guest-1", at, at, 1, FeeModel::Platform)
            .into_booking("BK-1-abc".into(), at);

        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["propertyId"], "prop-1");
        assert_eq!(value["status"], "confirmed");
        assert_eq!(value["property"]["pricing"]["cleaningFee"], 4_000.0);
    }

    #[test]
    fn date_only_stays_deserialize_at_midnight_utc() {
        let json = r#"{
            "id": "BK-1714554000000-k2j4h5g6f",
            "propertyId": "prop-1",
            "userId": "guest-1",
            "checkIn": "2024-01-01",
            "checkOut": "2024-01-04T00:00:00.000Z",
            "guests": 2,
            "totalPrice": 86900,
            "status": "confirmed",
            "createdAt": "2023-12-20T10:15:00.000Z",
            "property": {
                "title": "Ikoyi Loft",
                "images": [null],
                "location": {"city": "Lagos", "country": "Nigeria"},
                "pricing": {"perNight": 25000, "cleaningFee": 4000}
            }
        }"#;

        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.check_in, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(booking.check_out, Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap());
        assert_eq!(pricing::nights(Some(booking.check_in), Some(booking.check_out)), 3);
        assert!(booking.property.images.is_empty());

        // written back as full timestamps
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["checkIn"], "2024-01-01T00:00:00Z");
    }
}
