use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use stay_store::models::{Location, Pricing};
use stay_store::pricing::{self, FeeModel};
use stay_store::repositories::PropertyFilters;
use stay_store::{
    AppConfig, BlobStore, BookingDraft, BookingRepository, FavoritesRepository, FileStore,
    PropertyDraft, PropertyRepository, PropertyType,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn demo_listing() -> PropertyDraft {
    PropertyDraft {
        title: "Lekki Phase 1 Townhouse".to_string(),
        property_type: PropertyType::Townhouse,
        guests: 6,
        bedrooms: 3,
        bathrooms: 3,
        location: Location {
            address: "7 Admiralty Way".to_string(),
            city: "Lagos".to_string(),
            country: "Nigeria".to_string(),
        },
        amenities: vec![
            "WiFi".to_string(),
            "Air Conditioning".to_string(),
            "Generator".to_string(),
            "Parking".to_string(),
        ],
        pricing: Pricing {
            per_night: 55_000.0,
            cleaning_fee: 6_000.0,
        },
        description: "Gated townhouse a short drive from the beach.".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    config.ensure_data_dir()?;

    info!("🏠 Stay Store");
    info!("Data directory: {}", config.data_dir.display());

    let blobs = Arc::new(BlobStore::new(Arc::new(FileStore::new(&config.data_dir))));
    info!("Storage backend: {}", blobs.backend_name());
    let properties = PropertyRepository::new(Arc::clone(&blobs));
    let bookings = BookingRepository::open(Arc::clone(&blobs))
        .await
        .context("Failed to load bookings")?;
    let favorites = FavoritesRepository::new(Arc::clone(&blobs));

    let report = properties.migrate_prices_and_images().await?;
    if report.changed() {
        info!("Repaired {} stored listings", report.images_backfilled + report.prices_corrected);
    }

    let host = config.demo_user.as_str();
    if properties.list_by_user(host).await?.is_empty() {
        let id = properties.create(host, demo_listing(), vec![]).await?;
        info!("Listed demo property {}", id);
    }

    let listings = properties
        .search(&PropertyFilters {
            location: Some("lagos".to_string()),
            ..Default::default()
        })
        .await?;
    info!("\n✅ {} active listings in Lagos\n", listings.len());

    for (i, property) in listings.iter().enumerate() {
        println!(
            "{}. {} ({} / night)",
            i + 1,
            property.title,
            pricing::format_price(property.pricing.per_night, &config.currency)
        );
        println!("   {} · {} guests, {} bedrooms", property.property_type, property.guests, property.bedrooms);
        println!("   {}, {}", property.location.city, property.location.country);
        println!("   ID: {}", property.id);
        println!("   Amenities: {}", property.amenities.join(", "));
        println!();
    }

    let Some(property) = listings.first() else {
        warn!("Nothing to book");
        return Ok(());
    };

    let guest = format!("{}-guest", host);
    let check_in = Utc::now() + Duration::days(7);
    let check_out = check_in + Duration::days(3);
    let fee_model = FeeModel::Host {
        cleaning_fee: property.pricing.cleaning_fee,
    };

    let nights = pricing::nights(Some(check_in), Some(check_out));
    let breakdown = pricing::breakdown(property.pricing.per_night, nights, fee_model);
    for line in breakdown.lines(&config.currency) {
        println!("   {:<32} {}", line.label, line.value);
    }

    let booking = bookings
        .create(BookingDraft::for_property(property, &guest, check_in, check_out, 2, fee_model))
        .await?;
    info!("Booked {} as {}", property.title, booking.id);

    favorites.load(Some(&guest)).await?;
    favorites.toggle(&guest, &property.id).await?;
    info!("{} has {} favourites", guest, favorites.favorites().await.len());

    let mine = bookings.list_for_user(&guest).await;
    let json = serde_json::to_string_pretty(&mine)?;
    let export = config.data_dir.join(format!("{}_bookings_export.json", guest));
    tokio::fs::write(&export, json).await?;
    info!("💾 Saved {} bookings to {}", mine.len(), export.display());

    Ok(())
}
