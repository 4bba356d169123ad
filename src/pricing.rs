//! Stay price calculations: night counts, totals, fee breakdowns and
//! currency formatting. Everything here is pure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 86_400_000;

/// Service fee share under [`FeeModel::Platform`]
pub const PLATFORM_SERVICE_RATE: f64 = 0.12;
/// Flat cleaning fee under [`FeeModel::Platform`]
pub const PLATFORM_CLEANING_FEE: f64 = 1_000.0;
/// Service fee share under [`FeeModel::Host`]
pub const HOST_SERVICE_RATE: f64 = 0.10;

pub const DEFAULT_CURRENCY: &str = "NGN";

/// Which fee rule to apply on top of the nightly base price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "camelCase")]
pub enum FeeModel {
    /// 12% service fee on the base plus a flat cleaning fee.
    Platform,
    /// The host's own cleaning fee, then a 10% service fee on base + cleaning.
    #[serde(rename_all = "camelCase")]
    Host { cleaning_fee: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: f64,
    pub nights: u32,
    pub price_per_night: f64,
    pub service_fee: f64,
    pub cleaning_fee: f64,
    pub total: f64,
}

/// One labelled row of a rendered breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLine {
    pub label: String,
    pub value: String,
}

/// Whole nights between check-in and check-out, rounding partial days up.
/// Zero when either date is missing or the range is empty.
pub fn nights(check_in: Option<DateTime<Utc>>, check_out: Option<DateTime<Utc>>) -> u32 {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return 0;
    };

    let ms = (check_out - check_in).num_milliseconds();
    if ms <= 0 {
        return 0;
    }

    let days = (ms + MS_PER_DAY - 1) / MS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// Base price of a stay. Guest count does not affect the price.
pub fn total(per_night: f64, nights: u32) -> f64 {
    if nights < 1 {
        return 0.0;
    }
    per_night * f64::from(nights)
}

pub fn breakdown(per_night: f64, nights: u32, fee_model: FeeModel) -> PriceBreakdown {
    let base_price = per_night * f64::from(nights);

    let (service_fee, cleaning_fee) = match fee_model {
        FeeModel::Platform => (
            (base_price * PLATFORM_SERVICE_RATE).round(),
            PLATFORM_CLEANING_FEE,
        ),
        FeeModel::Host { cleaning_fee } => (
            ((base_price + cleaning_fee) * HOST_SERVICE_RATE).round(),
            cleaning_fee,
        ),
    };

    PriceBreakdown {
        base_price,
        nights,
        price_per_night: per_night,
        service_fee,
        cleaning_fee,
        total: base_price + service_fee + cleaning_fee,
    }
}

impl PriceBreakdown {
    pub fn lines(&self, currency: &str) -> Vec<PriceLine> {
        let unit = if self.nights == 1 { "night" } else { "nights" };
        vec![
            PriceLine {
                label: format!(
                    "{} × {} {}",
                    format_price(self.price_per_night, currency),
                    self.nights,
                    unit
                ),
                value: format_price(self.base_price, currency),
            },
            PriceLine {
                label: "Service fee".to_string(),
                value: format_price(self.service_fee, currency),
            },
            PriceLine {
                label: "Cleaning fee".to_string(),
                value: format_price(self.cleaning_fee, currency),
            },
            PriceLine {
                label: "Total".to_string(),
                value: format_price(self.total, currency),
            },
        ]
    }
}

fn currency_prefix(currency: &str) -> String {
    match currency.to_ascii_uppercase().as_str() {
        "NGN" => "₦".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        other => format!("{} ", other),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Render an amount with its currency symbol, comma grouping and no
/// decimal places, e.g. `₦150,000`.
pub fn format_price(amount: f64, currency: &str) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{}{}{}", sign, currency_prefix(currency), group_thousands(&digits))
}
