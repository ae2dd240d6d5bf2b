//! Currency conversion of a USD salary estimate.
//!
//! Both fallbacks below are part of the contract: a missing INR rate uses the
//! fixed [`FALLBACK_INR_RATE`], a missing target rate is treated as parity
//! with USD. Nothing is rounded here; formatting belongs to the renderer.

use serde::Serialize;

use crate::rates::ExchangeRateTable;

/// INR per USD when the rate table has no INR entry
pub const FALLBACK_INR_RATE: f64 = 83.0;

/// Rate used for any target currency missing from the rate table
pub const PARITY_RATE: f64 = 1.0;

/// One lakh = 100,000
pub const LAKH: f64 = 1e5;

pub const INR: &str = "INR";

/// A USD estimate expressed in INR, lakhs and the requested target currency
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub usd: f64,
    pub inr: f64,
    pub lakhs: f64,
    pub converted: f64,
    pub target_currency: String,
}

/// Converts USD amounts using one session's rate table
#[derive(Debug, Clone, Copy)]
pub struct CurrencyConverter<'a> {
    rates: &'a ExchangeRateTable,
    fallback_inr_rate: f64,
}

impl<'a> CurrencyConverter<'a> {
    pub fn new(rates: &'a ExchangeRateTable) -> Self {
        Self::with_inr_fallback(rates, FALLBACK_INR_RATE)
    }

    pub fn with_inr_fallback(rates: &'a ExchangeRateTable, fallback_inr_rate: f64) -> Self {
        Self {
            rates,
            fallback_inr_rate,
        }
    }

    pub fn inr_rate(&self) -> f64 {
        self.rates.get(INR).unwrap_or(self.fallback_inr_rate)
    }

    pub fn rate_for(&self, currency: &str) -> f64 {
        self.rates.get(currency).unwrap_or(PARITY_RATE)
    }

    pub fn to_inr(&self, usd: f64) -> f64 {
        usd * self.inr_rate()
    }

    pub fn to_currency(&self, usd: f64, currency: &str) -> f64 {
        usd * self.rate_for(currency)
    }

    pub fn convert(&self, usd: f64, target_currency: &str) -> Conversion {
        let inr = self.to_inr(usd);
        Conversion {
            usd,
            inr,
            lakhs: inr / LAKH,
            converted: self.to_currency(usd, target_currency),
            target_currency: target_currency.to_string(),
        }
    }
}
