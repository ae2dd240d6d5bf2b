use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{config::ExchangeRateConfig, logging::redact_key_in_url, metrics};

/// Currency code → units of that currency per one USD
///
/// Backed by a `BTreeMap`, so [`currencies`](Self::currencies) is already in
/// alphabetical order for the currency selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRateTable {
    rates: BTreeMap<String, f64>,
}

impl ExchangeRateTable {
    pub fn new(rates: BTreeMap<String, f64>) -> Self {
        Self { rates }
    }

    pub fn get(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.rates.contains_key(currency)
    }

    /// Sorted currency codes
    pub fn currencies(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for ExchangeRateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Provider response body; everything except `conversion_rates` is ignored
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    conversion_rates: BTreeMap<String, f64>,
}

/// Client for the `latest/{base}` endpoint of the exchange-rate provider
#[derive(Debug, Clone)]
pub struct ExchangeRateClient {
    client: Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl ExchangeRateClient {
    pub fn new(client: Client, config: &ExchangeRateConfig) -> Self {
        Self {
            client,
            url: config.latest_url(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Fetch the current rate table
    ///
    /// Never fails: any network, status or decoding problem yields an empty
    /// table and the caller's fallbacks take over. No retries.
    pub async fn fetch_rates(&self) -> ExchangeRateTable {
        let url = redact_key_in_url(&self.url, &self.api_key);
        debug!(url = %url, "Fetching exchange rates");

        match self.try_fetch().await {
            Ok(table) => {
                info!(url = %url, currencies = table.len(), "Exchange rates fetched");
                metrics::record_rate_fetch("success");
                table
            }
            Err(e) => {
                // reqwest errors carry the request URL, which contains the key
                let reason = redact_key_in_url(&e.to_string(), &self.api_key);
                warn!(url = %url, error = %reason, "Exchange rate fetch failed, using fallback rates");
                metrics::record_rate_fetch("failure");
                ExchangeRateTable::default()
            }
        }
    }

    async fn try_fetch(&self) -> anyhow::Result<ExchangeRateTable> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body: LatestRatesResponse = response.json().await?;
        Ok(ExchangeRateTable::new(body.conversion_rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currencies_are_sorted() {
        let table: ExchangeRateTable = [("USD", 1.0), ("EUR", 0.9), ("INR", 83.0), ("AED", 3.67)]
            .into_iter()
            .map(|(c, r)| (c.to_string(), r))
            .collect();

        assert_eq!(table.currencies(), vec!["AED", "EUR", "INR", "USD"]);
        assert_eq!(table.get("INR"), Some(83.0));
        assert!(table.get("XYZ").is_none());
    }

    #[test]
    fn test_response_parsing_ignores_other_fields() {
        let body = r#"{
            "result": "success",
            "base_code": "USD",
            "conversion_rates": {"USD": 1, "INR": 83.12}
        }"#;
        let parsed: LatestRatesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.conversion_rates.get("INR"), Some(&83.12));
        assert_eq!(parsed.conversion_rates.get("USD"), Some(&1.0));
    }

    #[test]
    fn test_response_without_rates_is_rejected() {
        let body = r#"{"result": "error", "error-type": "invalid-key"}"#;
        assert!(serde_json::from_str::<LatestRatesResponse>(body).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_empty_table() {
        let config = ExchangeRateConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "secret-key-0000".to_string(),
            base_currency: "USD".to_string(),
            timeout_seconds: 1,
            fallback_inr_rate: 83.0,
        };
        let client = ExchangeRateClient::new(Client::new(), &config);

        let table = client.fetch_rates().await;
        assert!(table.is_empty());
    }
}
