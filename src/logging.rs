//! Log-safe rendering of secrets.
//!
//! The exchange-rate provider embeds its API key in the request path, so any
//! URL or key that reaches a log line goes through these helpers first.

use std::fmt;

/// Masked API key: the first 4 characters followed by `***`
#[derive(Clone, Debug)]
pub struct SensitiveApiKey<'a> {
    inner: &'a str,
}

impl<'a> SensitiveApiKey<'a> {
    /// # Example
    /// ```
    /// use salary_predictor::logging::SensitiveApiKey;
    ///
    /// let masked = SensitiveApiKey::new("7515210001ea1bb24d28e240");
    /// assert_eq!(masked.to_string(), "7515***");
    /// ```
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl<'a> fmt::Display for SensitiveApiKey<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const VISIBLE: usize = 4;
        match self.inner.get(..VISIBLE) {
            Some(prefix) if self.inner.len() > VISIBLE * 2 => write!(f, "{}***", prefix),
            _ => write!(f, "***"),
        }
    }
}

/// Replace every occurrence of `key` inside `url` with its masked form
///
/// # Example
/// ```
/// use salary_predictor::logging::redact_key_in_url;
///
/// let url = "https://v6.exchangerate-api.com/v6/7515210001ea1bb24d28e240/latest/USD";
/// assert_eq!(
///     redact_key_in_url(url, "7515210001ea1bb24d28e240"),
///     "https://v6.exchangerate-api.com/v6/7515***/latest/USD"
/// );
/// ```
pub fn redact_key_in_url(url: &str, key: &str) -> String {
    if key.is_empty() {
        return url.to_string();
    }
    url.replace(key, &SensitiveApiKey::new(key).to_string())
}
