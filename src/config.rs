use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub exchange_rates: ExchangeRateConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Locations of the fitted model and the four label encoders
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_model_file")]
    pub model: String,
    #[serde(default = "default_education_encoder")]
    pub education_encoder: String,
    #[serde(default = "default_employment_encoder")]
    pub employment_encoder: String,
    #[serde(default = "default_dev_type_encoder")]
    pub dev_type_encoder: String,
    #[serde(default = "default_country_encoder")]
    pub country_encoder: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            model: default_model_file(),
            education_encoder: default_education_encoder(),
            employment_encoder: default_employment_encoder(),
            dev_type_encoder: default_dev_type_encoder(),
            country_encoder: default_country_encoder(),
        }
    }
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model)
    }

    pub fn education_path(&self) -> PathBuf {
        self.dir.join(&self.education_encoder)
    }

    pub fn employment_path(&self) -> PathBuf {
        self.dir.join(&self.employment_encoder)
    }

    pub fn dev_type_path(&self) -> PathBuf {
        self.dir.join(&self.dev_type_encoder)
    }

    pub fn country_path(&self) -> PathBuf {
        self.dir.join(&self.country_encoder)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExchangeRateConfig {
    #[serde(default = "default_rates_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_rates_timeout")]
    pub timeout_seconds: u64,
    /// Used whenever the fetched table has no INR entry
    #[serde(default = "default_fallback_inr_rate")]
    pub fallback_inr_rate: f64,
}

impl Default for ExchangeRateConfig {
    fn default() -> Self {
        Self {
            base_url: default_rates_base_url(),
            api_key: String::new(),
            base_currency: default_base_currency(),
            timeout_seconds: default_rates_timeout(),
            fallback_inr_rate: default_fallback_inr_rate(),
        }
    }
}

impl ExchangeRateConfig {
    /// Full provider URL, e.g. `https://v6.exchangerate-api.com/v6/<key>/latest/USD`
    pub fn latest_url(&self) -> String {
        format!(
            "{}/{}/latest/{}",
            self.base_url.trim_end_matches('/'),
            self.api_key,
            self.base_currency
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
            cleanup_interval_seconds: default_cleanup_interval(),
            cookie_name: default_cookie_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresentationConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_tagline")]
    pub tagline: String,
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: PathBuf,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            tagline: default_tagline(),
            placeholder_image: default_placeholder_image(),
            default_currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("model_files")
}

fn default_model_file() -> String {
    "best_gb_model.json".to_string()
}

fn default_education_encoder() -> String {
    "le_edu.json".to_string()
}

fn default_employment_encoder() -> String {
    "le_emp.json".to_string()
}

fn default_dev_type_encoder() -> String {
    "le_dev.json".to_string()
}

fn default_country_encoder() -> String {
    "le_country.json".to_string()
}

fn default_rates_base_url() -> String {
    "https://v6.exchangerate-api.com/v6".to_string()
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_rates_timeout() -> u64 {
    10
}

fn default_fallback_inr_rate() -> f64 {
    crate::currency::FALLBACK_INR_RATE
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_cleanup_interval() -> u64 {
    300
}

fn default_cookie_name() -> String {
    "salary_session".to_string()
}

fn default_title() -> String {
    "Employee Salary Prediction".to_string()
}

fn default_tagline() -> String {
    "Explore Salary Potential Across Borders".to_string()
}

fn default_placeholder_image() -> PathBuf {
    PathBuf::from("home.png")
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

/// Load configuration from a TOML file, with `SALARY_PREDICTOR__SECTION__KEY`
/// environment overrides. A missing file is allowed; every key has a default.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("SALARY_PREDICTOR").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port must be non-zero");
    }

    if !matches!(cfg.server.log_format.as_str(), "text" | "json") {
        anyhow::bail!(
            "Invalid log format '{}', expected 'text' or 'json'",
            cfg.server.log_format
        );
    }

    if cfg.exchange_rates.base_url.is_empty() {
        anyhow::bail!("Exchange rate base URL cannot be empty");
    }

    if cfg.exchange_rates.timeout_seconds == 0 {
        anyhow::bail!("Exchange rate timeout must be at least 1 second");
    }

    let inr = cfg.exchange_rates.fallback_inr_rate;
    if !inr.is_finite() || inr <= 0.0 {
        anyhow::bail!("Fallback INR rate must be a positive number, got {}", inr);
    }

    if cfg.session.ttl_seconds == 0 {
        anyhow::bail!("Session TTL must be at least 1 second");
    }

    if cfg.session.cleanup_interval_seconds == 0 {
        anyhow::bail!("Session cleanup interval must be at least 1 second");
    }

    if cfg.session.cookie_name.is_empty()
        || !cfg
            .session
            .cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        anyhow::bail!("Invalid session cookie name '{}'", cfg.session.cookie_name);
    }

    if cfg.presentation.default_currency.is_empty() {
        anyhow::bail!("Default currency cannot be empty");
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint must start with '/'");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8501,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        },
        artifacts: ArtifactsConfig::default(),
        exchange_rates: ExchangeRateConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-rates-key-123456".to_string(),
            base_currency: "USD".to_string(),
            timeout_seconds: 1,
            fallback_inr_rate: 83.0,
        },
        session: SessionConfig::default(),
        presentation: PresentationConfig::default(),
        metrics: MetricsConfig::default(),
    }
}
