use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    artifacts::Artifacts,
    currency::{CurrencyConverter, FALLBACK_INR_RATE},
    error::{error_type_name, AppError},
    features::{EmployeeProfile, FeatureEncoder, FeatureVector},
    metrics,
    rates::ExchangeRateTable,
};

/// Outcome of one submission, held only long enough to render and export it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub profile: EmployeeProfile,
    pub usd: f64,
    pub inr: f64,
    pub lakhs: f64,
    pub converted: f64,
    pub target_currency: String,
}

/// Encode → predict → convert, over immutable artifacts
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifacts: Arc<Artifacts>,
    fallback_inr_rate: f64,
}

impl PredictionService {
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self::with_inr_fallback(artifacts, FALLBACK_INR_RATE)
    }

    pub fn with_inr_fallback(artifacts: Arc<Artifacts>, fallback_inr_rate: f64) -> Self {
        Self {
            artifacts,
            fallback_inr_rate,
        }
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn encode(&self, profile: &EmployeeProfile) -> Result<FeatureVector, AppError> {
        FeatureEncoder::new(&self.artifacts.encoders).encode(profile)
    }

    /// USD estimate for an encoded row
    pub fn predict_usd(&self, features: &FeatureVector) -> Result<f64, AppError> {
        self.artifacts.model.predict(&features.to_row())
    }

    pub fn predict(
        &self,
        profile: &EmployeeProfile,
        rates: &ExchangeRateTable,
        target_currency: &str,
    ) -> Result<PredictionResult, AppError> {
        let started = Instant::now();
        let result = self.run(profile, rates, target_currency);

        match &result {
            Ok(prediction) => {
                info!(
                    usd = prediction.usd,
                    target_currency = %prediction.target_currency,
                    converted = prediction.converted,
                    "Salary predicted"
                );
                metrics::record_prediction("success", started.elapsed());
            }
            Err(e) => {
                warn!(error = %e, "Prediction failed");
                metrics::record_prediction(error_type_name(e), started.elapsed());
            }
        }

        result
    }

    fn run(
        &self,
        profile: &EmployeeProfile,
        rates: &ExchangeRateTable,
        target_currency: &str,
    ) -> Result<PredictionResult, AppError> {
        let features = self.encode(profile)?;
        debug!(features = ?features, "Encoded feature vector");

        let usd = self.predict_usd(&features)?;
        let conversion = CurrencyConverter::with_inr_fallback(rates, self.fallback_inr_rate)
            .convert(usd, target_currency);

        Ok(PredictionResult {
            profile: profile.clone(),
            usd: conversion.usd,
            inr: conversion.inr,
            lakhs: conversion.lakhs,
            converted: conversion.converted,
            target_currency: conversion.target_currency,
        })
    }
}
