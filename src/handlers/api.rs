use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{currency_options, default_currency, resolve_session, AppState};
use crate::{
    error::AppError,
    features::{EmployeeProfile, OrgSize},
    prediction::PredictionResult,
    summary::{Summary, SummaryRow},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub education: Vec<String>,
    pub employment: Vec<String>,
    pub dev_type: Vec<String>,
    pub country: Vec<String>,
    pub org_size: Vec<String>,
    pub currencies: Vec<String>,
    pub default_currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub education: String,
    pub employment: String,
    pub dev_type: String,
    pub experience: f64,
    pub country: String,
    pub org_size: String,
    #[serde(default)]
    pub target_currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub summary: Vec<SummaryRow>,
    pub csv: String,
}

/// GET /api/v1/options: everything needed to build the form client-side
pub async fn options(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let resolved = resolve_session(&state, &headers).await;
    let currencies = currency_options(&state, &resolved.session);
    let encoders = &state.predictor.artifacts().encoders;

    let body = OptionsResponse {
        education: encoders.education.valid_labels().to_vec(),
        employment: encoders.employment.valid_labels().to_vec(),
        dev_type: encoders.dev_type.valid_labels().to_vec(),
        country: encoders.country.valid_labels().to_vec(),
        org_size: OrgSize::labels().into_iter().map(String::from).collect(),
        default_currency: default_currency(&state, &currencies),
        currencies,
    };

    let mut response = Json(body).into_response();
    resolved.apply(response.headers_mut());
    response
}

/// POST /api/v1/predict: JSON mirror of the form submission
pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let resolved = resolve_session(&state, &headers).await;

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let mut response = AppError::InvalidInput(rejection.body_text()).into_response();
            resolved.apply(response.headers_mut());
            return response;
        }
    };

    let target_currency = match request.target_currency.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => default_currency(&state, &currency_options(&state, &resolved.session)),
    };

    let profile = EmployeeProfile {
        education: request.education,
        employment: request.employment,
        dev_type: request.dev_type,
        experience: request.experience,
        country: request.country,
        org_size: request.org_size,
    };

    let outcome = state
        .predictor
        .predict(&profile, &resolved.session.rates, &target_currency)
        .and_then(|result| {
            let summary = Summary::from_result(&result);
            let csv = summary.to_csv()?;
            Ok(PredictResponse {
                result,
                summary: summary.rows().to_vec(),
                csv,
            })
        });

    let mut response = match outcome {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    };
    resolved.apply(response.headers_mut());
    response
}
