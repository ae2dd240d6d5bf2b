use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use super::{currency_options, default_currency, resolve_session, AppState};
use crate::{
    error::AppError,
    features::EmployeeProfile,
    render::{render_page, FormValues, Page, PageState},
    summary::Summary,
};

/// Raw form fields; everything arrives as text so bad input renders inline
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionForm {
    pub education: String,
    pub employment: String,
    pub dev_type: String,
    pub experience: String,
    pub country: String,
    pub org_size: String,
    pub target_currency: String,
}

impl PredictionForm {
    pub fn to_profile(&self) -> Result<EmployeeProfile, AppError> {
        let experience = self.experience.trim().parse::<f64>().map_err(|_| {
            AppError::InvalidInput(format!(
                "years of experience must be a number, got '{}'",
                self.experience
            ))
        })?;

        Ok(EmployeeProfile {
            education: self.education.clone(),
            employment: self.employment.clone(),
            dev_type: self.dev_type.clone(),
            experience,
            country: self.country.clone(),
            org_size: self.org_size.clone(),
        })
    }

    fn values(&self) -> FormValues {
        FormValues {
            education: self.education.clone(),
            employment: self.employment.clone(),
            dev_type: self.dev_type.clone(),
            experience: self.experience.clone(),
            country: self.country.clone(),
            org_size: self.org_size.clone(),
            target_currency: self.target_currency.clone(),
        }
    }
}

/// GET /: empty form with the placeholder on the right
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let resolved = resolve_session(&state, &headers).await;
    let currencies = currency_options(&state, &resolved.session);

    let values = FormValues {
        target_currency: default_currency(&state, &currencies),
        ..FormValues::default()
    };

    let mut response = render(&state, &currencies, &values, &PageState::AwaitingInput);
    resolved.apply(response.headers_mut());
    response
}

/// POST /predict: render the result, or the error with no summary panel
pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PredictionForm>,
) -> Response {
    let resolved = resolve_session(&state, &headers).await;
    let currencies = currency_options(&state, &resolved.session);

    let mut values = form.values();
    if values.target_currency.is_empty() {
        values.target_currency = default_currency(&state, &currencies);
    }

    let page_state = match run_prediction(&state, &form, &resolved.session.rates, &values.target_currency) {
        Ok(page_state) => page_state,
        Err(e) => PageState::Failed {
            message: e.to_string(),
        },
    };

    let mut response = render(&state, &currencies, &values, &page_state);
    resolved.apply(response.headers_mut());
    response
}

fn run_prediction(
    state: &AppState,
    form: &PredictionForm,
    rates: &crate::rates::ExchangeRateTable,
    target_currency: &str,
) -> Result<PageState, AppError> {
    let profile = form.to_profile()?;
    let result = state.predictor.predict(&profile, rates, target_currency)?;
    let summary = Summary::from_result(&result);
    let csv_uri = summary.csv_data_uri()?;

    Ok(PageState::Success {
        result,
        summary,
        csv_uri,
    })
}

fn render(
    state: &AppState,
    currencies: &[String],
    values: &FormValues,
    page_state: &PageState,
) -> Response {
    let presentation = &state.config.presentation;
    let html = render_page(&Page {
        title: &presentation.title,
        tagline: &presentation.tagline,
        encoders: &state.predictor.artifacts().encoders,
        currencies,
        values,
        state: page_state,
    });
    Html(html).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use axum::{body::to_bytes, http::header, http::StatusCode};

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form(country: &str) -> PredictionForm {
        PredictionForm {
            education: "Bachelor's degree".to_string(),
            employment: "Full-time".to_string(),
            dev_type: "Developer, back-end".to_string(),
            experience: "5.0".to_string(),
            country: country.to_string(),
            org_size: "Medium".to_string(),
            target_currency: "INR".to_string(),
        }
    }

    #[tokio::test]
    async fn test_index_starts_session() {
        let state = testing::state();
        let response = index(State(state.clone()), HeaderMap::new()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        let html = body_text(response).await;
        assert!(html.contains("/static/home.png"));
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_predict_success_renders_summary() {
        let state = testing::state();
        let (_, headers) = testing::session_with_rates(&state, &[("INR", 83.0), ("EUR", 0.9)]);

        let response = predict(State(state), headers, Form(form("India"))).await;
        assert!(!response.headers().contains_key(header::SET_COOKIE));

        let html = body_text(response).await;
        // 20000 + 1000 * 5 = 25000 USD → 2,075,000 INR
        assert!(html.contains("Predicted Annual Salary: INR 2,075,000"));
        assert!(html.contains("Equivalent in ₹: ₹2,075,000 (~ ₹20.75 Lakhs)"));
        assert!(html.contains("Prediction Summary"));
        assert!(html.contains("download=\"salary_prediction_summary.csv\""));
        assert!(!html.contains("/static/home.png"));
    }

    #[tokio::test]
    async fn test_predict_failure_renders_error_only() {
        let state = testing::state();
        let (session, headers) = testing::session_with_rates(&state, &[("INR", 83.0)]);

        let response = predict(State(state.clone()), headers, Form(form("Atlantis"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Unrecognized country category"));
        assert!(!html.contains("Prediction Summary"));

        // The session and its cached table survive the failure
        let cached = state.sessions.touch(session.id).unwrap();
        assert_eq!(cached.rates.get("INR"), Some(83.0));
    }

    #[tokio::test]
    async fn test_predict_rejects_non_numeric_experience() {
        let state = testing::state();
        let (_, headers) = testing::session_with_rates(&state, &[("INR", 83.0)]);
        let mut bad = form("India");
        bad.experience = "lots".to_string();

        let html = body_text(predict(State(state), headers, Form(bad)).await).await;
        assert!(html.contains("years of experience must be a number"));
    }
}
