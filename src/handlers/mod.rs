pub mod api;
pub mod health;
pub mod metrics_handler;
pub mod page;
pub mod static_files;

use axum::http::{header, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::{
    config::Config,
    prediction::PredictionService,
    rates::ExchangeRateClient,
    session::{session_cookie, session_id_from_cookie, Session, SessionStore},
};

/// Shared, read-only state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub predictor: PredictionService,
    pub rates_client: ExchangeRateClient,
    pub sessions: Arc<SessionStore>,
}

/// The caller's session and, for a new one, the cookie that names it
pub struct ResolvedSession {
    pub session: Session,
    pub set_cookie: Option<HeaderValue>,
}

impl ResolvedSession {
    /// Attach the `Set-Cookie` header when the session was just created
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(cookie) = &self.set_cookie {
            headers.insert(header::SET_COOKIE, cookie.clone());
        }
    }
}

/// Look up the session named by the request cookie, or start a new one
///
/// Starting a session is the only place exchange rates are fetched, so a
/// session sees one rate table for its whole lifetime.
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> ResolvedSession {
    let cookie_name = &state.config.session.cookie_name;

    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| session_id_from_cookie(value, cookie_name))
        .and_then(|id| state.sessions.touch(id));

    if let Some(session) = existing {
        return ResolvedSession {
            session,
            set_cookie: None,
        };
    }

    let rates = state.rates_client.fetch_rates().await;
    let session = Session::new(rates);
    info!(
        session_id = %session.id,
        currencies = session.rates.len(),
        "Started new session"
    );

    let ttl = Duration::from_secs(state.config.session.ttl_seconds);
    let set_cookie = HeaderValue::from_str(&session_cookie(cookie_name, session.id, ttl)).ok();
    state.sessions.insert(session.clone());

    ResolvedSession {
        session,
        set_cookie,
    }
}

/// Currency selector options: the table's codes, or just the default when empty
pub fn currency_options(state: &AppState, session: &Session) -> Vec<String> {
    if session.rates.is_empty() {
        vec![state.config.presentation.default_currency.clone()]
    } else {
        session.rates.currencies()
    }
}

/// The configured default currency if offered, otherwise the first option
pub fn default_currency(state: &AppState, options: &[String]) -> String {
    let preferred = &state.config.presentation.default_currency;
    if options.iter().any(|code| code == preferred) {
        preferred.clone()
    } else {
        options.first().cloned().unwrap_or_else(|| preferred.clone())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::{artifacts, config::create_test_config};

    /// State whose rate provider is unreachable, so every new session gets an empty table
    pub fn state() -> AppState {
        let config = create_test_config();
        AppState {
            predictor: PredictionService::new(artifacts::testing::artifacts(20000.0)),
            rates_client: ExchangeRateClient::new(reqwest::Client::new(), &config.exchange_rates),
            sessions: Arc::new(SessionStore::new(Duration::from_secs(
                config.session.ttl_seconds,
            ))),
            config: Arc::new(config),
        }
    }

    /// Register a session with a known rate table and return its cookie header
    pub fn session_with_rates(state: &AppState, rates: &[(&str, f64)]) -> (Session, HeaderMap) {
        let session = Session::new(
            rates
                .iter()
                .map(|(code, rate)| (code.to_string(), *rate))
                .collect(),
        );
        state.sessions.insert(session.clone());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!(
                "{}={}",
                state.config.session.cookie_name, session.id
            ))
            .unwrap(),
        );
        (session, headers)
    }
}
