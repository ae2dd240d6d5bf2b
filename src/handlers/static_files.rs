//! Placeholder image for the right-hand panel, read from disk on request

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::AppState;

/// GET /static/home.png
pub async fn placeholder_image(State(state): State<AppState>) -> Response {
    let path = &state.config.presentation.placeholder_image;

    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Placeholder image unavailable");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_image_is_not_found() {
        let mut state = testing::state();
        let mut config = (*state.config).clone();
        config.presentation.placeholder_image = "does/not/exist.png".into();
        state.config = Arc::new(config);

        let response = placeholder_image(State(state)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_image_served_with_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let mut state = testing::state();
        let mut config = (*state.config).clone();
        config.presentation.placeholder_image = path;
        state.config = Arc::new(config);

        let response = placeholder_image(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    }
}
