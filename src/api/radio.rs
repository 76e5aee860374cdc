use crate::error::{AppError, Result};
use crate::models::{GreetingRequest, GreetingResponse, RadioRequest, RadioResponse, Track};
use crate::services::RadioDj;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub struct AppState {
    pub dj: Arc<RadioDj>,
}

pub fn radio_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health))
        .route("/api/tracks", get(list_tracks))
        .route("/api/radio", post(suggest))
        .route("/api/greeting", post(greeting))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ai-radio",
    }))
}

async fn list_tracks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Track>>> {
    let tracks = state.dj.all_tracks().await?;
    Ok(Json(tracks))
}

/// A missing body counts as an empty request; a malformed one is a 400.
fn body_or_default<T: Default>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::Validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

async fn suggest(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RadioRequest>, JsonRejection>,
) -> Result<Json<RadioResponse>> {
    let request = body_or_default(body)?;
    let response = state.dj.suggest(request).await?;
    Ok(Json(response))
}

async fn greeting(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<GreetingRequest>, JsonRejection>,
) -> Result<Json<GreetingResponse>> {
    let request = body_or_default(body)?;
    let response = state.dj.greet(request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{GeminiClient, SheetsClient};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let sheets = Arc::new(SheetsClient::new("key".into(), "sheet".into()));
        let gemini = Arc::new(GeminiClient::new("key".into(), "gemini-pro".into()));
        let dj = Arc::new(RadioDj::new(sheets, gemini, None));
        radio_routes().with_state(Arc::new(AppState { dj }))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let response = test_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_malformed_radio_body_is_400() {
        let request = Request::post("/api/radio")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Invalid request body"));
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_400() {
        let request = Request::post("/api/radio")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"request": 42}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_greeting_defaults_without_body() {
        let response = test_app()
            .oneshot(Request::post("/api/greeting").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let speech = json["speechText"].as_str().unwrap();
        assert!(speech.contains("Гость"));
        assert!(json.get("speechAudio").is_none());
    }

    #[tokio::test]
    async fn test_greeting_uses_name_and_language() {
        let request = Request::post("/api/greeting")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"userName": "Alex", "language": "en"}"#))
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["speechText"].as_str().unwrap().contains("Alex"));
    }
}
