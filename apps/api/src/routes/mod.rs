pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::rework::handlers as rework;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Extraction API
        .route("/api/v1/bullets/extract", post(extraction::handle_extract))
        .route("/api/v1/resumes/upload", post(extraction::handle_upload))
        // Rework API
        .route("/api/v1/rework", post(rework::handle_start_rework))
        .route("/api/v1/rework/bullet", post(rework::handle_bullet_action))
        .route("/api/v1/rework/export", post(rework::handle_export))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::rules::ExtractionRules;

    const RESUME: &str = "EXPERIENCE\n- Led a team of 5 engineers to launch a new feature\nShort line\nManaged a $2M budget for the marketing department";

    fn app() -> Router {
        build_router(AppState {
            config: Config::default(),
            rules: Arc::new(ExtractionRules::default()),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_multipart(field_name: &str, content_type: &str, payload: &str) -> Request<Body> {
        let body = format!(
            "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"{field_name}\"; filename=\"resume.pdf\"\r\nContent-Type: {content_type}\r\n\r\n{payload}\r\n--XBOUNDARY--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/upload")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=XBOUNDARY",
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "rework-api");
    }

    #[tokio::test]
    async fn test_extract_endpoint_returns_camel_case_bullets() {
        let (status, body) =
            send(post_json("/api/v1/bullets/extract", json!({ "raw_text": RESUME }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["bullets"][0]["sectionTitle"], "EXPERIENCE");
        assert_eq!(body["bullets"][1]["order"], 1);
        assert_eq!(
            body["bullets"][1]["text"],
            "Managed a $2M budget for the marketing department"
        );
    }

    #[tokio::test]
    async fn test_extract_endpoint_empty_text_is_ok() {
        let (status, body) =
            send(post_json("/api/v1/bullets/extract", json!({ "raw_text": "" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let (status, body) = send(post_multipart("file", "text/plain", "hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Only PDF files are accepted");
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let (status, body) = send(post_multipart("attachment", "application/pdf", "x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No file provided");
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf() {
        let (status, body) =
            send(post_multipart("file", "application/pdf", "not really a pdf")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "PDF_ERROR");
    }

    #[tokio::test]
    async fn test_start_rework_seeds_session() {
        let (status, body) =
            send(post_json("/api/v1/rework", json!({ "extracted_text": RESUME }))).await;
        assert_eq!(status, StatusCode::OK);
        let session = &body["rework_session"];
        assert_eq!(session["total_bullets"], 2);
        assert_eq!(session["status"], "in_progress");
        assert_eq!(session["bullets"][0]["status"], "pending");
        assert_eq!(
            session["bullets"][0]["original_text"],
            "Led a team of 5 engineers to launch a new feature"
        );
    }

    #[tokio::test]
    async fn test_start_rework_without_bullets_is_bad_request() {
        let (status, body) = send(post_json(
            "/api/v1/rework",
            json!({ "extracted_text": "Jane Doe\njane@example.com" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "No bullet points found in resume to rework."
        );
    }

    #[tokio::test]
    async fn test_bullet_actions_round_trip() {
        let (_, started) =
            send(post_json("/api/v1/rework", json!({ "extracted_text": RESUME }))).await;
        let session = started["rework_session"].clone();
        let first = session["bullets"][0]["id"].clone();
        let second = session["bullets"][1]["id"].clone();

        let (status, asked) = send(post_json(
            "/api/v1/rework/bullet",
            json!({ "rework_session": session, "bullet_id": first, "action": "ask" }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(asked["rework_session"]["bullets"][0]["status"], "in_conversation");
        assert!(asked["progress"].is_null());

        let (status, rewritten) = send(post_json(
            "/api/v1/rework/bullet",
            json!({
                "rework_session": asked["rework_session"],
                "bullet_id": first,
                "action": "rewrite",
                "user_explanation": "We launched search for 40k users",
                "revised_text": "Led 5 engineers to launch search for 40k users"
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, accepted) = send(post_json(
            "/api/v1/rework/bullet",
            json!({
                "rework_session": rewritten["rework_session"],
                "bullet_id": first,
                "action": "accept"
            }),
        ))
        .await;
        assert_eq!(accepted["progress"]["completed"], 1);
        assert_eq!(accepted["progress"]["session_completed"], false);
        assert_eq!(accepted["next_bullet_id"], second);

        let (_, done) = send(post_json(
            "/api/v1/rework/bullet",
            json!({
                "rework_session": accepted["rework_session"],
                "bullet_id": second,
                "action": "accept"
            }),
        ))
        .await;
        assert_eq!(done["progress"]["session_completed"], true);
        assert_eq!(done["rework_session"]["status"], "completed");
        assert!(done["next_bullet_id"].is_null());

        let (status, export) =
            send(post_json("/api/v1/rework/export", done["rework_session"].clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            export["text"],
            "EXPERIENCE\n  - Led 5 engineers to launch search for 40k users\n  - Managed a $2M budget for the marketing department"
        );
    }

    #[tokio::test]
    async fn test_rewrite_without_explanation_rejected() {
        let (_, started) =
            send(post_json("/api/v1/rework", json!({ "extracted_text": RESUME }))).await;
        let session = started["rework_session"].clone();
        let first = session["bullets"][0]["id"].clone();

        let (status, _) = send(post_json(
            "/api/v1/rework/bullet",
            json!({
                "rework_session": session,
                "bullet_id": first,
                "action": "rewrite",
                "revised_text": "Something new"
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_with_mismatched_total_rejected() {
        let (_, started) =
            send(post_json("/api/v1/rework", json!({ "extracted_text": RESUME }))).await;
        let mut session = started["rework_session"].clone();
        let first = session["bullets"][0]["id"].clone();
        session["total_bullets"] = json!(1);

        let (status, body) = send(post_json(
            "/api/v1/rework/bullet",
            json!({ "rework_session": session, "bullet_id": first, "action": "accept" }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(post_json("/api/v1/rework/export", session)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_bullet_is_not_found() {
        let (_, started) =
            send(post_json("/api/v1/rework", json!({ "extracted_text": RESUME }))).await;
        let (status, _) = send(post_json(
            "/api/v1/rework/bullet",
            json!({
                "rework_session": started["rework_session"],
                "bullet_id": "00000000-0000-0000-0000-000000000000",
                "action": "accept"
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
