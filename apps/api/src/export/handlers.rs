use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{Channel, ExportSession, SessionSnapshot};
use crate::models::ResumeData;
use crate::routes::download::{file_response, Disposition};
use crate::state::AppState;
use crate::templates::Template;

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub resume: ResumeData,
    #[serde(default)]
    pub template: Template,
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub template: Template,
}

/// POST /api/v1/sessions
/// Opens a visible export view; preview generation starts immediately.
pub async fn handle_open_session(
    State(state): State<AppState>,
    Json(req): Json<OpenSessionRequest>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let session = ExportSession::open(
        req.resume,
        req.template,
        state.generator.clone(),
        state.host.clone(),
        state.previews.clone(),
    );
    session.show();
    info!("Opened export view {} ({})", session.id(), req.template);
    let snapshot = session.snapshot();
    state.sessions.insert(session);
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.get(id)?.snapshot()))
}

/// PUT /api/v1/sessions/:id/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectTemplateRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    session.select_template(req.template);
    Ok(Json(session.snapshot()))
}

/// POST /api/v1/sessions/:id/preview/retry
pub async fn handle_retry_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let session = state.sessions.get(id)?;
    session.retry_preview()?;
    Ok((StatusCode::ACCEPTED, Json(session.snapshot())))
}

/// GET /api/v1/sessions/:id/preview
/// Inline bytes of the installed preview; 404 while none is live.
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let preview = state
        .sessions
        .get(id)?
        .preview()
        .ok_or_else(|| AppError::NotFound(format!("No preview available for session {id}")))?;
    Ok(file_response(
        preview.bytes,
        &preview.file_name,
        preview.mime_type,
        Disposition::Inline,
    ))
}

/// POST /api/v1/sessions/:id/exports/:channel
pub async fn handle_request_export(
    State(state): State<AppState>,
    Path((id, channel)): Path<(Uuid, String)>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let channel = channel
        .parse::<Channel>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let session = state.sessions.get(id)?;
    session.request_export(channel)?;
    Ok((StatusCode::ACCEPTED, Json(session.snapshot())))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id)?;
    info!("Closed export view {id}");
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use super::*;
    use crate::export::{ArtifactGenerator, ChannelState};
    use crate::render::{ArtifactFormat, GeneratedArtifact, GenerationError};
    use crate::routes::build_router;
    use crate::routes::test_support::test_state;

    /// Never finishes until the test opens the gate.
    #[derive(Default)]
    struct StalledGenerator {
        gate: Notify,
    }

    #[async_trait]
    impl ArtifactGenerator for StalledGenerator {
        async fn generate(
            &self,
            _data: Arc<ResumeData>,
            _template: Template,
            _format: ArtifactFormat,
        ) -> Result<GeneratedArtifact, GenerationError> {
            self.gate.notified().await;
            Err(GenerationError::Worker("cancelled".to_string()))
        }
    }

    fn ana() -> Value {
        json!({
            "name": "Ana",
            "surname": "Ruiz",
            "title": "Backend Developer",
            "experiences": [{"cargo": "Dev", "empresa": "Acme"}]
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                request = request.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn open(app: &Router, resume: Value, template: &str) -> Uuid {
        let response = send(
            app,
            "POST",
            "/api/v1/sessions",
            Some(json!({"resume": resume, "template": template})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["visible"], true);
        body["id"].as_str().unwrap().parse().unwrap()
    }

    async fn wait_until(state: &AppState, id: Uuid, done: impl Fn(&SessionSnapshot) -> bool) {
        let mut rx = state.sessions.get(id).unwrap().subscribe();
        rx.wait_for(|s| done(s)).await.unwrap();
    }

    #[tokio::test]
    async fn test_preview_is_served_inline() {
        let (state, _dir) = test_state();
        let app = build_router(state.clone());
        let id = open(&app, ana(), "classic").await;
        wait_until(&state, id, |s| s.channels.preview.output().is_some()).await;

        let response = send(&app, "GET", &format!("/api/v1/sessions/{id}/preview"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("inline;"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_template_change_regenerates_preview() {
        let (state, _dir) = test_state();
        let app = build_router(state.clone());
        let id = open(&app, ana(), "classic").await;

        let response = send(
            &app,
            "PUT",
            &format!("/api/v1/sessions/{id}/template"),
            Some(json!({"template": "modern"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["template"], "modern");

        wait_until(&state, id, |s| {
            s.channels
                .preview
                .output()
                .is_some_and(|o| o.template == Template::Modern)
        })
        .await;
        assert_eq!(state.previews.live_count(), 1);
    }

    #[tokio::test]
    async fn test_word_export_saves_file_and_closes_view() {
        let (state, dir) = test_state();
        let app = build_router(state.clone());
        let id = open(&app, ana(), "modern").await;

        let response = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/exports/word-classic"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        wait_until(&state, id, |s| {
            s.channels.word_classic.output().is_some() && !s.visible
        })
        .await;
        assert!(dir.path().join("Ana_Ruiz_CV_Classic.docx").exists());

        let body = json_body(send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await).await;
        assert_eq!(body["channels"]["wordClassic"]["state"], "ready");
        assert_eq!(body["visible"], false);
    }

    #[tokio::test]
    async fn test_invalid_resume_fails_download_channel() {
        let (state, _dir) = test_state();
        let app = build_router(state.clone());
        let id = open(&app, json!({"name": "Ana"}), "modern").await;

        let response = send(&app, "POST", &format!("/api/v1/sessions/{id}/exports/pdf"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("The surname is required"));

        let session = state.sessions.get(id).unwrap();
        assert!(matches!(
            session.state(Channel::PdfDownload),
            ChannelState::Failed { .. }
        ));
        // Preview still renders best-effort.
        wait_until(&state, id, |s| s.channels.preview.output().is_some()).await;
    }

    #[tokio::test]
    async fn test_busy_channel_conflicts() {
        let (mut state, _dir) = test_state();
        let stalled = Arc::new(StalledGenerator::default());
        state.generator = stalled.clone();
        let app = build_router(state.clone());
        let id = open(&app, ana(), "modern").await;

        let uri = format!("/api/v1/sessions/{id}/exports/word-modern");
        assert_eq!(send(&app, "POST", &uri, None).await.status(), StatusCode::ACCEPTED);
        let response = send(&app, "POST", &uri, None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error"]["code"], "CONFLICT");

        let other = format!("/api/v1/sessions/{id}/exports/word-classic");
        assert_eq!(send(&app, "POST", &other, None).await.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_unknown_channel_and_session() {
        let (state, _dir) = test_state();
        let app = build_router(state.clone());
        let id = open(&app, ana(), "modern").await;

        let response = send(&app, "POST", &format!("/api/v1/sessions/{id}/exports/fax"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let missing = Uuid::new_v4();
        let response = send(&app, "GET", &format!("/api/v1/sessions/{missing}"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_close_session_releases_preview() {
        let (state, _dir) = test_state();
        let app = build_router(state.clone());
        let id = open(&app, ana(), "modern").await;
        wait_until(&state, id, |s| s.channels.preview.output().is_some()).await;

        let response = send(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.previews.live_count(), 0);

        let response = send(&app, "GET", &format!("/api/v1/sessions/{id}/preview"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
