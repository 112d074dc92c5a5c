use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::ResumeData;
use crate::render::ArtifactFormat;
use crate::resume::{validate, ValidationReport};
use crate::routes::download::{file_response, Disposition};
use crate::state::AppState;
use crate::templates::Template;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Selected template; Word formats ignore it.
    pub template: Option<Template>,
}

/// POST /api/v1/resume/validate
pub async fn handle_validate(Json(data): Json<ResumeData>) -> Json<ValidationReport> {
    Json(validate(&data))
}

/// POST /api/v1/resume/export/:format
/// One-shot download: validates, generates and returns the artifact.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(query): Query<ExportQuery>,
    Json(data): Json<ResumeData>,
) -> Result<Response, AppError> {
    let format = format
        .parse::<ArtifactFormat>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = validate(&data);
    if !report.is_valid {
        return Err(AppError::Validation(report.joined()));
    }

    let template = format.resolve_template(query.template.unwrap_or_default());
    let artifact = state
        .generator
        .generate(Arc::new(data), template, format)
        .await?;
    info!(
        "Generated {} ({} bytes) as {format}",
        artifact.file_name,
        artifact.size()
    );

    Ok(file_response(
        artifact.bytes,
        &artifact.file_name,
        format.mime_type(),
        Disposition::Attachment,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::routes::test_support::test_state;

    fn ana() -> Value {
        json!({
            "name": "Ana",
            "surname": "Ruiz",
            "title": "Backend Developer",
            "age": 29,
            "skills": [],
            "experiences": [
                {"cargo": "Dev", "empresa": "Acme", "fechaInicio": "2020", "fechaFin": "2023"}
            ]
        })
    }

    async fn post(uri: &str, body: Value) -> axum::response::Response {
        let (state, _dir) = test_state();
        build_router(state)
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validate_reports_all_errors() {
        let response = post("/api/v1/resume/validate", json!({"age": 12})).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["isValid"], false);
        assert!(body["errors"].as_array().unwrap().len() >= 4);
    }

    #[tokio::test]
    async fn test_export_pdf_attachment() {
        let response = post("/api/v1/resume/export/pdf?template=classic", ana()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Ana_Ruiz_CV_Classic.pdf"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_word_pins_template() {
        let response = post("/api/v1/resume/export/docx-modern?template=classic", ana()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Ana_Ruiz_CV_Modern.docx"));
    }

    #[tokio::test]
    async fn test_export_blocked_by_validation() {
        let response = post("/api/v1/resume/export/pdf", json!({"name": "Ana"})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "The surname is required; The professional title is required"
        );
    }

    #[tokio::test]
    async fn test_export_unknown_format() {
        let response = post("/api/v1/resume/export/odt", ana()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
