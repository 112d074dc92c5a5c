use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::registration::Registration;
use crate::notify::{prepare, City, NotificationTemplate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegistrationAccepted {
    pub city: City,
    pub template: NotificationTemplate,
}

/// POST /api/v1/registrations
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<Registration>,
) -> Result<(StatusCode, Json<RegistrationAccepted>), AppError> {
    let notification = prepare(&req)?;
    state.notifier.dispatch(&notification).await?;
    info!(
        "Registration notification sent ({:?}, {})",
        notification.template, notification.city
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(RegistrationAccepted {
            city: notification.city,
            template: notification.template,
        }),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
