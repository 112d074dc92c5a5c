//! Registration notifier: turns a sign-up into one of two fixed messages,
//! chosen by exact city match, and hands it to a delivery backend.

pub mod handlers;
mod webhook;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::registration::Registration;

pub use webhook::WebhookNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Unknown city '{0}' (expected Madrid, Barcelona or Valencia)")]
    UnknownCity(String),

    #[error("The {0} is required")]
    MissingField(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Webhook unavailable after {attempts} attempts: {last}")]
    Unavailable { attempts: u32, last: String },
}

impl NotifyError {
    /// Rejections caused by the request itself, as opposed to delivery.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NotifyError::UnknownCity(_) | NotifyError::MissingField(_) | NotifyError::InvalidEmail(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum City {
    Madrid,
    Barcelona,
    Valencia,
}

impl City {
    pub fn as_str(self) -> &'static str {
        match self {
            City::Madrid => "Madrid",
            City::Barcelona => "Barcelona",
            City::Valencia => "Valencia",
        }
    }

    pub fn template(self) -> NotificationTemplate {
        match self {
            City::Madrid => NotificationTemplate::Capital,
            City::Barcelona | City::Valencia => NotificationTemplate::Regional,
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match.
impl FromStr for City {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Madrid" => Ok(City::Madrid),
            "Barcelona" => Ok(City::Barcelona),
            "Valencia" => Ok(City::Valencia),
            other => Err(NotifyError::UnknownCity(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationTemplate {
    Capital,
    Regional,
}

/// Message ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub to: String,
    pub city: City,
    pub template: NotificationTemplate,
    pub subject: String,
    pub body: String,
}

/// Checks the registration and renders its message. Nothing is dispatched
/// when this fails.
pub fn prepare(registration: &Registration) -> Result<Notification, NotifyError> {
    let email = registration.email.trim();
    let name = registration.name.trim();
    if email.is_empty() {
        return Err(NotifyError::MissingField("email"));
    }
    if name.is_empty() {
        return Err(NotifyError::MissingField("name"));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(NotifyError::InvalidEmail(email.to_string()));
    }
    let city: City = registration.city.parse()?;
    let template = city.template();

    let (subject, body) = match template {
        NotificationTemplate::Capital => (
            "Bienvenido/a a la sede central".to_string(),
            format!(
                "Hola {name},\n\nGracias por registrarte. Te esperamos en nuestra sede central de {city}."
            ),
        ),
        NotificationTemplate::Regional => (
            format!("Bienvenido/a a la oficina de {city}"),
            format!(
                "Hola {name},\n\nGracias por registrarte. Nuestra oficina de {city} se pondrá en contacto contigo."
            ),
        ),
    };

    Ok(Notification {
        to: email.to_string(),
        city,
        template,
        subject,
        body,
    })
}

/// Delivery backend.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Logs notifications instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            to = %notification.to,
            city = %notification.city,
            "Registration notification: {}",
            notification.subject
        );
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(city: &str) -> Registration {
        Registration {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            city: city.to_string(),
        }
    }

    #[test]
    fn test_city_selects_template() {
        assert_eq!(
            prepare(&registration("Madrid")).unwrap().template,
            NotificationTemplate::Capital
        );
        for city in ["Barcelona", "Valencia"] {
            let n = prepare(&registration(city)).unwrap();
            assert_eq!(n.template, NotificationTemplate::Regional);
            assert!(n.subject.contains(city));
        }
    }

    #[test]
    fn test_city_match_is_exact() {
        for city in ["Atlantis", "madrid", " Madrid", ""] {
            let err = prepare(&registration(city)).unwrap_err();
            assert!(matches!(err, NotifyError::UnknownCity(_)), "{city:?}");
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut r = registration("Madrid");
        r.name = "  ".to_string();
        assert!(matches!(prepare(&r), Err(NotifyError::MissingField("name"))));

        let mut r = registration("Madrid");
        r.email = "ana.example.com".to_string();
        assert!(matches!(prepare(&r), Err(NotifyError::InvalidEmail(_))));
    }

    #[test]
    fn test_body_greets_by_name() {
        let n = prepare(&registration("Valencia")).unwrap();
        assert_eq!(n.to, "ana@example.com");
        assert!(n.body.starts_with("Hola Ana,"));
    }
}
