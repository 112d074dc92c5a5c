use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{Notification, Notifier, NotifyError};

/// Total POSTs per notification, the first one included.
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts notifications as JSON to a webhook.
/// Transport failures, 429 and 5xx are transient; other statuses end delivery.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    backoff: Duration,
}

/// Outcome of a single POST.
enum Attempt {
    Delivered,
    Transient(NotifyError),
    Rejected(NotifyError),
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            url: url.into(),
            backoff: Duration::from_secs(1),
        })
    }

    /// Delay before the second attempt; doubled before each later one.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn post_once(&self, notification: &Notification) -> Attempt {
        let response = match self.client.post(&self.url).json(notification).send().await {
            Ok(r) => r,
            Err(e) => return Attempt::Transient(NotifyError::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Delivered;
        }

        let error = NotifyError::Api {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        };
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Attempt::Transient(error)
        } else {
            Attempt::Rejected(error)
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn dispatch(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            let last = match self.post_once(notification).await {
                Attempt::Delivered => {
                    debug!("Notification delivered to {} (attempt {attempt})", notification.to);
                    return Ok(());
                }
                Attempt::Rejected(e) => return Err(e),
                Attempt::Transient(e) => e,
            };

            if attempt == MAX_ATTEMPTS {
                return Err(NotifyError::Unavailable {
                    attempts: attempt,
                    last: last.to_string(),
                });
            }
            warn!(
                "Webhook attempt {attempt}/{MAX_ATTEMPTS} failed ({last}), next in {}ms",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
            attempt += 1;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;

    use super::*;
    use crate::models::registration::Registration;
    use crate::notify::prepare;

    /// Local webhook answering with `statuses` in order, then 200.
    async fn spawn_webhook(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let statuses = Arc::new(statuses);
        let app = Router::new()
            .route(
                "/hook",
                post(
                    |State((hits, statuses)): State<(Arc<AtomicUsize>, Arc<Vec<u16>>)>,
                     Json(body): Json<Value>| async move {
                        assert!(body["subject"].is_string());
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        let code = statuses.get(n).copied().unwrap_or(200);
                        StatusCode::from_u16(code).unwrap()
                    },
                ),
            )
            .with_state((hits.clone(), statuses));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/hook"), hits)
    }

    fn notification() -> Notification {
        prepare(&Registration {
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            city: "Madrid".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let (url, hits) = spawn_webhook(vec![503, 429]).await;
        let notifier = WebhookNotifier::new(url)
            .unwrap()
            .with_backoff(Duration::from_millis(1));
        notifier.dispatch(&notification()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, hits) = spawn_webhook(vec![400]).await;
        let notifier = WebhookNotifier::new(url)
            .unwrap()
            .with_backoff(Duration::from_millis(1));
        let err = notifier.dispatch(&notification()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Api { status: 400, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (url, hits) = spawn_webhook(vec![500, 500, 500, 500]).await;
        let notifier = WebhookNotifier::new(url)
            .unwrap()
            .with_backoff(Duration::from_millis(1));
        let err = notifier.dispatch(&notification()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Unavailable { attempts: 3, .. }));
        assert!(err.to_string().starts_with("Webhook unavailable after 3 attempts"));
        assert!(!err.is_client_error());
        assert_eq!(hits.load(Ordering::SeqCst), MAX_ATTEMPTS as usize);
    }
}
