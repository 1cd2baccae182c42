use crate::domain::models::member::Member;
use crate::domain::models::notification::{BatchConfirmation, ReleaseConfirmation};
use crate::domain::ports::Notifier;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Posts reservation notifications to the club's mail gateway. Delivery is
/// best-effort; callers log failures and keep the committed booking.
pub struct HttpNotifier {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotifier {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }

    async fn post(&self, payload: &NotificationPayload) -> Result<(), AppError> {
        let res = self.client.post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Notification service connection error: {}", e);
                error!("{}", msg);
                AppError::Notify(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Notification service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Notify(msg));
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct NotificationPayload {
    kind: String,
    to_addr: String,
    recipient_name: String,
    details: Value,
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_batch_confirmation(&self, member: &Member, details: &BatchConfirmation) -> Result<(), AppError> {
        let payload = NotificationPayload {
            kind: "BATCH_CONFIRMATION".to_string(),
            to_addr: member.email.clone(),
            recipient_name: member.name.clone(),
            details: serde_json::to_value(details).map_err(|e| AppError::Notify(e.to_string()))?,
        };
        self.post(&payload).await
    }

    async fn send_release_confirmation(&self, member: &Member, details: &ReleaseConfirmation) -> Result<(), AppError> {
        let payload = NotificationPayload {
            kind: "RELEASE_CONFIRMATION".to_string(),
            to_addr: member.email.clone(),
            recipient_name: member.name.clone(),
            details: serde_json::to_value(details).map_err(|e| AppError::Notify(e.to_string()))?,
        };
        self.post(&payload).await
    }
}
