//! Webhook delivery of booking status changes.

use std::time::Duration;

use async_trait::async_trait;
use engine::{Booking, BookingStatus, BookingStatusChanged, Notifier, NotifyError};
use reqwest::Client;
use serde::Serialize;

/// POSTs every committed status change as JSON to a fixed URL.
///
/// A single attempt is made per event; non-2xx answers count as failures.
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    event: &'static str,
    status: BookingStatus,
    subject: String,
    text: String,
    recipients: [&'a str; 2],
    booking: &'a Booking,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NotifyError(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &BookingStatusChanged) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            event: "booking.status_changed",
            status: event.status,
            subject: event.subject(),
            text: event.text(),
            recipients: event.recipients(),
            booking: &event.booking,
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| NotifyError(err.to_string()))?;

        tracing::debug!(booking_id = %event.booking.id, url = %self.url, "webhook delivered");
        Ok(())
    }
}
