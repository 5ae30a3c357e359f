//! Booking status notifications.
//!
//! The engine calls the configured [`Notifier`] after a status transition has
//! been committed. Delivery is fire-and-forget: a failure is logged and never
//! rolls back or fails the transition.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{Booking, BookingStatus};

#[derive(Error, Debug)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Payload describing a committed booking status change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookingStatusChanged {
    pub booking: Booking,
    pub status: BookingStatus,
    pub property_title: String,
    pub guest_email: String,
    pub owner_email: String,
}

impl BookingStatusChanged {
    pub fn recipients(&self) -> [&str; 2] {
        [self.guest_email.as_str(), self.owner_email.as_str()]
    }

    pub fn subject(&self) -> String {
        format!("Booking {}: {}", self.status.as_str(), self.property_title)
    }

    pub fn text(&self) -> String {
        format!(
            "Booking #{} for {} has been {}.\nCheck-in: {}\nCheck-out: {}\nTotal: {}",
            self.booking.id,
            self.property_title,
            self.status.as_str(),
            self.booking.check_in_date,
            self.booking.check_out_date,
            self.booking.total_price,
        )
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &BookingStatusChanged) -> Result<(), NotifyError>;
}

/// Default notifier: writes the event to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &BookingStatusChanged) -> Result<(), NotifyError> {
        tracing::info!(
            booking_id = %event.booking.id,
            status = event.status.as_str(),
            to = ?event.recipients(),
            "{}",
            event.subject()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::{DateRange, MoneyCents};

    fn event(status: BookingStatus) -> BookingStatusChanged {
        let stay = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        )
        .unwrap();
        let mut booking = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            stay,
            MoneyCents::new(48_050),
            Utc::now(),
        );
        booking.status = status;
        BookingStatusChanged {
            booking,
            status,
            property_title: "Harbour loft".to_string(),
            guest_email: "guest@example.com".to_string(),
            owner_email: "agent@example.com".to_string(),
        }
    }

    #[test]
    fn subject_names_status_and_property() {
        assert_eq!(
            event(BookingStatus::Confirmed).subject(),
            "Booking confirmed: Harbour loft"
        );
        assert_eq!(
            event(BookingStatus::Cancelled).subject(),
            "Booking cancelled: Harbour loft"
        );
    }

    #[test]
    fn text_contains_dates_and_total() {
        let text = event(BookingStatus::Confirmed).text();
        assert!(text.contains("has been confirmed."));
        assert!(text.contains("Check-in: 2024-03-01"));
        assert!(text.contains("Check-out: 2024-03-05"));
        assert!(text.contains("Total: 480.50"));
    }

    #[test]
    fn both_parties_are_recipients() {
        assert_eq!(
            event(BookingStatus::Confirmed).recipients(),
            ["guest@example.com", "agent@example.com"]
        );
    }
}
