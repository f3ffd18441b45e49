//! Booking confirmation delivery.
//!
//! The booking service hands every freshly created booking to a [`Notifier`]. Delivery
//! is best effort: a failure is logged and reported back to the caller, but never undoes
//! the booking. The delivery mode is an explicit argument rather than process-wide state.
//!
//! No mail transport ships with the crate. [`TracingNotifier`], the only production
//! implementation, renders the message and writes it to the log, so
//! `notification_sent == true` means the notifier accepted the message, not that an
//! email reached the customer. [`DeliveryMode::Queued`] only changes the log line.

use crate::{
    entities::{booking, tour},
    errors::Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// How a confirmation should be handed to the transport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Send before the request returns
    #[default]
    Immediate,
    /// Hand off to a background queue
    Queued,
}

/// A rendered confirmation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Outbound channel for booking confirmations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers the confirmation for `booking` on `tour`.
    async fn send_booking_confirmation(
        &self,
        booking: &booking::Model,
        tour: &tour::Model,
        mode: DeliveryMode,
    ) -> Result<()>;
}

/// Renders the confirmation message sent to the customer.
#[must_use]
pub fn render_confirmation(
    booking: &booking::Model,
    tour: &tour::Model,
    support_email: &str,
) -> ConfirmationMessage {
    let mut lines = vec![
        format!("Hello {}!", booking.name),
        format!(
            "Thank you for booking with us! We're excited to have you join our {} tour.",
            tour.title
        ),
        String::new(),
        "Booking Details".to_string(),
        format!("Tour: {}", tour.title),
        format!("Booking Reference: {}", booking.booking_number),
        format!("Date: {}", booking.booking_date.format("%B %-d, %Y")),
        format!(
            "Number of Guests: {} ({} Adults, {} Children)",
            booking.adults + booking.children,
            booking.adults,
            booking.children
        ),
        format!("Total Amount: ${:.2}", booking.total_amount),
    ];
    if let Some(requests) = &booking.special_requests {
        lines.push(String::new());
        lines.push("Special Requests".to_string());
        lines.push(requests.clone());
    }
    lines.push(String::new());
    lines.push(format!(
        "If you have any questions or need to make changes to your booking, please contact {support_email}."
    ));

    ConfirmationMessage {
        to: booking.email.clone(),
        subject: format!(
            "Booking Confirmed: {} - {}",
            tour.title, booking.booking_number
        ),
        body: lines.join("\n"),
    }
}

/// Notifier that renders the confirmation and records it through `tracing`.
///
/// Nothing is sent over the network.
#[derive(Debug, Clone)]
pub struct TracingNotifier {
    support_email: String,
}

impl TracingNotifier {
    /// Creates a notifier that points customers at `support_email`.
    #[must_use]
    pub fn new(support_email: impl Into<String>) -> Self {
        Self {
            support_email: support_email.into(),
        }
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_booking_confirmation(
        &self,
        booking: &booking::Model,
        tour: &tour::Model,
        mode: DeliveryMode,
    ) -> Result<()> {
        let message = render_confirmation(booking, tour, &self.support_email);
        match mode {
            DeliveryMode::Immediate => info!(
                to = %message.to,
                subject = %message.subject,
                booking_id = booking.id,
                "Booking confirmation sent"
            ),
            DeliveryMode::Queued => info!(
                to = %message.to,
                subject = %message.subject,
                booking_id = booking.id,
                "Booking confirmation queued"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{sample_booking_model, sample_tour_model};

    #[test]
    fn test_render_confirmation() {
        let tour = sample_tour_model();
        let booking = sample_booking_model(&tour);

        let message = render_confirmation(&booking, &tour, "help@tours.test");
        assert_eq!(message.to, booking.email);
        assert_eq!(
            message.subject,
            format!("Booking Confirmed: {} - {}", tour.title, booking.booking_number)
        );
        assert!(message.body.contains("Hello Jane Doe!"));
        assert!(message.body.contains("Number of Guests: 3 (2 Adults, 1 Children)"));
        assert!(message.body.contains("Total Amount: $250.00"));
        assert!(message.body.contains("help@tours.test"));
        assert!(!message.body.contains("Special Requests"));
    }

    #[test]
    fn test_render_includes_special_requests() {
        let tour = sample_tour_model();
        let mut booking = sample_booking_model(&tour);
        booking.special_requests = Some("Vegetarian lunch".to_string());

        let message = render_confirmation(&booking, &tour, "help@tours.test");
        assert!(message.body.contains("Special Requests\nVegetarian lunch"));
    }

    #[tokio::test]
    async fn test_tracing_notifier_succeeds_in_both_modes() -> Result<()> {
        let tour = sample_tour_model();
        let booking = sample_booking_model(&tour);
        let notifier = TracingNotifier::new("help@tours.test");

        notifier
            .send_booking_confirmation(&booking, &tour, DeliveryMode::Immediate)
            .await?;
        notifier
            .send_booking_confirmation(&booking, &tour, DeliveryMode::Queued)
            .await?;
        Ok(())
    }
}
