//! Shared test utilities for `TourDesk`.
//!
//! Helpers for setting up in-memory databases, creating tours, bookings and reviews
//! with sensible defaults, and notifiers that record or fail deliveries.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        booking::{self as booking_service, NewBooking},
        contact::NewContactSubmission,
        notify::{DeliveryMode, Notifier},
        review::{self as review_service, NewReview},
        tour::{self as tour_service, NewTour},
    },
    entities::{
        booking::{self, BookingStatus},
        review, tour,
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use std::sync::{Arc, Mutex};

/// Routes `tracing` output through the test harness so it only shows for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Tour input with sensible defaults.
///
/// # Defaults
/// * `location`: "Arusha"
/// * `duration`: "3 days"
/// * active, not featured
pub fn new_tour_input(title: &str, price: impl Into<Decimal>) -> NewTour {
    NewTour {
        title: title.to_string(),
        description: Some(format!("{title} with a local guide")),
        price: price.into(),
        location: "Arusha".to_string(),
        duration: "3 days".to_string(),
        ..NewTour::default()
    }
}

/// Creates a test tour with sensible defaults.
pub async fn create_test_tour(
    db: &DatabaseConnection,
    title: &str,
    price: impl Into<Decimal>,
) -> Result<tour::Model> {
    tour_service::create_tour(db, new_tour_input(title, price)).await
}

/// Booking input for `tour_id` a week from today.
///
/// # Defaults
/// * `name`: "Jane Doe"
/// * `email`: "jane@example.com"
/// * `phone`: "+255 700 000 000"
pub fn new_booking_input(tour_id: i64, adults: i32, children: i32) -> NewBooking {
    NewBooking {
        tour_id,
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "+255 700 000 000".to_string(),
        booking_date: Utc::now().date_naive() + Duration::days(7),
        adults,
        children: Some(children),
        special_requests: None,
    }
}

/// Creates a test booking through the booking service (so it gets its `new_booking`
/// backup), discarding the confirmation.
pub async fn create_test_booking(
    db: &DatabaseConnection,
    tour_id: i64,
    adults: i32,
    children: i32,
) -> Result<booking::Model> {
    let created = booking_service::create_booking(
        db,
        &RecordingNotifier::default(),
        DeliveryMode::Immediate,
        new_booking_input(tour_id, adults, children),
    )
    .await?;
    Ok(created.booking)
}

/// Sets up a database with one tour priced 100 and one booking of 2 adults and 1 child.
/// Returns (db, tour, booking).
pub async fn setup_with_booking() -> Result<(DatabaseConnection, tour::Model, booking::Model)> {
    let db = setup_test_db().await?;
    let tour = create_test_tour(&db, "Serengeti Safari", 100).await?;
    let booking = create_test_booking(&db, tour.id, 2, 1).await?;
    Ok((db, tour, booking))
}

/// An unsaved tour model for pure rendering tests.
pub fn sample_tour_model() -> tour::Model {
    let created = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    tour::Model {
        id: 1,
        title: "Serengeti Safari".to_string(),
        description: None,
        price: Decimal::from(100),
        location: "Arusha".to_string(),
        duration: "3 days".to_string(),
        images: None,
        tour_type: Some("wildlife".to_string()),
        max_group_size: Some(12),
        rating: Decimal::new(45, 1),
        reviews_count: 10,
        itinerary: None,
        highlights: None,
        included: None,
        excluded: None,
        countries: None,
        languages: None,
        is_featured: true,
        is_active: true,
        created_at: created,
        updated_at: created,
        deleted_at: None,
    }
}

/// An unsaved booking of 2 adults and 1 child on `tour`, totalling 250.
pub fn sample_booking_model(tour: &tour::Model) -> booking::Model {
    let created = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
    booking::Model {
        id: 7,
        tour_id: tour.id,
        booking_number: "BK20260110ABC123".to_string(),
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "+255 700 000 000".to_string(),
        booking_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        adults: 2,
        children: 1,
        special_requests: None,
        total_amount: Decimal::from(250),
        status: BookingStatus::Confirmed,
        confirmed_at: Some(created),
        cancelled_at: None,
        cancellation_reason: None,
        created_at: created,
        updated_at: created,
        deleted_at: None,
    }
}

/// Review input for `tour_id` with the given star rating.
///
/// # Defaults
/// * `author`: "Sam Traveller"
/// * `email`: "sam@example.com"
/// * no booking, so not verified
pub fn new_review_input(tour_id: i64, rating: i32) -> NewReview {
    NewReview {
        tour_id,
        booking_id: None,
        author: "Sam Traveller".to_string(),
        email: "sam@example.com".to_string(),
        rating,
        comment: format!("Gave it {rating} stars, guides were great"),
    }
}

/// Creates a review through the review service so the tour rating is refreshed.
pub async fn create_test_review(
    db: &DatabaseConnection,
    tour_id: i64,
    rating: i32,
) -> Result<review::Model> {
    review_service::create_review(db, new_review_input(tour_id, rating)).await
}

/// Contact form input from Jane Doe.
pub fn new_contact_input(message: &str) -> NewContactSubmission {
    NewContactSubmission {
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        mobile_number: Some("+255 700 000 000".to_string()),
        message: message.to_string(),
    }
}

/// Notifier that remembers every delivery as `(booking_id, mode)`.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(i64, DeliveryMode)>>>,
}

impl RecordingNotifier {
    /// Deliveries so far, oldest first.
    pub fn sent(&self) -> Vec<(i64, DeliveryMode)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_booking_confirmation(
        &self,
        booking: &booking::Model,
        _tour: &tour::Model,
        mode: DeliveryMode,
    ) -> Result<()> {
        self.sent.lock().unwrap().push((booking.id, mode));
        Ok(())
    }
}

/// Notifier whose transport is always down.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_booking_confirmation(
        &self,
        _booking: &booking::Model,
        _tour: &tour::Model,
        _mode: DeliveryMode,
    ) -> Result<()> {
        Err(Error::Notification {
            message: "SMTP connection refused".to_string(),
        })
    }
}
