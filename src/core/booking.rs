//! Booking lifecycle: create, read, update and soft-delete.
//!
//! Every mutation snapshots the booking inside its own transaction (see
//! [`crate::core::policy`]). Creation snapshots right after the insert; update and delete
//! snapshot the pre-mutation state before writing. A failed snapshot aborts the mutation.

use crate::{
    core::{
        backup::snapshot_booking,
        notify::{DeliveryMode, Notifier},
        pagination::{Page, PageRequest, fetch_page},
        policy::BookingMutation,
        validate,
    },
    entities::{
        Booking, Tour,
        booking::{self, BookingStatus},
        tour,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use rand::{Rng, distributions::Alphanumeric};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Children are charged this share of the adult price (0.5).
pub const CHILD_PRICE_RATIO: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

const BOOKING_NUMBER_PREFIX: &str = "BK";
const BOOKING_NUMBER_SUFFIX_LEN: usize = 6;
const BOOKING_NUMBER_ATTEMPTS: usize = 5;

/// Input for [`create_booking`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    /// Tour being booked
    pub tour_id: i64,
    /// Customer name
    pub name: String,
    /// Customer email
    pub email: String,
    /// Customer phone
    pub phone: String,
    /// Day of the tour, today or later
    pub booking_date: NaiveDate,
    /// Number of adults, at least one
    pub adults: i32,
    /// Number of children, defaults to zero
    #[serde(default)]
    pub children: Option<i32>,
    /// Free-text special request
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// Partial update for [`update_booking`]; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingChanges {
    /// New customer name
    pub name: Option<String>,
    /// New customer email
    pub email: Option<String>,
    /// New customer phone
    pub phone: Option<String>,
    /// New tour date, today or later
    pub booking_date: Option<NaiveDate>,
    /// New adult count; triggers a price recalculation
    pub adults: Option<i32>,
    /// New child count; triggers a price recalculation
    pub children: Option<i32>,
    /// New special request, blank clears it
    pub special_requests: Option<String>,
    /// New lifecycle status
    pub status: Option<BookingStatus>,
    /// Why the booking was cancelled
    pub cancellation_reason: Option<String>,
}

/// Filters for [`list_bookings`]
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Only bookings with this status
    pub status: Option<BookingStatus>,
    /// Only bookings on this tour
    pub tour_id: Option<i64>,
    /// Only bookings by this customer email
    pub email: Option<String>,
}

/// Result of [`create_booking`]
#[derive(Debug, Clone, Serialize)]
pub struct BookingCreated {
    /// The stored booking
    pub booking: booking::Model,
    /// The booked tour
    pub tour: tour::Model,
    /// Whether the confirmation reached the notifier
    pub notification_sent: bool,
}

/// `price * adults + price * CHILD_PRICE_RATIO * children`, rounded to cents.
#[must_use]
pub fn calculate_total_amount(price: Decimal, adults: i32, children: i32) -> Decimal {
    let adult_total = price * Decimal::from(adults);
    let child_total = price * CHILD_PRICE_RATIO * Decimal::from(children);
    validate::round_cents(adult_total + child_total)
}

fn candidate_booking_number(date: NaiveDate) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOOKING_NUMBER_SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect();
    format!("{BOOKING_NUMBER_PREFIX}{}{suffix}", date.format("%Y%m%d"))
}

/// Mints an unused booking number of the form `BK` + `YYYYMMDD` + 6 uppercase
/// alphanumerics.
///
/// # Errors
/// Fails if every attempt collided with an existing number.
pub async fn mint_booking_number<C>(conn: &C, now: DateTime<Utc>) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..BOOKING_NUMBER_ATTEMPTS {
        let candidate = candidate_booking_number(now.date_naive());
        let taken = Booking::find()
            .filter(booking::Column::BookingNumber.eq(candidate.as_str()))
            .one(conn)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
        warn!(booking_number = %candidate, "Booking number collision, retrying");
    }
    Err(Error::Database(DbErr::Custom(format!(
        "no free booking number after {BOOKING_NUMBER_ATTEMPTS} attempts"
    ))))
}

async fn find_live_booking<C>(conn: &C, booking_id: i64) -> Result<booking::Model>
where
    C: ConnectionTrait,
{
    Booking::find_by_id(booking_id)
        .filter(booking::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Booking",
            id: booking_id,
        })
}

fn ensure_not_past(date: NaiveDate) -> Result<NaiveDate> {
    if date < Utc::now().date_naive() {
        return Err(Error::validation("booking_date must be today or later"));
    }
    Ok(date)
}

/// Creates a confirmed booking, snapshots it, and sends the confirmation.
///
/// The booking and its `new_booking` snapshot commit together. The confirmation is
/// sent afterwards and a delivery failure only shows up as
/// `notification_sent == false`.
///
/// # Errors
/// Returns a validation error for malformed input or a past date, and `NotFound` if the
/// tour does not exist or was deleted.
pub async fn create_booking(
    db: &DatabaseConnection,
    notifier: &dyn Notifier,
    mode: DeliveryMode,
    input: NewBooking,
) -> Result<BookingCreated> {
    let name = validate::required_text("name", &input.name)?;
    let email = validate::email(&input.email)?;
    let phone = validate::required_text("phone", &input.phone)?;
    let booking_date = ensure_not_past(input.booking_date)?;
    let adults = validate::at_least("adults", input.adults, 1)?;
    let children = validate::at_least("children", input.children.unwrap_or(0), 0)?;
    let special_requests = validate::optional_long_text(input.special_requests);

    let txn = db.begin().await?;
    let tour = Tour::find_by_id(input.tour_id)
        .filter(tour::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "Tour",
            id: input.tour_id,
        })?;

    let now = Utc::now();
    let booking = booking::ActiveModel {
        tour_id: Set(tour.id),
        booking_number: Set(mint_booking_number(&txn, now).await?),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        booking_date: Set(booking_date),
        adults: Set(adults),
        children: Set(children),
        special_requests: Set(special_requests),
        total_amount: Set(calculate_total_amount(tour.price, adults, children)),
        status: Set(BookingStatus::Confirmed),
        confirmed_at: Set(Some(now)),
        cancelled_at: Set(None),
        cancellation_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    let booking = booking.insert(&txn).await?;
    snapshot_booking(&txn, &booking, &BookingMutation::Created.backup_reason()).await?;
    txn.commit().await?;

    info!(
        booking_id = booking.id,
        booking_number = %booking.booking_number,
        tour_id = tour.id,
        total = %booking.total_amount,
        "Booking created"
    );

    let notification_sent = match notifier.send_booking_confirmation(&booking, &tour, mode).await {
        Ok(()) => true,
        Err(e) => {
            error!(booking_id = booking.id, "Failed to send booking confirmation: {e}");
            false
        }
    };

    Ok(BookingCreated {
        booking,
        tour,
        notification_sent,
    })
}

/// Finds a non-deleted booking by ID.
pub async fn get_booking(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    find_live_booking(db, booking_id).await
}

/// Finds a non-deleted booking together with its tour, deleted tours included.
pub async fn get_booking_with_tour(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<(booking::Model, Option<tour::Model>)> {
    let booking = find_live_booking(db, booking_id).await?;
    let tour = booking.find_related(Tour).one(db).await?;
    Ok((booking, tour))
}

/// Lists non-deleted bookings matching `filter`, newest first.
pub async fn list_bookings(
    db: &DatabaseConnection,
    filter: &BookingFilter,
    request: PageRequest,
) -> Result<Page<booking::Model>> {
    let mut query = Booking::find().filter(booking::Column::DeletedAt.is_null());
    if let Some(status) = filter.status {
        query = query.filter(booking::Column::Status.eq(status));
    }
    if let Some(tour_id) = filter.tour_id {
        query = query.filter(booking::Column::TourId.eq(tour_id));
    }
    if let Some(email) = &filter.email {
        query = query.filter(booking::Column::Email.eq(email.trim()));
    }

    let query = query
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id);
    fetch_page(db, query, request).await
}

/// Applies `changes` to a booking after snapshotting its current state.
///
/// Changing `adults` or `children` recomputes `total_amount` from the tour's current
/// price. Moving to `confirmed` or `cancelled` stamps the matching timestamp.
///
/// # Errors
/// Returns `NotFound` if the booking does not exist or was deleted, and a validation
/// error for malformed changes.
pub async fn update_booking(
    db: &DatabaseConnection,
    booking_id: i64,
    changes: BookingChanges,
) -> Result<booking::Model> {
    let txn = db.begin().await?;
    let existing = find_live_booking(&txn, booking_id).await?;
    snapshot_booking(&txn, &existing, &BookingMutation::Updated.backup_reason()).await?;

    let now = Utc::now();
    let mut booking: booking::ActiveModel = existing.clone().into();

    if let Some(name) = changes.name {
        booking.name = Set(validate::required_text("name", &name)?);
    }
    if let Some(email) = changes.email {
        booking.email = Set(validate::email(&email)?);
    }
    if let Some(phone) = changes.phone {
        booking.phone = Set(validate::required_text("phone", &phone)?);
    }
    if let Some(date) = changes.booking_date {
        booking.booking_date = Set(ensure_not_past(date)?);
    }
    if let Some(special_requests) = changes.special_requests {
        booking.special_requests = Set(validate::optional_long_text(Some(special_requests)));
    }
    if let Some(reason) = changes.cancellation_reason {
        booking.cancellation_reason = Set(validate::optional_long_text(Some(reason)));
    }

    if changes.adults.is_some() || changes.children.is_some() {
        let adults = validate::at_least("adults", changes.adults.unwrap_or(existing.adults), 1)?;
        let children =
            validate::at_least("children", changes.children.unwrap_or(existing.children), 0)?;
        let tour = Tour::find_by_id(existing.tour_id)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound {
                entity: "Tour",
                id: existing.tour_id,
            })?;
        booking.adults = Set(adults);
        booking.children = Set(children);
        booking.total_amount = Set(calculate_total_amount(tour.price, adults, children));
    }

    if let Some(status) = changes.status {
        if status != existing.status {
            match status {
                BookingStatus::Confirmed => booking.confirmed_at = Set(Some(now)),
                BookingStatus::Cancelled => booking.cancelled_at = Set(Some(now)),
                BookingStatus::Pending | BookingStatus::Completed => {}
            }
        }
        booking.status = Set(status);
    }
    booking.updated_at = Set(now);

    let booking = booking.update(&txn).await?;
    txn.commit().await?;

    info!(booking_id, status = booking.status.as_str(), "Booking updated");
    Ok(booking)
}

/// Soft-deletes a booking after snapshotting it.
pub async fn delete_booking(db: &DatabaseConnection, booking_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = find_live_booking(&txn, booking_id).await?;
    snapshot_booking(&txn, &existing, &BookingMutation::Deleted.backup_reason()).await?;

    let now = Utc::now();
    let mut booking: booking::ActiveModel = existing.into();
    booking.deleted_at = Set(Some(now));
    booking.updated_at = Set(now);
    booking.update(&txn).await?;
    txn.commit().await?;

    info!(booking_id, "Booking soft-deleted");
    Ok(())
}
