//! Restore engine - materializes new rows from backups.
//!
//! Restoring never overwrites a live row. A booking payload becomes a brand-new booking
//! with a freshly minted booking number and fresh timestamps; a tour payload becomes a
//! brand-new tour. Only an explicit allow-list of construction fields is read from a
//! payload, so identity and audit fields (`id`, `booking_number`, timestamps) and any
//! unknown keys are ignored.
//!
//! A backup's booking payload can be restored once. The claim is a conditional update
//! on `restored_at`, so when two callers race for the same backup exactly one of them
//! inserts a booking and the other gets [`Error::AlreadyRestored`].

use crate::{
    core::{backup::get_backup, booking::mint_booking_number},
    entities::{
        BookingBackup, Tour, booking,
        booking::BookingStatus,
        booking_backup::{self, BackupType},
        tour::{self, StringList},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Booking fields read back from a snapshot
#[derive(Debug, Deserialize)]
struct RestorableBooking {
    tour_id: i64,
    name: String,
    email: String,
    phone: String,
    booking_date: NaiveDate,
    adults: i32,
    #[serde(default)]
    children: i32,
    #[serde(default)]
    special_requests: Option<String>,
    total_amount: Decimal,
    status: BookingStatus,
    #[serde(default)]
    confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    cancellation_reason: Option<String>,
}

/// Tour fields read back from a snapshot
#[derive(Debug, Deserialize)]
struct RestorableTour {
    title: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    location: String,
    duration: String,
    #[serde(default)]
    images: Option<StringList>,
    #[serde(default)]
    tour_type: Option<String>,
    #[serde(default)]
    max_group_size: Option<i32>,
    #[serde(default)]
    itinerary: Option<Json>,
    #[serde(default)]
    highlights: Option<StringList>,
    #[serde(default)]
    included: Option<StringList>,
    #[serde(default)]
    excluded: Option<StringList>,
    #[serde(default)]
    countries: Option<StringList>,
    #[serde(default)]
    languages: Option<StringList>,
    #[serde(default)]
    is_featured: bool,
    #[serde(default = "active_by_default")]
    is_active: bool,
}

const fn active_by_default() -> bool {
    true
}

/// Outcome of [`restore_backup`]
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    /// The backup as it stands after the restore
    pub backup: booking_backup::Model,
    /// Booking created from the booking payload
    pub restored_booking: Option<booking::Model>,
    /// Tour created from the tour payload
    pub restored_tour: Option<tour::Model>,
}

/// Recreates the booking captured in `backup` as a new row and marks the backup restored.
///
/// Must run inside the caller's transaction: the claim on `restored_at` and the insert
/// commit or roll back together.
///
/// # Errors
/// * `AlreadyRestored` if the backup was restored before, including by a concurrent caller
/// * `MissingSnapshotData` if the backup carries no booking payload
/// * `NotFound` if the booking's tour row no longer exists
pub async fn restore_booking<C>(conn: &C, backup: &booking_backup::Model) -> Result<booking::Model>
where
    C: ConnectionTrait,
{
    if backup.is_restored() {
        return Err(Error::AlreadyRestored { id: backup.id });
    }
    let payload = backup
        .booking_data
        .clone()
        .ok_or(Error::MissingSnapshotData { id: backup.id })?;
    let data: RestorableBooking = serde_json::from_value(payload)?;

    if Tour::find_by_id(data.tour_id).one(conn).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Tour",
            id: data.tour_id,
        });
    }

    let now = Utc::now();
    let claimed = BookingBackup::update_many()
        .set(booking_backup::ActiveModel {
            restored_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        })
        .filter(booking_backup::Column::Id.eq(backup.id))
        .filter(booking_backup::Column::RestoredAt.is_null())
        .exec(conn)
        .await?;
    if claimed.rows_affected == 0 {
        return Err(Error::AlreadyRestored { id: backup.id });
    }

    let booking = booking::ActiveModel {
        tour_id: Set(data.tour_id),
        booking_number: Set(mint_booking_number(conn, now).await?),
        name: Set(data.name),
        email: Set(data.email),
        phone: Set(data.phone),
        booking_date: Set(data.booking_date),
        adults: Set(data.adults),
        children: Set(data.children),
        special_requests: Set(data.special_requests),
        total_amount: Set(data.total_amount),
        status: Set(data.status),
        confirmed_at: Set(data.confirmed_at),
        cancelled_at: Set(data.cancelled_at),
        cancellation_reason: Set(data.cancellation_reason),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    let booking = booking.insert(conn).await?;

    info!(
        backup_id = backup.id,
        booking_id = booking.id,
        booking_number = %booking.booking_number,
        "Booking restored from backup"
    );
    Ok(booking)
}

/// Resolves the tour side of `backup`.
///
/// While the backup still links to a tour, the live (non-deleted) tour is returned as is
/// and nothing is created. Once the link is gone, the tour payload is inserted as a new
/// tour with no reviews yet. `restored_at` is never touched here.
pub async fn restore_tour<C>(conn: &C, backup: &booking_backup::Model) -> Result<Option<tour::Model>>
where
    C: ConnectionTrait,
{
    let payload = match (&backup.tour_data, backup.tour_id) {
        (Some(payload), None) => payload.clone(),
        (_, Some(tour_id)) => {
            return Ok(Tour::find_by_id(tour_id)
                .filter(tour::Column::DeletedAt.is_null())
                .one(conn)
                .await?);
        }
        (None, None) => return Ok(None),
    };
    let data: RestorableTour = serde_json::from_value(payload)?;

    let now = Utc::now();
    let tour = tour::ActiveModel {
        title: Set(data.title),
        description: Set(data.description),
        price: Set(data.price),
        location: Set(data.location),
        duration: Set(data.duration),
        images: Set(data.images),
        tour_type: Set(data.tour_type),
        max_group_size: Set(data.max_group_size),
        rating: Set(Decimal::ZERO),
        reviews_count: Set(0),
        itinerary: Set(data.itinerary),
        highlights: Set(data.highlights),
        included: Set(data.included),
        excluded: Set(data.excluded),
        countries: Set(data.countries),
        languages: Set(data.languages),
        is_featured: Set(data.is_featured),
        is_active: Set(data.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };
    let tour = tour.insert(conn).await?;

    info!(backup_id = backup.id, tour_id = tour.id, "Tour restored from backup");
    Ok(Some(tour))
}

/// Restores whatever `backup_id` carries, in a single transaction.
///
/// The booking payload is restored when present. The tour payload is restored when the
/// backup is a tour backup whose tour link is gone. Any failure rolls back every write.
///
/// # Errors
/// * `NotFound` if the backup does not exist
/// * `AlreadyRestored` if the backup was restored before
/// * `MissingSnapshotData` if there is nothing to restore
pub async fn restore_backup(db: &DatabaseConnection, backup_id: i64) -> Result<RestoreOutcome> {
    let txn = db.begin().await?;

    let backup = get_backup(&txn, backup_id).await?;
    if backup.is_restored() {
        warn!(backup_id, "Rejected restore of an already restored backup");
        return Err(Error::AlreadyRestored { id: backup_id });
    }

    let restores_tour = backup.backup_type == BackupType::Tour
        && backup.tour_data.is_some()
        && backup.tour_id.is_none();
    if backup.booking_data.is_none() && !restores_tour {
        warn!(backup_id, "Rejected restore of a backup without restorable data");
        return Err(Error::MissingSnapshotData { id: backup_id });
    }

    let restored_booking = match &backup.booking_data {
        Some(_) => Some(
            restore_booking(&txn, &backup)
                .await
                .inspect_err(|e| warn!(backup_id, "Booking restore failed: {e}"))?,
        ),
        None => None,
    };
    let restored_tour = if restores_tour {
        restore_tour(&txn, &backup).await?
    } else {
        None
    };

    let backup = get_backup(&txn, backup_id).await?;
    txn.commit().await?;

    Ok(RestoreOutcome {
        backup,
        restored_booking,
        restored_tour,
    })
}
