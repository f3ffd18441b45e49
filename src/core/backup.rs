//! Snapshot store - takes, lists, fetches and deletes booking/tour backups.
//!
//! A backup stores the *entire* serialized field set of the entity it covers, never a
//! diff and never a lazy reference, so it can be restored after the live row has
//! changed or disappeared. Booking backups also carry the parent tour's field set and
//! copy the customer's contact details into dedicated lookup columns.
//!
//! Taking a backup inserts exactly one row and mutates nothing else. The `snapshot_*`
//! functions are generic over [`ConnectionTrait`] so mutating operations can take their
//! backup inside their own transaction.

use crate::{
    core::{
        pagination::{Page, PageRequest, fetch_page},
        policy::{BackupReason, BookingMutation},
    },
    entities::{
        Booking, BookingBackup, Tour, booking,
        booking_backup::{self, BackupType},
        tour,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::{debug, info};

/// Filters for [`list_backups`]
#[derive(Debug, Clone, Default)]
pub struct BackupFilter {
    /// Only backups of this type
    pub backup_type: Option<BackupType>,
    /// Only backups of this booking
    pub booking_id: Option<i64>,
    /// Only backups referencing this tour
    pub tour_id: Option<i64>,
    /// Taken on or after this day (UTC)
    pub date_from: Option<NaiveDate>,
    /// Taken on or before this day (UTC)
    pub date_to: Option<NaiveDate>,
}

/// A backup together with the live rows it still links to
#[derive(Debug, Clone, Serialize)]
pub struct BackupDetails {
    /// The backup itself
    #[serde(flatten)]
    pub backup: booking_backup::Model,
    /// Linked booking, if the row still exists
    pub booking: Option<booking::Model>,
    /// Linked tour, if the row still exists
    pub tour: Option<tour::Model>,
}

/// Snapshots `booking` together with its parent tour.
///
/// The tour is looked up including soft-deleted rows; if the tour row is gone the
/// backup simply carries no tour payload and no tour link.
pub async fn snapshot_booking<C>(
    conn: &C,
    booking: &booking::Model,
    reason: &BackupReason,
) -> Result<booking_backup::Model>
where
    C: ConnectionTrait,
{
    let tour = Tour::find_by_id(booking.tour_id).one(conn).await?;
    let tour_data = tour.as_ref().map(serde_json::to_value).transpose()?;
    let now = Utc::now();

    let backup = booking_backup::ActiveModel {
        booking_id: Set(Some(booking.id)),
        tour_id: Set(tour.as_ref().map(|tour| tour.id)),
        backup_type: Set(BackupType::Booking),
        tour_data: Set(tour_data),
        booking_data: Set(Some(serde_json::to_value(booking)?)),
        customer_name: Set(Some(booking.name.clone())),
        customer_email: Set(Some(booking.email.clone())),
        customer_phone: Set(Some(booking.phone.clone())),
        notes: Set(None),
        backup_reason: Set(Some(reason.as_str().to_string())),
        restored_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let backup = backup.insert(conn).await?;
    debug!(
        backup_id = backup.id,
        booking_id = booking.id,
        reason = %reason,
        "Booking snapshot taken"
    );
    Ok(backup)
}

/// Snapshots `tour` on its own.
pub async fn snapshot_tour<C>(
    conn: &C,
    tour: &tour::Model,
    reason: &BackupReason,
) -> Result<booking_backup::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let backup = booking_backup::ActiveModel {
        booking_id: Set(None),
        tour_id: Set(Some(tour.id)),
        backup_type: Set(BackupType::Tour),
        tour_data: Set(Some(serde_json::to_value(tour)?)),
        booking_data: Set(None),
        customer_name: Set(None),
        customer_email: Set(None),
        customer_phone: Set(None),
        notes: Set(None),
        backup_reason: Set(Some(reason.as_str().to_string())),
        restored_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let backup = backup.insert(conn).await?;
    debug!(backup_id = backup.id, tour_id = tour.id, reason = %reason, "Tour snapshot taken");
    Ok(backup)
}

/// Backs up a live booking on demand. The reason defaults to `manual`.
///
/// # Errors
/// Returns `NotFound` if the booking does not exist or was deleted, or a validation
/// error if the reason label is too long.
pub async fn create_booking_backup(
    db: &DatabaseConnection,
    booking_id: i64,
    reason: Option<&str>,
) -> Result<booking_backup::Model> {
    let reason = BackupReason::from_caller(reason)?;
    let booking = Booking::find_by_id(booking_id)
        .filter(booking::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Booking",
            id: booking_id,
        })?;

    let backup = snapshot_booking(db, &booking, &reason).await?;
    info!(backup_id = backup.id, booking_id, reason = %reason, "Booking backup created");
    Ok(backup)
}

/// Backs up a live tour on demand. The reason defaults to `manual`.
///
/// # Errors
/// Returns `NotFound` if the tour does not exist or was deleted, or a validation
/// error if the reason label is too long.
pub async fn create_tour_backup(
    db: &DatabaseConnection,
    tour_id: i64,
    reason: Option<&str>,
) -> Result<booking_backup::Model> {
    let reason = BackupReason::from_caller(reason)?;
    let tour = Tour::find_by_id(tour_id)
        .filter(tour::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Tour",
            id: tour_id,
        })?;

    let backup = snapshot_tour(db, &tour, &reason).await?;
    info!(backup_id = backup.id, tour_id, reason = %reason, "Tour backup created");
    Ok(backup)
}

/// Takes the `before_update` backup an editing client requests before it saves a booking.
pub async fn create_auto_backup(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<booking_backup::Model> {
    let reason = BookingMutation::Updated.backup_reason();
    let booking = Booking::find_by_id(booking_id)
        .filter(booking::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Booking",
            id: booking_id,
        })?;

    let backup = snapshot_booking(db, &booking, &reason).await?;
    info!(backup_id = backup.id, booking_id, "Auto backup created");
    Ok(backup)
}

/// Lists backups matching `filter`, newest first.
pub async fn list_backups(
    db: &DatabaseConnection,
    filter: &BackupFilter,
    request: PageRequest,
) -> Result<Page<booking_backup::Model>> {
    let mut query = BookingBackup::find();
    if let Some(backup_type) = filter.backup_type {
        query = query.filter(booking_backup::Column::BackupType.eq(backup_type));
    }
    if let Some(booking_id) = filter.booking_id {
        query = query.filter(booking_backup::Column::BookingId.eq(booking_id));
    }
    if let Some(tour_id) = filter.tour_id {
        query = query.filter(booking_backup::Column::TourId.eq(tour_id));
    }
    if let Some(from) = filter.date_from {
        let start = from.and_time(NaiveTime::MIN).and_utc();
        query = query.filter(booking_backup::Column::CreatedAt.gte(start));
    }
    if let Some(next_day) = filter.date_to.and_then(|to| to.succ_opt()) {
        let end = next_day.and_time(NaiveTime::MIN).and_utc();
        query = query.filter(booking_backup::Column::CreatedAt.lt(end));
    }

    let query = query
        .order_by_desc(booking_backup::Column::CreatedAt)
        .order_by_desc(booking_backup::Column::Id);
    fetch_page(db, query, request).await
}

/// Fetches a backup by ID.
pub async fn get_backup<C>(db: &C, backup_id: i64) -> Result<booking_backup::Model>
where
    C: ConnectionTrait,
{
    BookingBackup::find_by_id(backup_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Backup",
            id: backup_id,
        })
}

/// Fetches a backup with whatever live booking and tour rows it still links to.
pub async fn get_backup_details(db: &DatabaseConnection, backup_id: i64) -> Result<BackupDetails> {
    let backup = get_backup(db, backup_id).await?;
    let booking = match backup.booking_id {
        Some(id) => Booking::find_by_id(id).one(db).await?,
        None => None,
    };
    let tour = match backup.tour_id {
        Some(id) => Tour::find_by_id(id).one(db).await?,
        None => None,
    };
    Ok(BackupDetails {
        backup,
        booking,
        tour,
    })
}

/// Permanently deletes a backup.
pub async fn delete_backup(db: &DatabaseConnection, backup_id: i64) -> Result<()> {
    let result = BookingBackup::delete_by_id(backup_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Backup",
            id: backup_id,
        });
    }
    info!(backup_id, "Backup deleted");
    Ok(())
}
