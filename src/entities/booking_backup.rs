//! Booking backup entity - Immutable snapshot of a booking and/or tour.
//!
//! `booking_data` and `tour_data` hold the full serialized field set at snapshot time and
//! are the source of truth for restoration; `booking_id`/`tour_id` are convenience links
//! that may go stale. `restored_at` is set once, when the booking payload is restored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What a backup covers
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BackupType {
    /// A booking together with its parent tour
    #[sea_orm(string_value = "booking")]
    Booking,
    /// A tour on its own
    #[sea_orm(string_value = "tour")]
    Tour,
}

impl BackupType {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Tour => "tour",
        }
    }
}

impl std::str::FromStr for BackupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booking" => Ok(Self::Booking),
            "tour" => Ok(Self::Tour),
            other => Err(format!("unknown backup type '{other}'")),
        }
    }
}

/// Booking backup database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_backups")]
pub struct Model {
    /// Unique identifier for the backup
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Booking the backup was taken from, `None` for tour-only backups
    #[sea_orm(indexed)]
    pub booking_id: Option<i64>,
    /// Tour the backup references; nulled when the tour row is removed
    #[sea_orm(indexed)]
    pub tour_id: Option<i64>,
    /// What the backup covers
    #[sea_orm(indexed)]
    pub backup_type: BackupType,
    /// Full tour field set at snapshot time
    pub tour_data: Option<Json>,
    /// Full booking field set at snapshot time
    pub booking_data: Option<Json>,
    /// Customer name copied out of the booking for lookup
    pub customer_name: Option<String>,
    /// Customer email copied out of the booking for lookup
    pub customer_email: Option<String>,
    /// Customer phone copied out of the booking for lookup
    pub customer_phone: Option<String>,
    /// Operator notes
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// What triggered the backup (`manual`, `new_booking`, `before_update`, ...)
    pub backup_reason: Option<String>,
    /// Set once the booking payload has been restored
    pub restored_at: Option<DateTimeUtc>,
    /// When the backup was taken
    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
    /// When the backup row was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Whether the booking payload has already been restored.
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        self.restored_at.is_some()
    }
}

/// Defines relationships between `BookingBackup` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Backup of a booking; removed together with the booking row
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id",
        on_delete = "Cascade"
    )]
    Booking,
    /// Tour link; nulled when the tour row is removed
    #[sea_orm(
        belongs_to = "super::tour::Entity",
        from = "Column::TourId",
        to = "super::tour::Column::Id",
        on_delete = "SetNull"
    )]
    Tour,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tour.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
