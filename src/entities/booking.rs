//! Booking entity - A reservation against one tour.
//!
//! `booking_number` is minted once at creation and never reassigned.
//! `total_amount` is derived from the tour price and the party size.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting confirmation
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Confirmed by the operator
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Cancelled by customer or operator
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Tour took place
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl BookingStatus {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tour this booking reserves
    pub tour_id: i64,
    /// Human-readable reference given to the customer
    #[sea_orm(unique)]
    pub booking_number: String,
    /// Customer name
    pub name: String,
    /// Customer email
    #[sea_orm(indexed)]
    pub email: String,
    /// Customer phone
    pub phone: String,
    /// Day of the tour
    pub booking_date: Date,
    /// Number of adults (at least one)
    pub adults: i32,
    /// Number of children, charged at half price
    pub children: i32,
    /// Free-text special request
    #[sea_orm(column_type = "Text", nullable)]
    pub special_requests: Option<String>,
    /// `price * adults + price * 0.5 * children`
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    /// Lifecycle status
    #[sea_orm(indexed)]
    pub status: BookingStatus,
    /// When the booking was confirmed
    pub confirmed_at: Option<DateTimeUtc>,
    /// When the booking was cancelled
    pub cancelled_at: Option<DateTimeUtc>,
    /// Why the booking was cancelled
    #[sea_orm(column_type = "Text", nullable)]
    pub cancellation_reason: Option<String>,
    /// When the booking was created
    pub created_at: DateTimeUtc,
    /// When the booking was last modified
    pub updated_at: DateTimeUtc,
    /// Soft delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking belongs to one tour
    #[sea_orm(
        belongs_to = "super::tour::Entity",
        from = "Column::TourId",
        to = "super::tour::Column::Id",
        on_delete = "Cascade"
    )]
    Tour,
    /// One booking has many backups
    #[sea_orm(has_many = "super::booking_backup::Entity")]
    Backups,
}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tour.def()
    }
}

impl Related<super::booking_backup::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Backups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
