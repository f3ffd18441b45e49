//! Review entity - A customer's rating and comment on a tour.
//!
//! Only approved reviews count towards the tour's `rating` and `reviews_count`.
//! A review tied to a booking is marked verified.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier for the review
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Reviewed tour
    #[sea_orm(indexed)]
    pub tour_id: i64,
    /// Booking the reviewer travelled on, if given
    #[sea_orm(indexed)]
    pub booking_id: Option<i64>,
    /// Display name of the reviewer
    pub author: String,
    /// Reviewer email, never shown publicly
    #[serde(skip_serializing)]
    pub email: String,
    /// Stars from 1 to 5
    pub rating: i32,
    /// Review text
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    /// Backed by a booking
    pub is_verified: bool,
    /// Visible and counted in the tour rating
    #[sea_orm(indexed)]
    pub is_approved: bool,
    /// When the review was submitted
    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
    /// When the review was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Review and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each review belongs to one tour
    #[sea_orm(
        belongs_to = "super::tour::Entity",
        from = "Column::TourId",
        to = "super::tour::Column::Id",
        on_delete = "Cascade"
    )]
    Tour,
    /// Optional link to the booking behind a verified review
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id",
        on_delete = "SetNull"
    )]
    Booking,
}

impl Related<super::tour::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tour.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
