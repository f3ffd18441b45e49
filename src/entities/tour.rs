//! Tour entity - Represents a bookable tour product.
//!
//! Tours are soft-deletable: deleting one stamps `deleted_at` so that bookings and
//! backups referencing it stay resolvable.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered list of strings stored as a JSON array (image URLs, highlights, countries...)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

impl StringList {
    /// Drops blank entries; an empty result collapses to `None`.
    #[must_use]
    pub fn normalized(items: Vec<String>) -> Option<Self> {
        let kept: Vec<String> = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if kept.is_empty() { None } else { Some(Self(kept)) }
    }
}

/// Tour database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tours")]
pub struct Model {
    /// Unique identifier for the tour
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title
    pub title: String,
    /// Long-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Adult price per person, rounded to cents
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Where the tour takes place
    pub location: String,
    /// Free-form duration label (e.g. "3 days")
    pub duration: String,
    /// Image URLs, first one is the primary image
    pub images: Option<StringList>,
    /// Category tag (e.g. "adventure", "cultural")
    pub tour_type: Option<String>,
    /// Capacity per departure
    pub max_group_size: Option<i32>,
    /// Average of the approved review ratings, 0 without reviews
    #[sea_orm(column_type = "Decimal(Some((3, 2)))")]
    pub rating: Decimal,
    /// Number of approved reviews folded into `rating`
    pub reviews_count: i32,
    /// Ordered day-by-day itinerary
    pub itinerary: Option<Json>,
    /// Selling points
    pub highlights: Option<StringList>,
    /// What the price includes
    pub included: Option<StringList>,
    /// What the price excludes
    pub excluded: Option<StringList>,
    /// Countries visited
    pub countries: Option<StringList>,
    /// Guide languages
    pub languages: Option<StringList>,
    /// Shown on the landing page
    pub is_featured: bool,
    /// Visible to the public
    pub is_active: bool,
    /// When the tour was created
    pub created_at: DateTimeUtc,
    /// When the tour was last modified
    pub updated_at: DateTimeUtc,
    /// Soft delete marker
    pub deleted_at: Option<DateTimeUtc>,
}

impl Model {
    /// First image, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.0.first())
            .map(String::as_str)
    }
}

/// Defines relationships between Tour and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One tour has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One tour has many backups
    #[sea_orm(has_many = "super::booking_backup::Entity")]
    Backups,
    /// One tour has many reviews
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::booking_backup::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Backups.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
