//! Tour business logic - Handles all tour catalogue operations.
//!
//! Tours are created, updated and soft-deleted by administrators. Public callers only
//! ever see active, non-deleted tours; administrators also see inactive ones.
//! `rating` and `reviews_count` are maintained by [`crate::core::review`] and cannot be
//! set here.

use crate::{
    core::{
        pagination::{Page, PageRequest, fetch_page},
        validate,
    },
    entities::{
        Tour,
        tour::{self, StringList},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Shortest accepted country or language entry.
const MIN_TAG_LEN: usize = 2;
/// Longest accepted country or language entry.
const MAX_TAG_LEN: usize = 100;

/// Input for creating a tour
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewTour {
    /// Display title
    pub title: String,
    /// Long-form description
    pub description: Option<String>,
    /// Adult price per person
    pub price: Decimal,
    /// Where the tour takes place
    pub location: String,
    /// Free-form duration label
    pub duration: String,
    /// Image URLs
    pub images: Vec<String>,
    /// Category tag
    pub tour_type: Option<String>,
    /// Capacity per departure
    pub max_group_size: Option<i32>,
    /// Ordered itinerary
    pub itinerary: Option<Json>,
    /// Selling points
    pub highlights: Vec<String>,
    /// What the price includes
    pub included: Vec<String>,
    /// What the price excludes
    pub excluded: Vec<String>,
    /// Countries visited
    pub countries: Vec<String>,
    /// Guide languages
    pub languages: Vec<String>,
    /// Shown on the landing page, defaults to false
    pub is_featured: Option<bool>,
    /// Publicly visible, defaults to true
    pub is_active: Option<bool>,
}

/// Partial update of a tour; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TourChanges {
    /// New title
    pub title: Option<String>,
    /// New description (blank clears it)
    pub description: Option<String>,
    /// New price
    pub price: Option<Decimal>,
    /// New location
    pub location: Option<String>,
    /// New duration label
    pub duration: Option<String>,
    /// Replacement image list
    pub images: Option<Vec<String>>,
    /// New category tag (blank clears it)
    pub tour_type: Option<String>,
    /// New capacity
    pub max_group_size: Option<i32>,
    /// Replacement itinerary
    pub itinerary: Option<Json>,
    /// Replacement highlights
    pub highlights: Option<Vec<String>>,
    /// Replacement inclusions
    pub included: Option<Vec<String>>,
    /// Replacement exclusions
    pub excluded: Option<Vec<String>>,
    /// Replacement countries
    pub countries: Option<Vec<String>>,
    /// Replacement languages
    pub languages: Option<Vec<String>>,
    /// Featured flag
    pub is_featured: Option<bool>,
    /// Active flag
    pub is_active: Option<bool>,
}

/// Filters for [`list_tours`]
#[derive(Debug, Clone, Default)]
pub struct TourFilter {
    /// Only featured tours
    pub featured: bool,
    /// Exact category tag
    pub tour_type: Option<String>,
    /// Substring of the location
    pub location: Option<String>,
    /// Substring of the title or description
    pub search: Option<String>,
    /// Include inactive tours (administrators only)
    pub include_inactive: bool,
}

fn tags(field: &str, values: Vec<String>) -> Result<Option<StringList>> {
    let list = StringList::normalized(values);
    if let Some(StringList(items)) = &list {
        for item in items {
            let len = item.chars().count();
            if !(MIN_TAG_LEN..=MAX_TAG_LEN).contains(&len) {
                return Err(Error::validation(format!(
                    "{field} entries must be between {MIN_TAG_LEN} and {MAX_TAG_LEN} characters"
                )));
            }
        }
    }
    Ok(list)
}

/// Creates a new tour after validating and normalizing the input.
///
/// # Errors
/// Returns a validation error for blank required text, a negative price, a group size
/// below 1 or malformed country/language entries.
pub async fn create_tour(db: &DatabaseConnection, input: NewTour) -> Result<tour::Model> {
    let now = Utc::now();
    let max_group_size = input
        .max_group_size
        .map(|size| validate::at_least("max_group_size", size, 1))
        .transpose()?;

    let tour = tour::ActiveModel {
        title: Set(validate::required_text("title", &input.title)?),
        description: Set(validate::optional_long_text(input.description)),
        price: Set(validate::amount("price", input.price)?),
        location: Set(validate::required_text("location", &input.location)?),
        duration: Set(validate::required_text("duration", &input.duration)?),
        images: Set(StringList::normalized(input.images)),
        tour_type: Set(validate::optional_text("tour_type", input.tour_type)?),
        max_group_size: Set(max_group_size),
        rating: Set(Decimal::ZERO),
        reviews_count: Set(0),
        itinerary: Set(input.itinerary),
        highlights: Set(StringList::normalized(input.highlights)),
        included: Set(StringList::normalized(input.included)),
        excluded: Set(StringList::normalized(input.excluded)),
        countries: Set(tags("countries", input.countries)?),
        languages: Set(tags("languages", input.languages)?),
        is_featured: Set(input.is_featured.unwrap_or(false)),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        ..Default::default()
    };

    let tour = tour.insert(db).await?;
    info!(tour_id = tour.id, title = %tour.title, "Tour created");
    Ok(tour)
}

/// Finds a non-deleted tour by ID. Inactive tours are only returned when
/// `include_inactive` is set.
pub async fn get_tour<C>(db: &C, tour_id: i64, include_inactive: bool) -> Result<tour::Model>
where
    C: ConnectionTrait,
{
    let mut query = Tour::find_by_id(tour_id).filter(tour::Column::DeletedAt.is_null());
    if !include_inactive {
        query = query.filter(tour::Column::IsActive.eq(true));
    }
    query.one(db).await?.ok_or(Error::NotFound {
        entity: "Tour",
        id: tour_id,
    })
}

/// Lists non-deleted tours matching `filter`, newest first.
pub async fn list_tours(
    db: &DatabaseConnection,
    filter: &TourFilter,
    request: PageRequest,
) -> Result<Page<tour::Model>> {
    let mut query = Tour::find().filter(tour::Column::DeletedAt.is_null());
    if !filter.include_inactive {
        query = query.filter(tour::Column::IsActive.eq(true));
    }
    if filter.featured {
        query = query.filter(tour::Column::IsFeatured.eq(true));
    }
    if let Some(tour_type) = &filter.tour_type {
        query = query.filter(tour::Column::TourType.eq(tour_type.as_str()));
    }
    if let Some(location) = &filter.location {
        query = query.filter(tour::Column::Location.contains(location.as_str()));
    }
    if let Some(search) = &filter.search {
        query = query.filter(
            Condition::any()
                .add(tour::Column::Title.contains(search.as_str()))
                .add(tour::Column::Description.contains(search.as_str())),
        );
    }

    let query = query
        .order_by_desc(tour::Column::CreatedAt)
        .order_by_desc(tour::Column::Id);
    fetch_page(db, query, request).await
}

/// Applies `changes` to a non-deleted tour.
///
/// # Errors
/// Returns `NotFound` if the tour does not exist or was deleted, and the same
/// validation errors as [`create_tour`].
pub async fn update_tour(
    db: &DatabaseConnection,
    tour_id: i64,
    changes: TourChanges,
) -> Result<tour::Model> {
    let existing = get_tour(db, tour_id, true).await?;
    let mut tour: tour::ActiveModel = existing.into();

    if let Some(title) = changes.title {
        tour.title = Set(validate::required_text("title", &title)?);
    }
    if let Some(description) = changes.description {
        tour.description = Set(validate::optional_long_text(Some(description)));
    }
    if let Some(price) = changes.price {
        tour.price = Set(validate::amount("price", price)?);
    }
    if let Some(location) = changes.location {
        tour.location = Set(validate::required_text("location", &location)?);
    }
    if let Some(duration) = changes.duration {
        tour.duration = Set(validate::required_text("duration", &duration)?);
    }
    if let Some(images) = changes.images {
        tour.images = Set(StringList::normalized(images));
    }
    if let Some(tour_type) = changes.tour_type {
        tour.tour_type = Set(validate::optional_text("tour_type", Some(tour_type))?);
    }
    if let Some(size) = changes.max_group_size {
        tour.max_group_size = Set(Some(validate::at_least("max_group_size", size, 1)?));
    }
    if let Some(itinerary) = changes.itinerary {
        tour.itinerary = Set(Some(itinerary));
    }
    if let Some(highlights) = changes.highlights {
        tour.highlights = Set(StringList::normalized(highlights));
    }
    if let Some(included) = changes.included {
        tour.included = Set(StringList::normalized(included));
    }
    if let Some(excluded) = changes.excluded {
        tour.excluded = Set(StringList::normalized(excluded));
    }
    if let Some(countries) = changes.countries {
        tour.countries = Set(tags("countries", countries)?);
    }
    if let Some(languages) = changes.languages {
        tour.languages = Set(tags("languages", languages)?);
    }
    if let Some(featured) = changes.is_featured {
        tour.is_featured = Set(featured);
    }
    if let Some(active) = changes.is_active {
        tour.is_active = Set(active);
    }
    tour.updated_at = Set(Utc::now());

    let tour = tour.update(db).await?;
    info!(tour_id = tour.id, "Tour updated");
    Ok(tour)
}

/// Soft-deletes a tour by stamping `deleted_at`.
pub async fn delete_tour(db: &DatabaseConnection, tour_id: i64) -> Result<()> {
    let existing = get_tour(db, tour_id, true).await?;
    let now = Utc::now();
    let mut tour: tour::ActiveModel = existing.into();
    tour.deleted_at = Set(Some(now));
    tour.updated_at = Set(now);
    tour.update(db).await?;
    info!(tour_id, "Tour soft-deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;


    #[tokio::test]
    async fn test_create_tour_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_tour(
            &db,
            NewTour {
                title: "   ".to_string(),
                ..new_tour_input("Unused", 10)
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_tour(&db, new_tour_input("Negative", -5)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_tour(
            &db,
            NewTour {
                max_group_size: Some(0),
                ..new_tour_input("Nobody", 10)
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_tour(
            &db,
            NewTour {
                countries: vec!["X".to_string()],
                ..new_tour_input("Tiny country", 10)
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tour_normalizes_lists() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_tour(
            &db,
            NewTour {
                images: vec![
                    "https://img.test/a.jpg".to_string(),
                    "  ".to_string(),
                    "https://img.test/b.jpg".to_string(),
                ],
                highlights: vec![String::new()],
                ..new_tour_input("Lake District", 120)
            },
        )
        .await?;

        assert_eq!(
            tour.images,
            Some(StringList(vec![
                "https://img.test/a.jpg".to_string(),
                "https://img.test/b.jpg".to_string()
            ]))
        );
        assert_eq!(tour.primary_image(), Some("https://img.test/a.jpg"));
        assert_eq!(tour.highlights, None);
        assert!(tour.is_active);
        assert!(!tour.is_featured);
        assert_eq!(tour.rating, Decimal::ZERO);
        assert_eq!(tour.reviews_count, 0);

        let stored = Tour::find_by_id(tour.id).one(&db).await?.unwrap();
        assert_eq!(stored, tour);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_tour_hides_inactive_from_public() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_tour(
            &db,
            NewTour {
                is_active: Some(false),
                ..new_tour_input("Hidden Gem", 80)
            },
        )
        .await?;

        assert!(matches!(
            get_tour(&db, tour.id, false).await,
            Err(Error::NotFound { entity: "Tour", .. })
        ));
        assert_eq!(get_tour(&db, tour.id, true).await?.id, tour.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_tours_filters() -> Result<()> {
        let db = setup_test_db().await?;
        create_tour(
            &db,
            NewTour {
                is_featured: Some(true),
                tour_type: Some("beach".to_string()),
                location: "Zanzibar".to_string(),
                ..new_tour_input("Spice Island", 300)
            },
        )
        .await?;
        create_tour(
            &db,
            NewTour {
                description: Some("Walk among the old temples".to_string()),
                ..new_tour_input("Kyoto Walk", 90)
            },
        )
        .await?;
        create_tour(
            &db,
            NewTour {
                is_active: Some(false),
                ..new_tour_input("Retired Tour", 50)
            },
        )
        .await?;

        let all = list_tours(&db, &TourFilter::default(), PageRequest::default()).await?;
        assert_eq!(all.total, 2);

        let admin = TourFilter {
            include_inactive: true,
            ..TourFilter::default()
        };
        assert_eq!(list_tours(&db, &admin, PageRequest::default()).await?.total, 3);

        let featured = TourFilter {
            featured: true,
            ..TourFilter::default()
        };
        let page = list_tours(&db, &featured, PageRequest::default()).await?;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Spice Island");

        let by_location = TourFilter {
            location: Some("anzi".to_string()),
            ..TourFilter::default()
        };
        assert_eq!(list_tours(&db, &by_location, PageRequest::default()).await?.total, 1);

        let by_search = TourFilter {
            search: Some("temples".to_string()),
            ..TourFilter::default()
        };
        let page = list_tours(&db, &by_search, PageRequest::default()).await?;
        assert_eq!(page.items[0].title, "Kyoto Walk");

        let paged = list_tours(&db, &admin, PageRequest::new(Some(2), Some(2))).await?;
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.last_page, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_tour() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Old Title", 100).await?;

        let updated = update_tour(
            &db,
            tour.id,
            TourChanges {
                title: Some("New Title".to_string()),
                price: Some(Decimal::new(150_455, 3)),
                languages: Some(vec!["English".to_string(), "Swahili".to_string()]),
                ..TourChanges::default()
            },
        )
        .await?;

        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.price, Decimal::new(15_046, 2));
        assert_eq!(
            updated.languages,
            Some(StringList(vec!["English".to_string(), "Swahili".to_string()]))
        );
        assert_eq!(updated.location, tour.location);
        assert!(updated.updated_at >= tour.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_tour_is_soft() -> Result<()> {
        let db = setup_test_db().await?;
        let tour = create_test_tour(&db, "Short Lived", 10).await?;

        delete_tour(&db, tour.id).await?;

        assert!(get_tour(&db, tour.id, true).await.is_err());
        let row = Tour::find_by_id(tour.id).one(&db).await?.unwrap();
        assert!(row.deleted_at.is_some());

        assert!(matches!(
            delete_tour(&db, tour.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
