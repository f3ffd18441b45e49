//! Tour reviews and the aggregate tour rating.
//!
//! A tour's `rating` and `reviews_count` are derived from its approved reviews and are
//! recomputed inside the same transaction as every review write. New reviews are
//! approved on submission; administrators can withdraw approval or delete them.

use crate::{
    core::{
        pagination::{Page, PageRequest, fetch_page},
        tour::get_tour,
        validate,
    },
    entities::{Booking, Review, Tour, booking, review, tour},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Lowest star rating.
pub const MIN_RATING: i32 = 1;
/// Highest star rating.
pub const MAX_RATING: i32 = 5;
const MIN_COMMENT_LEN: usize = 10;
const MAX_COMMENT_LEN: usize = 1000;

/// Input for [`create_review`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    /// Reviewed tour
    pub tour_id: i64,
    /// Booking the reviewer travelled on; makes the review verified
    #[serde(default)]
    pub booking_id: Option<i64>,
    /// Display name
    pub author: String,
    /// Reviewer email
    pub email: String,
    /// Stars from 1 to 5
    pub rating: i32,
    /// Review text, 10 to 1000 characters
    pub comment: String,
}

/// Moderation changes for [`update_review`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewChanges {
    /// Approve or hide the review
    pub is_approved: Option<bool>,
    /// Replacement text
    pub comment: Option<String>,
}

/// Star breakdown of a tour's approved reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Summarized tour
    pub tour_id: i64,
    /// Mean rating to one decimal place, 0 without reviews
    pub average_rating: Decimal,
    /// Number of approved reviews
    pub total_reviews: u64,
    /// Review count per star value, every value from 1 to 5 present
    pub rating_distribution: BTreeMap<i32, u64>,
}

fn star_rating(value: i32) -> Result<i32> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(Error::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(value)
}

fn comment(value: &str) -> Result<String> {
    validate::text_between("comment", value, MIN_COMMENT_LEN, MAX_COMMENT_LEN)
}

fn average(ratings: &[i32], dp: u32) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (Decimal::from(sum) / Decimal::from(ratings.len()))
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

async fn approved_ratings<C>(conn: &C, tour_id: i64) -> Result<Vec<i32>>
where
    C: ConnectionTrait,
{
    Ok(Review::find()
        .select_only()
        .column(review::Column::Rating)
        .filter(review::Column::TourId.eq(tour_id))
        .filter(review::Column::IsApproved.eq(true))
        .into_tuple()
        .all(conn)
        .await?)
}

/// Recomputes `rating` and `reviews_count` of a tour from its approved reviews.
pub async fn refresh_tour_rating<C>(conn: &C, tour_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let ratings = approved_ratings(conn, tour_id).await?;
    let count = i32::try_from(ratings.len()).unwrap_or(i32::MAX);
    Tour::update_many()
        .set(tour::ActiveModel {
            rating: Set(average(&ratings, 2)),
            reviews_count: Set(count),
            ..Default::default()
        })
        .filter(tour::Column::Id.eq(tour_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Stores a review and folds it into the tour rating.
///
/// # Errors
/// Returns a validation error for malformed input or a booking on another tour, and
/// `NotFound` if the tour or booking does not exist or was deleted.
pub async fn create_review(db: &DatabaseConnection, input: NewReview) -> Result<review::Model> {
    let author = validate::required_text("author", &input.author)?;
    let email = validate::email(&input.email)?;
    let rating = star_rating(input.rating)?;
    let comment = comment(&input.comment)?;

    let txn = db.begin().await?;
    let tour = get_tour(&txn, input.tour_id, true).await?;
    if let Some(booking_id) = input.booking_id {
        let booking = Booking::find_by_id(booking_id)
            .filter(booking::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or(Error::NotFound {
                entity: "Booking",
                id: booking_id,
            })?;
        if booking.tour_id != tour.id {
            return Err(Error::validation("booking_id does not belong to this tour"));
        }
    }

    let now = Utc::now();
    let review = review::ActiveModel {
        tour_id: Set(tour.id),
        booking_id: Set(input.booking_id),
        author: Set(author),
        email: Set(email),
        rating: Set(rating),
        comment: Set(comment),
        is_verified: Set(input.booking_id.is_some()),
        is_approved: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let review = review.insert(&txn).await?;
    refresh_tour_rating(&txn, tour.id).await?;
    txn.commit().await?;

    info!(review_id = review.id, tour_id = tour.id, rating, "Review created");
    Ok(review)
}

/// Finds a review by ID, approved or not.
pub async fn get_review<C>(db: &C, review_id: i64) -> Result<review::Model>
where
    C: ConnectionTrait,
{
    Review::find_by_id(review_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "Review",
            id: review_id,
        })
}

/// Lists the approved reviews of a tour, newest first.
pub async fn list_reviews(
    db: &DatabaseConnection,
    tour_id: i64,
    request: PageRequest,
) -> Result<Page<review::Model>> {
    get_tour(db, tour_id, true).await?;
    let query = Review::find()
        .filter(review::Column::TourId.eq(tour_id))
        .filter(review::Column::IsApproved.eq(true))
        .order_by_desc(review::Column::CreatedAt)
        .order_by_desc(review::Column::Id);
    fetch_page(db, query, request).await
}

/// Applies moderation `changes` and refreshes the tour rating.
pub async fn update_review(
    db: &DatabaseConnection,
    review_id: i64,
    changes: ReviewChanges,
) -> Result<review::Model> {
    let txn = db.begin().await?;
    let existing = get_review(&txn, review_id).await?;
    let tour_id = existing.tour_id;
    let mut review: review::ActiveModel = existing.into();

    if let Some(approved) = changes.is_approved {
        review.is_approved = Set(approved);
    }
    if let Some(text) = changes.comment {
        review.comment = Set(comment(&text)?);
    }
    review.updated_at = Set(Utc::now());

    let review = review.update(&txn).await?;
    refresh_tour_rating(&txn, tour_id).await?;
    txn.commit().await?;

    info!(review_id, approved = review.is_approved, "Review updated");
    Ok(review)
}

/// Deletes a review and refreshes the tour rating.
pub async fn delete_review(db: &DatabaseConnection, review_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let existing = get_review(&txn, review_id).await?;
    let tour_id = existing.tour_id;
    existing.delete(&txn).await?;
    refresh_tour_rating(&txn, tour_id).await?;
    txn.commit().await?;

    info!(review_id, tour_id, "Review deleted");
    Ok(())
}

/// Average, count and per-star breakdown of a tour's approved reviews.
pub async fn rating_summary(db: &DatabaseConnection, tour_id: i64) -> Result<RatingSummary> {
    get_tour(db, tour_id, true).await?;
    let ratings = approved_ratings(db, tour_id).await?;

    let mut rating_distribution: BTreeMap<i32, u64> =
        (MIN_RATING..=MAX_RATING).map(|stars| (stars, 0)).collect();
    for rating in &ratings {
        *rating_distribution.entry(*rating).or_default() += 1;
    }

    Ok(RatingSummary {
        tour_id,
        average_rating: average(&ratings, 1),
        total_reviews: ratings.len() as u64,
        rating_distribution,
    })
}
