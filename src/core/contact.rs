//! Contact form submissions and their read state.

use crate::{
    core::{
        pagination::{Page, PageRequest, fetch_page},
        validate,
    },
    entities::{ContactSubmission, contact_submission},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, Order, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

const MAX_MOBILE_LEN: usize = 20;
const MAX_MESSAGE_LEN: usize = 5000;

/// Input for [`create_submission`]
#[derive(Debug, Clone, Deserialize)]
pub struct NewContactSubmission {
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Sender phone number
    #[serde(default)]
    pub mobile_number: Option<String>,
    /// Message body
    pub message: String,
}

/// Column an admin listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSortField {
    /// Received time
    CreatedAt,
    /// Sender name
    Name,
    /// Sender email
    Email,
    /// Read time
    ReadAt,
}

impl ContactSortField {
    const fn column(self) -> contact_submission::Column {
        match self {
            Self::CreatedAt => contact_submission::Column::CreatedAt,
            Self::Name => contact_submission::Column::Name,
            Self::Email => contact_submission::Column::Email,
            Self::ReadAt => contact_submission::Column::ReadAt,
        }
    }
}

/// Filters for [`list_submissions`]
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Substring matched against name, email, phone number and message
    pub search: Option<String>,
    /// Explicit sort column; newest first when unset
    pub sort_by: Option<ContactSortField>,
    /// Sort `sort_by` descending instead of ascending
    pub descending: bool,
}

/// Validates and stores a contact form message.
pub async fn create_submission(
    db: &DatabaseConnection,
    input: NewContactSubmission,
) -> Result<contact_submission::Model> {
    let name = validate::required_text("name", &input.name)?;
    let email = validate::email(&input.email)?;
    let mobile_number = match validate::optional_long_text(input.mobile_number) {
        Some(number) => Some(validate::text_between("mobile_number", &number, 1, MAX_MOBILE_LEN)?),
        None => None,
    };
    let message = validate::text_between("message", &input.message, 1, MAX_MESSAGE_LEN)?;

    let now = Utc::now();
    let submission = contact_submission::ActiveModel {
        name: Set(name),
        email: Set(email),
        mobile_number: Set(mobile_number),
        message: Set(message),
        read_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let submission = submission.insert(db).await?;
    info!(submission_id = submission.id, "Contact submission received");
    Ok(submission)
}

/// Finds a submission by ID.
pub async fn get_submission(
    db: &DatabaseConnection,
    submission_id: i64,
) -> Result<contact_submission::Model> {
    ContactSubmission::find_by_id(submission_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "ContactSubmission",
            id: submission_id,
        })
}

/// Lists submissions matching `filter`.
pub async fn list_submissions(
    db: &DatabaseConnection,
    filter: &ContactFilter,
    request: PageRequest,
) -> Result<Page<contact_submission::Model>> {
    let mut query = ContactSubmission::find();
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(contact_submission::Column::Name.contains(search))
                .add(contact_submission::Column::Email.contains(search))
                .add(contact_submission::Column::MobileNumber.contains(search))
                .add(contact_submission::Column::Message.contains(search)),
        );
    }
    if let Some(field) = filter.sort_by {
        let order = if filter.descending { Order::Desc } else { Order::Asc };
        query = query.order_by(field.column(), order);
    }
    let query = query
        .order_by_desc(contact_submission::Column::CreatedAt)
        .order_by_desc(contact_submission::Column::Id);
    fetch_page(db, query, request).await
}

/// Stamps `read_at` the first time a submission is read. Later calls leave it alone.
pub async fn mark_as_read(
    db: &DatabaseConnection,
    submission_id: i64,
) -> Result<contact_submission::Model> {
    let existing = get_submission(db, submission_id).await?;
    if existing.is_read() {
        return Ok(existing);
    }

    let now = Utc::now();
    let mut submission: contact_submission::ActiveModel = existing.into();
    submission.read_at = Set(Some(now));
    submission.updated_at = Set(now);
    let submission = submission.update(db).await?;
    info!(submission_id, "Contact submission marked as read");
    Ok(submission)
}
