//! Contact submission entity - A message sent through the public contact form.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contact submission database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_submissions")]
pub struct Model {
    /// Unique identifier for the submission
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Sender name
    pub name: String,
    /// Sender email
    pub email: String,
    /// Sender phone number
    pub mobile_number: Option<String>,
    /// Message body
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// Set the first time an administrator marks the message read
    pub read_at: Option<DateTimeUtc>,
    /// When the message was received
    #[sea_orm(indexed)]
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Whether an administrator has read the message.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// `ContactSubmission` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
