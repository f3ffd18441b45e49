//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod booking;
pub mod booking_backup;
pub mod contact_submission;
pub mod review;
pub mod tour;

// Re-export specific types to avoid conflicts
pub use booking::{Column as BookingColumn, Entity as Booking, Model as BookingModel};
pub use booking_backup::{
    Column as BookingBackupColumn, Entity as BookingBackup, Model as BookingBackupModel,
};
pub use contact_submission::{
    Column as ContactSubmissionColumn, Entity as ContactSubmission,
    Model as ContactSubmissionModel,
};
pub use review::{Column as ReviewColumn, Entity as Review, Model as ReviewModel};
pub use tour::{Column as TourColumn, Entity as Tour, Model as TourModel};
