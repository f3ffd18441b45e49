//! Core business logic - framework-agnostic tour, booking, backup, review and contact
//! operations.
//!
//! Every function takes a `SeaORM` connection (or transaction) and returns
//! [`crate::errors::Result`]; nothing here knows about HTTP.

/// Snapshot store: taking, listing, fetching and deleting backups
pub mod backup;
/// Booking lifecycle with the backup trigger policy applied
pub mod booking;
/// Contact form submissions
pub mod contact;
/// Booking confirmation delivery
pub mod notify;
/// Page requests and paged results shared by all listings
pub mod pagination;
/// When a backup is taken and which reason tag it carries
pub mod policy;
/// Materializing new rows from backups
pub mod restore;
/// Tour reviews and the derived tour rating
pub mod review;
/// Tour catalogue management
pub mod tour;
/// Field-level input checks
pub mod validate;
