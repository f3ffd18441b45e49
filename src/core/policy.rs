//! Backup trigger policy.
//!
//! Every booking mutation takes a backup before its write lands, inside the same
//! transaction, and the mutation is aborted if the backup fails:
//!
//! | Operation                | Backup type | Reason          |
//! |--------------------------|-------------|-----------------|
//! | booking created          | booking     | `new_booking`   |
//! | booking updated          | booking     | `before_update` |
//! | booking soft-deleted     | booking     | `before_delete` |
//! | booking backed up        | booking     | caller / `manual` |
//! | tour backed up           | tour        | caller / `manual` |

use crate::errors::{Error, Result};

/// Longest reason label accepted from callers.
pub const MAX_REASON_LEN: usize = 255;

/// Why a backup was taken
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupReason {
    /// Requested explicitly by an operator
    Manual,
    /// Taken right after a booking was created
    NewBooking,
    /// Taken before a booking update
    BeforeUpdate,
    /// Taken before a booking soft delete
    BeforeDelete,
    /// Taken by an automated job
    Auto,
    /// Any other caller-supplied label
    Custom(String),
}

impl BackupReason {
    /// Label stored in `booking_backups.backup_reason`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => "manual",
            Self::NewBooking => "new_booking",
            Self::BeforeUpdate => "before_update",
            Self::BeforeDelete => "before_delete",
            Self::Auto => "auto",
            Self::Custom(label) => label,
        }
    }

    /// Parses a caller-supplied reason. Missing or blank input means [`BackupReason::Manual`].
    ///
    /// # Errors
    /// Returns a validation error if the label is longer than [`MAX_REASON_LEN`].
    pub fn from_caller(reason: Option<&str>) -> Result<Self> {
        let Some(label) = reason.map(str::trim).filter(|label| !label.is_empty()) else {
            return Ok(Self::Manual);
        };
        if label.chars().count() > MAX_REASON_LEN {
            return Err(Error::validation(format!(
                "reason may not be longer than {MAX_REASON_LEN} characters"
            )));
        }
        Ok(match label {
            "manual" => Self::Manual,
            "new_booking" => Self::NewBooking,
            "before_update" => Self::BeforeUpdate,
            "before_delete" => Self::BeforeDelete,
            "auto" => Self::Auto,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl std::fmt::Display for BackupReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking mutations that are guarded by a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingMutation {
    /// A new booking was inserted
    Created,
    /// Any field of a booking is about to change
    Updated,
    /// A booking is about to be soft-deleted
    Deleted,
}

impl BookingMutation {
    /// Reason tag for the backup guarding this mutation.
    #[must_use]
    pub const fn backup_reason(self) -> BackupReason {
        match self {
            Self::Created => BackupReason::NewBooking,
            Self::Updated => BackupReason::BeforeUpdate,
            Self::Deleted => BackupReason::BeforeDelete,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_mutation_reasons() {
        assert_eq!(BookingMutation::Created.backup_reason().as_str(), "new_booking");
        assert_eq!(BookingMutation::Updated.backup_reason().as_str(), "before_update");
        assert_eq!(BookingMutation::Deleted.backup_reason().as_str(), "before_delete");
    }

    #[test]
    fn test_caller_reason_defaults_to_manual() {
        assert_eq!(BackupReason::from_caller(None).unwrap(), BackupReason::Manual);
        assert_eq!(BackupReason::from_caller(Some("   ")).unwrap(), BackupReason::Manual);
    }

    #[test]
    fn test_caller_reason_known_and_custom_labels() {
        assert_eq!(BackupReason::from_caller(Some("auto")).unwrap(), BackupReason::Auto);
        let custom = BackupReason::from_caller(Some(" before migration ")).unwrap();
        assert_eq!(custom, BackupReason::Custom("before migration".to_string()));
        assert_eq!(custom.to_string(), "before migration");
    }

    #[test]
    fn test_caller_reason_too_long() {
        let long = "x".repeat(MAX_REASON_LEN + 1);
        assert!(matches!(
            BackupReason::from_caller(Some(&long)),
            Err(Error::Validation { .. })
        ));
    }
}
