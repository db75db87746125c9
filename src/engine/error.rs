use crate::model::{RangeError, ReservationRecord};
use crate::storage::StorageError;

/// Lifecycle of one booking request. Rejections need new user input;
/// failures need a user-initiated retry — nothing here retries by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Validating,
    Checking,
    Committing,
    Committed,
    Rejected,
    Failed,
}

impl std::fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestPhase::Validating => "validating",
            RequestPhase::Checking => "checking",
            RequestPhase::Committing => "committing",
            RequestPhase::Committed => "committed",
            RequestPhase::Rejected => "rejected",
            RequestPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    /// Brand name blank or whitespace.
    BrandRequired,
    /// Start or end date absent from the request ("start" / "end").
    DateRequired(&'static str),
    /// Malformed or inverted date input. Never reaches storage.
    InvalidRange(RangeError),
    /// Candidate range overlaps an active reservation; carries the blocking
    /// record so the UI can show *which* dates are taken.
    Conflict(Box<ReservationRecord>),
    /// Storage failure other than the missing-table signature (that one is
    /// consumed by the schema fallback and never surfaces here).
    Storage(StorageError),
}

impl BookingError {
    /// Terminal phase this error puts the request in.
    pub fn phase(&self) -> RequestPhase {
        match self {
            BookingError::Storage(_) => RequestPhase::Failed,
            _ => RequestPhase::Rejected,
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::BrandRequired => write!(f, "brand name is required"),
            BookingError::DateRequired(which) => write!(f, "{which} date is required"),
            BookingError::InvalidRange(e) => write!(f, "invalid date range: {e}"),
            BookingError::Conflict(record) => write!(
                f,
                "dates unavailable: conflicts with reservation {} ({} to {})",
                record.id, record.range.start, record.range.end
            ),
            BookingError::Storage(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BookingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookingError::InvalidRange(e) => Some(e),
            BookingError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RangeError> for BookingError {
    fn from(e: RangeError) -> Self {
        BookingError::InvalidRange(e)
    }
}

impl From<StorageError> for BookingError {
    fn from(e: StorageError) -> Self {
        BookingError::Storage(e)
    }
}
