use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Inclusive calendar-day interval `[start, end]`.
///
/// All date math happens in whole days; a `NaiveDate` here means the whole
/// UTC day, so clients in different timezones agree on what is booked.
/// Serializes flat as `start_date`/`end_date` to match storage rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "start_date")]
    pub start: NaiveDate,
    #[serde(rename = "end_date")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse one `YYYY-MM-DD` day into a single-day range.
    ///
    /// Fails on anything that doesn't split into exactly three numeric parts
    /// naming a real calendar date — never silently defaults.
    pub fn parse(raw: &str) -> Result<Self, RangeError> {
        let day = parse_day(raw)?;
        Ok(Self { start: day, end: day })
    }

    /// Parse both bounds and build the range.
    pub fn from_bounds(start_raw: &str, end_raw: &str) -> Result<Self, RangeError> {
        Self::new(parse_day(start_raw)?, parse_day(end_raw)?)
    }

    /// Inclusive boundary semantics: a booking ending on day N and one
    /// starting on day N conflict — billboards are exclusive for the whole day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whole days between start and end, floored at zero.
    pub fn duration_in_days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, RangeError> {
    let raw = raw.trim();
    let malformed = || RangeError::Malformed(raw.to_string());

    let parts: Vec<&str> = raw.split('-').collect();
    if parts.len() != 3 {
        return Err(malformed());
    }
    let year: i32 = parts[0].parse().map_err(|_| malformed())?;
    let month: u32 = parts[1].parse().map_err(|_| malformed())?;
    let day: u32 = parts[2].parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Input didn't look like `YYYY-MM-DD` or named an impossible date.
    Malformed(String),
    /// `end` before `start`.
    Inverted { start: NaiveDate, end: NaiveDate },
}

impl std::fmt::Display for RangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeError::Malformed(raw) => write!(f, "malformed date: {raw:?}"),
            RangeError::Inverted { start, end } => {
                write!(f, "range end {end} is before start {start}")
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// Reservation lifecycle. Transitions are owned by an external approval
/// workflow — this crate only reads status snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
}

impl ReservationStatus {
    /// Cancelled/refunded records are soft-deleted for scheduling purposes
    /// (kept for audit, ignored by conflict checks).
    pub fn is_active(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled | ReservationStatus::Refunded)
    }
}

/// One existing or proposed booking against a billboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: Ulid,
    pub asset_id: Ulid,
    #[serde(flatten)]
    pub range: DateRange,
    pub status: ReservationStatus,
    pub brand_name: String,
    #[serde(default)]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Declared per-asset availability bounds, independent of reservations.
/// When present, this window decides the verdict instead of the booking list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AssetWindow {
    pub fn is_declared(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

/// Coarse UI signal derived from the full availability label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Available,
    Busy,
}

/// Human-facing availability state. Computed on demand, never persisted —
/// recompute whenever the candidate range or the reservation set changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityVerdict {
    pub is_available: bool,
    pub conflicting: Option<ReservationRecord>,
    pub label: String,
    pub tone: Tone,
}
