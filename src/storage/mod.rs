mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::model::{DateRange, ReservationRecord, ReservationStatus};

/// Current schema for booking requests.
pub const PRIMARY_TABLE: &str = "booking_requests";
/// Older deployments still serve this table instead.
pub const LEGACY_TABLE: &str = "billboard_bookings";

/// Postgres `undefined_table`.
const SCHEMA_MISSING_CODE: &str = "42P01";
const SCHEMA_MISSING_FRAGMENT: &str = "could not find the table";

/// Failure from the storage collaborator. `code` carries the backend's
/// machine-checkable error code when it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    pub code: Option<String>,
    pub message: String,
}

impl StorageError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// The error shape a backend raises when the target table is absent.
    pub fn schema_missing(table: &str) -> Self {
        Self {
            code: Some(SCHEMA_MISSING_CODE.to_string()),
            message: format!("could not find the table '{table}' in the schema"),
        }
    }

    /// The one fallback trigger: error code match OR case-insensitive
    /// substring match. Read and write paths share this predicate so they
    /// never disagree about which schema is authoritative.
    pub fn is_schema_missing(&self) -> bool {
        self.code.as_deref() == Some(SCHEMA_MISSING_CODE)
            || self.message.to_lowercase().contains(SCHEMA_MISSING_FRAGMENT)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "storage error [{code}]: {}", self.message),
            None => write!(f, "storage error: {}", self.message),
        }
    }
}

impl std::error::Error for StorageError {}

/// A reservation about to be persisted. `status: None` lets the primary
/// table apply its column default; the legacy table has no default, so the
/// fallback write sets it explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReservation {
    pub asset_id: Ulid,
    #[serde(flatten)]
    pub range: DateRange,
    pub brand_name: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
}

/// The two operations this core requires of its storage collaborator.
///
/// Read-after-write consistency is assumed: a row returned by
/// `insert_reservation` must be visible to the next `list_reservations` on
/// the same table, otherwise the coordinator's conflict check is meaningless.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn list_reservations(
        &self,
        table: &str,
        asset_id: Ulid,
    ) -> Result<Vec<ReservationRecord>, StorageError>;

    async fn insert_reservation(
        &self,
        table: &str,
        row: NewReservation,
    ) -> Result<ReservationRecord, StorageError>;
}

#[async_trait]
impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    async fn list_reservations(
        &self,
        table: &str,
        asset_id: Ulid,
    ) -> Result<Vec<ReservationRecord>, StorageError> {
        (**self).list_reservations(table, asset_id).await
    }

    async fn insert_reservation(
        &self,
        table: &str,
        row: NewReservation,
    ) -> Result<ReservationRecord, StorageError> {
        (**self).insert_reservation(table, row).await
    }
}

pub type MissingTableDetector = fn(&StorageError) -> bool;

/// Primary-then-legacy fallback chain over a [`StorageBackend`].
///
/// Callers see one read and one write operation; which table actually served
/// them is this gateway's business. Only the missing-table signature triggers
/// the fallback — every other failure propagates untouched, with no retry.
pub struct SchemaGateway<B> {
    backend: B,
    is_missing_table: MissingTableDetector,
}

impl<B: StorageBackend> SchemaGateway<B> {
    pub fn new(backend: B) -> Self {
        Self::with_detector(backend, |e| e.is_schema_missing())
    }

    /// Override the missing-table detection for backends with a different
    /// error shape. One predicate covers both the read and the write path.
    pub fn with_detector(backend: B, detector: MissingTableDetector) -> Self {
        Self {
            backend,
            is_missing_table: detector,
        }
    }

    pub async fn list_reservations_for_asset(
        &self,
        asset_id: Ulid,
    ) -> Result<Vec<ReservationRecord>, StorageError> {
        match self.backend.list_reservations(PRIMARY_TABLE, asset_id).await {
            Err(e) if (self.is_missing_table)(&e) => {
                debug!(%asset_id, "primary table absent, reading legacy table");
                self.backend.list_reservations(LEGACY_TABLE, asset_id).await
            }
            other => other,
        }
    }

    pub async fn insert_reservation(
        &self,
        mut row: NewReservation,
    ) -> Result<ReservationRecord, StorageError> {
        match self
            .backend
            .insert_reservation(PRIMARY_TABLE, row.clone())
            .await
        {
            Err(e) if (self.is_missing_table)(&e) => {
                debug!(asset_id = %row.asset_id, "primary table absent, retrying insert against legacy table");
                // The legacy table has no status default.
                row.status = Some(ReservationStatus::Pending);
                self.backend.insert_reservation(LEGACY_TABLE, row).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn new_reservation(asset_id: Ulid) -> NewReservation {
        NewReservation {
            asset_id,
            range: DateRange::new(day("2024-06-01"), day("2024-06-05")).unwrap(),
            brand_name: "Acme".into(),
            message: None,
            status: None,
        }
    }

    // ── detection predicate ────────────────────────────────

    #[test]
    fn schema_missing_by_code() {
        let e = StorageError::new(Some("42P01"), "relation does not exist");
        assert!(e.is_schema_missing());
    }

    #[test]
    fn schema_missing_by_substring_case_insensitive() {
        let e = StorageError::new(None, "Could Not Find The Table 'booking_requests'");
        assert!(e.is_schema_missing());
    }

    #[test]
    fn other_errors_are_not_schema_missing() {
        assert!(!StorageError::new(Some("23505"), "duplicate key").is_schema_missing());
        assert!(!StorageError::new(None, "permission denied").is_schema_missing());
    }

    #[test]
    fn schema_missing_constructor_matches_its_own_predicate() {
        assert!(StorageError::schema_missing(PRIMARY_TABLE).is_schema_missing());
    }

    // ── fallback chain over the in-memory backend ──────────

    #[tokio::test]
    async fn read_prefers_primary_table() {
        let backend = MemoryBackend::with_tables(&[PRIMARY_TABLE, LEGACY_TABLE]);
        let asset = Ulid::new();
        let gateway = SchemaGateway::new(backend);
        let stored = gateway.insert_reservation(new_reservation(asset)).await.unwrap();

        let rows = gateway.list_reservations_for_asset(asset).await.unwrap();
        assert_eq!(rows, vec![stored]);
    }

    #[tokio::test]
    async fn read_falls_back_to_legacy_when_primary_absent() {
        let backend = MemoryBackend::with_tables(&[LEGACY_TABLE]);
        let asset = Ulid::new();
        let gateway = SchemaGateway::new(backend);
        gateway.insert_reservation(new_reservation(asset)).await.unwrap();

        let rows = gateway.list_reservations_for_asset(asset).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn legacy_insert_carries_explicit_pending() {
        let backend = MemoryBackend::with_tables(&[LEGACY_TABLE]);
        let asset = Ulid::new();
        let gateway = SchemaGateway::new(backend);
        let stored = gateway.insert_reservation(new_reservation(asset)).await.unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn both_tables_absent_surfaces_plain_storage_error() {
        let backend = MemoryBackend::new();
        let gateway = SchemaGateway::new(backend);
        let err = gateway
            .insert_reservation(new_reservation(Ulid::new()))
            .await
            .unwrap_err();
        // The internal signal is spent; callers just see a storage failure.
        assert!(err.message.contains(LEGACY_TABLE));
    }

    #[tokio::test]
    async fn custom_detector_is_honored() {
        // A detector that never matches: the gateway must not fall back.
        let backend = MemoryBackend::with_tables(&[LEGACY_TABLE]);
        let gateway = SchemaGateway::with_detector(backend, |_| false);
        let err = gateway
            .insert_reservation(new_reservation(Ulid::new()))
            .await
            .unwrap_err();
        assert!(err.message.contains(PRIMARY_TABLE));
    }
}
