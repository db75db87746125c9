use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{ReservationRecord, ReservationStatus};

use super::{NewReservation, StorageBackend, StorageError};

/// In-memory backend over a table-name → rows map.
///
/// Reference implementation and test double. Tables must be created
/// explicitly so a test can model any deployment shape — primary only,
/// legacy only, or neither. Reads observe prior writes immediately.
pub struct MemoryBackend {
    tables: DashMap<String, Vec<ReservationRecord>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    pub fn with_tables(names: &[&str]) -> Self {
        let backend = Self::new();
        for name in names {
            backend.create_table(name);
        }
        backend
    }

    pub fn create_table(&self, name: &str) {
        self.tables.entry(name.to_string()).or_default();
    }

    /// Insert a pre-built row, e.g. existing reservations in a test fixture.
    pub fn seed(&self, table: &str, record: ReservationRecord) {
        self.tables.entry(table.to_string()).or_default().push(record);
    }

    pub fn rows(&self, table: &str) -> Vec<ReservationRecord> {
        self.tables
            .get(table)
            .map(|rows| rows.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn list_reservations(
        &self,
        table: &str,
        asset_id: Ulid,
    ) -> Result<Vec<ReservationRecord>, StorageError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| StorageError::schema_missing(table))?;
        Ok(rows
            .iter()
            .filter(|r| r.asset_id == asset_id)
            .cloned()
            .collect())
    }

    async fn insert_reservation(
        &self,
        table: &str,
        row: NewReservation,
    ) -> Result<ReservationRecord, StorageError> {
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| StorageError::schema_missing(table))?;
        let record = ReservationRecord {
            id: Ulid::new(),
            asset_id: row.asset_id,
            range: row.range,
            // Column default on the primary table; explicit on legacy writes.
            status: row.status.unwrap_or(ReservationStatus::Pending),
            brand_name: row.brand_name,
            message: row.message,
            created_at: Utc::now(),
        };
        rows.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateRange;
    use chrono::NaiveDate;

    fn day(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn row(asset_id: Ulid, status: Option<ReservationStatus>) -> NewReservation {
        NewReservation {
            asset_id,
            range: DateRange::new(day("2024-06-01"), day("2024-06-05")).unwrap(),
            brand_name: "Acme".into(),
            message: None,
            status,
        }
    }

    #[tokio::test]
    async fn missing_table_yields_schema_missing_shape() {
        let backend = MemoryBackend::new();
        let err = backend
            .list_reservations("booking_requests", Ulid::new())
            .await
            .unwrap_err();
        assert!(err.is_schema_missing());
        assert_eq!(err.code.as_deref(), Some("42P01"));
    }

    #[tokio::test]
    async fn list_filters_by_asset() {
        let backend = MemoryBackend::with_tables(&["booking_requests"]);
        let a = Ulid::new();
        let b = Ulid::new();
        backend.insert_reservation("booking_requests", row(a, None)).await.unwrap();
        backend.insert_reservation("booking_requests", row(b, None)).await.unwrap();

        let rows = backend.list_reservations("booking_requests", a).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].asset_id, a);
    }

    #[tokio::test]
    async fn insert_applies_status_default_and_override() {
        let backend = MemoryBackend::with_tables(&["booking_requests"]);
        let asset = Ulid::new();

        let defaulted = backend
            .insert_reservation("booking_requests", row(asset, None))
            .await
            .unwrap();
        assert_eq!(defaulted.status, ReservationStatus::Pending);

        let explicit = backend
            .insert_reservation("booking_requests", row(asset, Some(ReservationStatus::Confirmed)))
            .await
            .unwrap();
        assert_eq!(explicit.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn read_observes_prior_write() {
        let backend = MemoryBackend::with_tables(&["booking_requests"]);
        let asset = Ulid::new();
        let stored = backend
            .insert_reservation("booking_requests", row(asset, None))
            .await
            .unwrap();
        let rows = backend.list_reservations("booking_requests", asset).await.unwrap();
        assert_eq!(rows, vec![stored]);
    }
}
