use chrono::NaiveDate;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::model::{AssetWindow, AvailabilityVerdict, DateRange, ReservationRecord};
use crate::storage::{NewReservation, SchemaGateway, StorageBackend, StorageError};

use super::availability::{describe_availability, describe_window, find_conflict};
use super::error::{BookingError, RequestPhase};

/// A booking request exactly as the UI boundary supplies it: raw
/// `YYYY-MM-DD` strings and a free-form brand name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub asset_id: Ulid,
    pub brand_name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub message: Option<String>,
}

/// Validates and commits booking requests against whichever storage schema
/// is live.
///
/// Each submit walks `Validating -> Checking -> Committing -> Committed`,
/// exiting to `Rejected` or `Failed` (see [`BookingError::phase`]). State is
/// local to the call; an abandoned request needs no cleanup.
///
/// The Checking/Committing sequence is a check-then-act: two concurrent
/// clients can both pass Checking for overlapping ranges. True
/// conflict-freedom needs a serializing check-and-insert at the storage
/// layer (an exclusion constraint or a per-asset lock); this coordinator
/// matches the behavior of the system it models and does not serialize.
/// It does rely on read-after-write: a committed row must be visible to the
/// next Checking read, which is what rejects an identical resubmit.
pub struct BookingCoordinator<B> {
    gateway: SchemaGateway<B>,
}

impl<B: StorageBackend> BookingCoordinator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            gateway: SchemaGateway::new(backend),
        }
    }

    /// Use a gateway with a non-default missing-table detector.
    pub fn with_gateway(gateway: SchemaGateway<B>) -> Self {
        Self { gateway }
    }

    pub async fn submit(&self, request: BookingRequest) -> Result<ReservationRecord, BookingError> {
        debug!(
            asset_id = %request.asset_id,
            phase = %RequestPhase::Validating,
            "booking request received"
        );
        let range = validate(&request)?;

        debug!(
            asset_id = %request.asset_id,
            phase = %RequestPhase::Checking,
            "fetching current reservations"
        );
        let reservations = self
            .gateway
            .list_reservations_for_asset(request.asset_id)
            .await?;
        if let Some(conflict) = find_conflict(&reservations, &range) {
            debug!(
                asset_id = %request.asset_id,
                conflict_id = %conflict.id,
                "candidate range unavailable"
            );
            return Err(BookingError::Conflict(Box::new(conflict.clone())));
        }

        debug!(
            asset_id = %request.asset_id,
            phase = %RequestPhase::Committing,
            "persisting reservation"
        );
        let stored = self
            .gateway
            .insert_reservation(NewReservation {
                asset_id: request.asset_id,
                range,
                brand_name: request.brand_name.trim().to_string(),
                message: request.message,
                status: None,
            })
            .await
            .map_err(|e| {
                warn!(asset_id = %request.asset_id, error = %e, "reservation insert failed");
                e
            })?;

        debug!(
            reservation_id = %stored.id,
            phase = %RequestPhase::Committed,
            "booking committed"
        );
        Ok(stored)
    }

    /// Browse-view verdict for an asset. A declared availability window takes
    /// precedence over the reservation-derived verdict; otherwise current
    /// state is re-fetched on every call — no caching, stale conflicts are
    /// worse than an extra read.
    pub async fn availability(
        &self,
        asset_id: Ulid,
        window: Option<&AssetWindow>,
        reference: NaiveDate,
    ) -> Result<AvailabilityVerdict, StorageError> {
        if let Some(w) = window
            && w.is_declared()
        {
            return Ok(describe_window(w, reference));
        }
        let reservations = self.gateway.list_reservations_for_asset(asset_id).await?;
        Ok(describe_availability(&reservations, reference))
    }

    /// Form-level pre-check: the record blocking `range`, if any.
    pub async fn check_range(
        &self,
        asset_id: Ulid,
        range: &DateRange,
    ) -> Result<Option<ReservationRecord>, StorageError> {
        let reservations = self.gateway.list_reservations_for_asset(asset_id).await?;
        Ok(find_conflict(&reservations, range).cloned())
    }
}

/// Local, synchronous validation — runs before any I/O.
fn validate(request: &BookingRequest) -> Result<DateRange, BookingError> {
    if request.brand_name.trim().is_empty() {
        return Err(BookingError::BrandRequired);
    }
    let start = request
        .start_date
        .as_deref()
        .ok_or(BookingError::DateRequired("start"))?;
    let end = request
        .end_date
        .as_deref()
        .ok_or(BookingError::DateRequired("end"))?;
    Ok(DateRange::from_bounds(start, end)?)
}
