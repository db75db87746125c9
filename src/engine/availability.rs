use chrono::NaiveDate;

use crate::model::{AssetWindow, AvailabilityVerdict, DateRange, ReservationRecord, Tone};

// ── Availability Algorithm ────────────────────────────────────────

/// First reservation blocking the candidate range, if any.
///
/// Cancelled/refunded records never participate. Short-circuits on the first
/// hit; traversal order is whatever the storage read returned.
pub fn find_conflict<'a>(
    reservations: &'a [ReservationRecord],
    candidate: &DateRange,
) -> Option<&'a ReservationRecord> {
    reservations
        .iter()
        .find(|r| r.status.is_active() && r.range.overlaps(candidate))
}

/// True iff no active reservation overlaps the candidate.
/// An empty reservation list is trivially available.
pub fn is_range_available(reservations: &[ReservationRecord], candidate: &DateRange) -> bool {
    find_conflict(reservations, candidate).is_none()
}

/// Human-facing status for list/browse views, without a candidate range.
///
/// Branch priorities, in order:
/// 1. no active reservations → "Available now"
/// 2. reference inside the earliest still-relevant booking → "Currently booked"
/// 3. earliest still-relevant booking is in the future → "Next booking <start>"
///    (the asset can still be booked up to that date, so the tone stays Available)
/// 4. active bookings exist but none is still relevant → "Limited availability",
///    a conservative fallback rather than a crash on stale or malformed data
pub fn describe_availability(
    reservations: &[ReservationRecord],
    reference: NaiveDate,
) -> AvailabilityVerdict {
    let mut active: Vec<&ReservationRecord> = reservations
        .iter()
        .filter(|r| r.status.is_active())
        .collect();

    if active.is_empty() {
        return available_now();
    }

    active.retain(|r| r.range.end >= reference);
    active.sort_by_key(|r| r.range.start);

    match active.first() {
        Some(next) if next.range.contains(reference) => AvailabilityVerdict {
            is_available: false,
            conflicting: Some((*next).clone()),
            label: "Currently booked".to_string(),
            tone: Tone::Busy,
        },
        Some(next) => AvailabilityVerdict {
            is_available: true,
            conflicting: None,
            label: format!("Next booking {}", next.range.start),
            tone: Tone::Available,
        },
        None => AvailabilityVerdict {
            is_available: false,
            conflicting: None,
            label: "Limited availability".to_string(),
            tone: Tone::Busy,
        },
    }
}

/// Verdict from a declared per-asset window. This path and the
/// reservation-derived path are mutually exclusive, selected by presence of
/// the window — never merged.
pub fn describe_window(window: &AssetWindow, reference: NaiveDate) -> AvailabilityVerdict {
    if let Some(from) = window.from
        && reference < from
    {
        return AvailabilityVerdict {
            is_available: false,
            conflicting: None,
            label: format!("Available from {from}"),
            tone: Tone::Busy,
        };
    }
    if let Some(to) = window.to
        && reference > to
    {
        return AvailabilityVerdict {
            is_available: false,
            conflicting: None,
            label: format!("Availability ended {to}"),
            tone: Tone::Busy,
        };
    }
    available_now()
}

fn available_now() -> AvailabilityVerdict {
    AvailabilityVerdict {
        is_available: true,
        conflicting: None,
        label: "Available now".to_string(),
        tone: Tone::Available,
    }
}
