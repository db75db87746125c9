mod availability;
mod coordinator;
mod error;

pub use availability::{describe_availability, describe_window, find_conflict, is_range_available};
pub use coordinator::{BookingCoordinator, BookingRequest};
pub use error::{BookingError, RequestPhase};
