pub mod engine;
pub mod model;
pub mod storage;

pub use engine::{BookingCoordinator, BookingError, BookingRequest, RequestPhase};
pub use model::{
    AssetWindow, AvailabilityVerdict, DateRange, RangeError, ReservationRecord,
    ReservationStatus, Tone,
};
pub use storage::{MemoryBackend, NewReservation, SchemaGateway, StorageBackend, StorageError};
