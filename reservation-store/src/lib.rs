//! Reservation data-access library modules.

pub mod config;
pub mod domain;
pub mod outbound;

/// Connection descriptor consumed by the persistence adapter.
pub use config::StoreConfig;
/// Domain aggregate and port surface re-exported for callers.
pub use domain::{ConfirmationNumber, Reservation, ReservationStore, StoreError};
/// ScyllaDB-backed implementation of the reservation store port.
pub use outbound::persistence::ScyllaReservationStore;
