//! Domain primitives and ports.
//!
//! Purpose: define the strongly typed reservation aggregate shared by every
//! denormalized projection, together with the ports the persistence adapter
//! implements. Keep types immutable and document invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Reservation (alias to `reservation::Reservation`) — the logical record.
//! - ConfirmationNumber / HotelId — validated identifier newtypes.
//! - ReservationStore (alias to `ports::ReservationStore`) — persistence port.
//! - ConfirmationGenerator — confirmation-number source port.

pub mod confirmation;
pub mod ports;
pub mod reservation;

pub use self::confirmation::{ConfirmationGenerator, RandomConfirmationGenerator};
pub use self::ports::{ReservationStore, StoreError};
pub use self::reservation::{
    ConfirmationNumber, HotelId, Reservation, ReservationValidationError,
};
