//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters.
//! The single port here is the reservation store; it exposes strongly typed
//! errors so adapters map their failures into predictable variants instead
//! of returning `anyhow::Result`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::reservation::{ConfirmationNumber, HotelId, Reservation};

/// Errors surfaced by [`ReservationStore`] adapters.
///
/// Absence of a record is never an error: lookups return `Option`/`bool`
/// and searches return an empty `Vec`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The caller handed the operation input it refuses to execute with.
    #[error("{operation} rejected an invalid argument: {message}")]
    InvalidArgument {
        /// Operation that rejected the input.
        operation: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// The cluster could not be reached or did not answer within budget.
    ///
    /// Retryable by the caller; a timed-out write may still have applied
    /// (unknown outcome), so retries must tolerate duplicates.
    #[error("store unreachable during {operation}: {message}")]
    Unavailable {
        /// Operation in flight when the store went away.
        operation: &'static str,
        /// Driver-level detail.
        message: String,
    },
    /// The store answered but the request failed or its result could not be
    /// decoded.
    #[error("{operation} failed at the store: {message}")]
    Query {
        /// Operation that failed.
        operation: &'static str,
        /// Driver-level detail.
        message: String,
    },
    /// Schema provisioning failed for a reason other than "already exists".
    /// Fatal at startup, not recoverable in-process.
    #[error("schema provisioning failed: {message}")]
    Schema {
        /// Driver-level detail.
        message: String,
    },
    /// Every generated candidate was already taken. Practically unreachable
    /// given the generator's keyspace; surfaced instead of looping forever.
    #[error("no unused confirmation number found after {attempts} attempts")]
    ConfirmationExhausted {
        /// How many candidates were probed before giving up.
        attempts: u32,
    },
}

impl StoreError {
    /// Helper for invalid-argument rejections.
    pub fn invalid_argument(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation,
            message: message.into(),
        }
    }

    /// Helper for connectivity and timeout failures.
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            message: message.into(),
        }
    }

    /// Helper for execution and decoding failures.
    pub fn query(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Query {
            operation,
            message: message.into(),
        }
    }

    /// Helper for schema provisioning failures.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Whether the caller may reasonably retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Persistence port for the denormalized reservation tables.
///
/// Implementations own the invariant that `reservations_by_confirmation`
/// and `reservations_by_hotel_date` describe the same set of facts: every
/// write and delete touches both tables atomically, and no other component
/// writes to either table.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Whether a reservation with this confirmation number exists.
    async fn exists(&self, confirmation: &ConfirmationNumber) -> Result<bool, StoreError>;

    /// Point lookup by confirmation number. `Ok(None)` is the normal
    /// not-found outcome, also used internally as an existence probe.
    async fn find_by_confirmation(
        &self,
        confirmation: &ConfirmationNumber,
    ) -> Result<Option<Reservation>, StoreError>;

    /// Write the reservation to both reservation tables in one atomic
    /// logged batch and return its confirmation number.
    ///
    /// When the reservation carries no confirmation number, a fresh one is
    /// generated and probed for uniqueness first. The probe and the insert
    /// are not atomic — a concurrent upsert could land the same number in
    /// between — but the generator's 36^6 space makes that a negligible
    /// soft race (worst case: one upsert overwrites the other), so it is
    /// deliberately not closed with a conditional write.
    ///
    /// Concurrent upserts of the same confirmation number race; the last
    /// batch to commit wins.
    async fn upsert(&self, reservation: &Reservation) -> Result<ConfirmationNumber, StoreError>;

    /// Remove the reservation from both tables in one atomic logged batch.
    /// Returns `Ok(false)`, with no side effects, when it does not exist.
    async fn delete(&self, confirmation: &ConfirmationNumber) -> Result<bool, StoreError>;

    /// Every reservation, scanned from the confirmation-keyed table (one
    /// row per reservation). Unpaged: callers tolerate unbounded results
    /// or impose paging externally.
    async fn find_all(&self) -> Result<Vec<Reservation>, StoreError>;

    /// Reservations for one hotel on one start date; a single-partition
    /// query. An empty result is a normal outcome.
    async fn find_by_hotel_and_date(
        &self,
        hotel_id: &HotelId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError>;
}
