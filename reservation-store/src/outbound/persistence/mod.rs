//! ScyllaDB/Cassandra persistence adapter for the reservation store port.
//!
//! The store has no cross-partition secondary indexes, so every query shape
//! gets its own physical table and the adapter keeps them in sync by
//! routing all writes and deletes through atomic logged batches. Raw
//! per-table write operations are never exposed.
//!
//! # Architecture
//!
//! - **Immutable schema descriptor**: table and column identifiers live in
//!   [`schema::ReservationSchema`], built once at startup and passed by
//!   reference — never process-wide mutable globals.
//! - **Prepared once, bound per call**: [`statements::StatementCache`]
//!   prepares each operation a single time per store lifetime.
//! - **Internal row models**: per-table row structs (`models`) are
//!   implementation details, never exposed to the domain layer.
//! - **Strongly typed errors**: every driver failure is mapped to a
//!   [`StoreError`](crate::domain::StoreError) variant carrying the
//!   operation name.

mod models;
mod schema;
mod scylla_reservation_store;
mod session;
mod statements;

pub use schema::{provision, ReservationSchema};
pub use scylla_reservation_store::ScyllaReservationStore;
pub use session::StoreSession;
