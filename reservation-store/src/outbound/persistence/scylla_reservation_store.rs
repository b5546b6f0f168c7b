//! ScyllaDB/Cassandra-backed `ReservationStore` implementation.
//!
//! This adapter implements the domain's `ReservationStore` port over the
//! four denormalized tables. Writes and deletes go through atomic logged
//! batches so no observer sees a reservation present in one table and
//! absent in the other as a lasting state; the batch either fully lands or
//! fully fails. Failed batches are surfaced, never retried here — retry
//! policy belongs to the caller.

use async_trait::async_trait;
use chrono::NaiveDate;
use scylla::batch::{Batch, BatchType};
use scylla::transport::errors::{DbError, QueryError};
use scylla::QueryResult;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::domain::confirmation::{ConfirmationGenerator, RandomConfirmationGenerator};
use crate::domain::ports::{ReservationStore, StoreError};
use crate::domain::reservation::{ConfirmationNumber, HotelId, Reservation};

use super::models::{ReservationByConfirmationRow, ReservationByHotelDateRow};
use super::schema::{self, ReservationSchema};
use super::session::StoreSession;
use super::statements::StatementCache;

/// Upper bound on generate-then-probe rounds before giving up. With 36^6
/// candidates the second round is already vanishingly rare.
pub(crate) const MAX_CONFIRMATION_ATTEMPTS: u32 = 16;

/// ScyllaDB/Cassandra adapter for the reservation store port.
///
/// Holds the one long-lived session plus the prepared statements and the
/// confirmation generator. All of it is immutable after construction, so
/// the adapter is freely shared across tasks without locking.
pub struct ScyllaReservationStore {
    session: StoreSession,
    statements: StatementCache,
    generator: Box<dyn ConfirmationGenerator>,
}

impl ScyllaReservationStore {
    /// Connect, provision the schema, and prepare every statement.
    ///
    /// Provisioning is idempotent; with `config.drop_schema` the keyspace
    /// is destroyed and recreated first (opt-in, test environments only).
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] when the cluster cannot be reached,
    /// [`StoreError::Schema`] when provisioning fails.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::connect_with_generator(config, Box::new(RandomConfirmationGenerator)).await
    }

    /// [`connect`](Self::connect) with a caller-supplied confirmation
    /// generator.
    pub async fn connect_with_generator(
        config: &StoreConfig,
        generator: Box<dyn ConfirmationGenerator>,
    ) -> Result<Self, StoreError> {
        let schema = ReservationSchema::new(config.keyspace.clone(), config.replication_factor)?;
        let session = StoreSession::connect(config).await?;
        schema::provision(session.inner(), &schema, config.drop_schema).await?;
        let statements = StatementCache::prepare(session.inner(), &schema).await?;
        info!(keyspace = %schema.keyspace(), "reservation store initialized");
        Ok(Self {
            session,
            statements,
            generator,
        })
    }

    /// Probe generated candidates until one is unused.
    async fn unique_confirmation_number(&self) -> Result<ConfirmationNumber, StoreError> {
        allocate_confirmation_number(
            self.generator.as_ref(),
            MAX_CONFIRMATION_ATTEMPTS,
            |candidate| async move { self.exists(&candidate).await },
        )
        .await
    }

    fn rows_of(operation: &'static str, result: QueryResult) -> Result<Vec<Reservation>, StoreError> {
        let rows = result
            .into_rows_result()
            .map_err(|error| StoreError::query(operation, error.to_string()))?;
        let typed = rows
            .rows::<ReservationByConfirmationRow>()
            .map_err(|error| StoreError::query(operation, error.to_string()))?;
        let mut reservations = Vec::new();
        for row in typed {
            let row = row.map_err(|error| StoreError::query(operation, error.to_string()))?;
            reservations.push(row.into_domain()?);
        }
        Ok(reservations)
    }
}

#[async_trait]
impl ReservationStore for ScyllaReservationStore {
    async fn exists(&self, confirmation: &ConfirmationNumber) -> Result<bool, StoreError> {
        let result = self
            .session
            .inner()
            .execute_unpaged(&self.statements.exists_by_confirmation, (confirmation.as_str(),))
            .await
            .map_err(|error| map_query_error("exists", error))?;
        let rows = result
            .into_rows_result()
            .map_err(|error| StoreError::query("exists", error.to_string()))?;
        Ok(rows.rows_num() > 0)
    }

    async fn find_by_confirmation(
        &self,
        confirmation: &ConfirmationNumber,
    ) -> Result<Option<Reservation>, StoreError> {
        let result = self
            .session
            .inner()
            .execute_unpaged(&self.statements.find_by_confirmation, (confirmation.as_str(),))
            .await
            .map_err(|error| map_query_error("find_by_confirmation", error))?;
        let rows = result
            .into_rows_result()
            .map_err(|error| StoreError::query("find_by_confirmation", error.to_string()))?;
        let row = rows
            .maybe_first_row::<ReservationByConfirmationRow>()
            .map_err(|error| StoreError::query("find_by_confirmation", error.to_string()))?;
        match row {
            Some(row) => Ok(Some(row.into_domain()?)),
            None => {
                debug!(%confirmation, "no reservation for confirmation number");
                Ok(None)
            }
        }
    }

    async fn upsert(&self, reservation: &Reservation) -> Result<ConfirmationNumber, StoreError> {
        let confirmation = match reservation.confirmation_number() {
            Some(confirmation) => confirmation.clone(),
            None => self.unique_confirmation_number().await?,
        };

        let by_hotel_date = ReservationByHotelDateRow::from_domain(reservation, &confirmation);
        let by_confirmation =
            ReservationByConfirmationRow::from_domain(reservation, &confirmation);

        // One logged batch: the reservation becomes visible in both tables
        // or in neither.
        let mut batch = Batch::new(BatchType::Logged);
        batch.append_statement(self.statements.insert_by_hotel_date.clone());
        batch.append_statement(self.statements.insert_by_confirmation.clone());
        self.session
            .inner()
            .batch(&batch, (by_hotel_date, by_confirmation))
            .await
            .map_err(|error| map_query_error("upsert", error))?;

        debug!(%confirmation, hotel = %reservation.hotel_id(), "reservation upserted");
        Ok(confirmation)
    }

    async fn delete(&self, confirmation: &ConfirmationNumber) -> Result<bool, StoreError> {
        // The hotel-date table is keyed by (hotel_id, start_date,
        // room_number), so the full record is read first to address it.
        let Some(existing) = self.find_by_confirmation(confirmation).await? else {
            return Ok(false);
        };

        let mut batch = Batch::new(BatchType::Logged);
        batch.append_statement(self.statements.delete_by_confirmation.clone());
        batch.append_statement(self.statements.delete_by_hotel_date.clone());
        self.session
            .inner()
            .batch(
                &batch,
                (
                    (confirmation.as_str(),),
                    (
                        existing.hotel_id().as_str(),
                        existing.start_date(),
                        existing.room_number(),
                    ),
                ),
            )
            .await
            .map_err(|error| map_query_error("delete", error))?;

        debug!(%confirmation, "reservation deleted");
        Ok(true)
    }

    async fn find_all(&self) -> Result<Vec<Reservation>, StoreError> {
        let result = self
            .session
            .inner()
            .execute_unpaged(&self.statements.find_all, ())
            .await
            .map_err(|error| map_query_error("find_all", error))?;
        Self::rows_of("find_all", result)
    }

    async fn find_by_hotel_and_date(
        &self,
        hotel_id: &HotelId,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, StoreError> {
        let result = self
            .session
            .inner()
            .execute_unpaged(&self.statements.find_by_hotel_date, (hotel_id.as_str(), date))
            .await
            .map_err(|error| map_query_error("find_by_hotel_and_date", error))?;
        let rows = result
            .into_rows_result()
            .map_err(|error| StoreError::query("find_by_hotel_and_date", error.to_string()))?;
        let typed = rows
            .rows::<ReservationByHotelDateRow>()
            .map_err(|error| StoreError::query("find_by_hotel_and_date", error.to_string()))?;
        let mut reservations = Vec::new();
        for row in typed {
            let row = row
                .map_err(|error| StoreError::query("find_by_hotel_and_date", error.to_string()))?;
            reservations.push(row.into_domain()?);
        }
        Ok(reservations)
    }
}

/// Map driver execution failures to the domain error taxonomy.
///
/// Server-side overload and timeout responses, like client-side request
/// timeouts, are retryable [`StoreError::Unavailable`] outcomes — for
/// writes that means "unknown outcome", since the batch may still have
/// applied. Everything else is a plain query failure.
fn map_query_error(operation: &'static str, error: QueryError) -> StoreError {
    match error {
        QueryError::DbError(db, message) => match db {
            DbError::Unavailable { .. }
            | DbError::Overloaded { .. }
            | DbError::IsBootstrapping { .. }
            | DbError::ReadTimeout { .. }
            | DbError::WriteTimeout { .. } => StoreError::unavailable(operation, message),
            _ => StoreError::query(operation, message),
        },
        QueryError::TimeoutError { .. } | QueryError::RequestTimeout { .. } => {
            StoreError::unavailable(operation, error.to_string())
        }
        other => StoreError::query(operation, other.to_string()),
    }
}

/// Bounded generate-then-probe loop for a fresh confirmation number.
///
/// The probe and the eventual insert are not atomic; see the port
/// documentation for why that window is acceptable.
pub(crate) async fn allocate_confirmation_number<F, Fut>(
    generator: &dyn ConfirmationGenerator,
    max_attempts: u32,
    in_use: F,
) -> Result<ConfirmationNumber, StoreError>
where
    F: Fn(ConfirmationNumber) -> Fut,
    Fut: Future<Output = Result<bool, StoreError>>,
{
    for attempt in 1..=max_attempts {
        let candidate = generator.generate();
        if !in_use(candidate.clone()).await? {
            if attempt > 1 {
                debug!(attempt, "confirmation number allocated after collisions");
            }
            return Ok(candidate);
        }
        warn!(%candidate, attempt, "generated confirmation number already in use");
    }
    Err(StoreError::ConfirmationExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    use rstest::rstest;

    use super::*;
    use crate::domain::confirmation::MockConfirmationGenerator;

    fn number(raw: &str) -> ConfirmationNumber {
        ConfirmationNumber::new(raw).expect("valid confirmation number")
    }

    #[rstest]
    #[tokio::test]
    async fn first_free_candidate_is_taken() {
        let mut generator = MockConfirmationGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| number("AAAAAA"));

        let allocated =
            allocate_confirmation_number(&generator, MAX_CONFIRMATION_ATTEMPTS, |_| async {
                Ok(false)
            })
            .await
            .expect("allocation succeeds");
        assert_eq!(allocated.as_str(), "AAAAAA");
    }

    #[rstest]
    #[tokio::test]
    async fn collisions_are_retried_until_a_free_candidate() {
        let mut generator = MockConfirmationGenerator::new();
        let counter = AtomicU32::new(0);
        generator.expect_generate().times(3).returning(move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => number("TAKEN1"),
                1 => number("TAKEN2"),
                _ => number("FREE33"),
            }
        });
        let taken: HashSet<&str> = ["TAKEN1", "TAKEN2"].into();

        let allocated = allocate_confirmation_number(
            &generator,
            MAX_CONFIRMATION_ATTEMPTS,
            |candidate| {
                let taken = &taken;
                async move { Ok(taken.contains(candidate.as_str())) }
            },
        )
        .await
        .expect("allocation succeeds");
        assert_eq!(allocated.as_str(), "FREE33");
    }

    #[rstest]
    #[tokio::test]
    async fn exhaustion_is_an_explicit_error_not_a_livelock() {
        let mut generator = MockConfirmationGenerator::new();
        generator
            .expect_generate()
            .times(4)
            .returning(|| number("TAKEN1"));

        let err = allocate_confirmation_number(&generator, 4, |_| async { Ok(true) })
            .await
            .expect_err("space exhausted");
        assert_eq!(err, StoreError::ConfirmationExhausted { attempts: 4 });
    }

    #[rstest]
    #[tokio::test]
    async fn probe_failures_propagate_immediately() {
        let mut generator = MockConfirmationGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|| number("AAAAAA"));

        let err = allocate_confirmation_number(&generator, MAX_CONFIRMATION_ATTEMPTS, |_| async {
            Err(StoreError::unavailable("exists", "connection reset"))
        })
        .await
        .expect_err("probe failure propagates");
        assert!(err.is_retryable());
    }
}
