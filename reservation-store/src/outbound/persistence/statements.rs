//! Prepared-statement cache for the reservation tables.
//!
//! Each CRUD/query operation is prepared exactly once per store lifetime
//! and bound at call time, so query text is parsed by the cluster a single
//! time. Binding with the wrong arity or types fails fast inside the driver
//! as a serialization error; no business validation happens here.

use scylla::prepared_statement::PreparedStatement;
use scylla::statement::Consistency;
use scylla::transport::errors::QueryError;
use scylla::Session;

use super::schema::{
    ReservationSchema, CONFIRMATION_NUMBER, END_DATE, GUEST_ID, HOTEL_ID, ROOM_NUMBER, START_DATE,
    TABLE_RESERVATIONS_BY_CONFIRMATION, TABLE_RESERVATIONS_BY_HOTEL_DATE,
};
use crate::domain::ports::StoreError;

/// Rendered CQL text for every operation, one field per prepared statement.
///
/// Kept separate from preparation so the text itself stays unit-testable
/// without a running cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatementTexts {
    pub exists_by_confirmation: String,
    pub find_by_confirmation: String,
    pub find_all: String,
    pub find_by_hotel_date: String,
    pub insert_by_hotel_date: String,
    pub insert_by_confirmation: String,
    pub delete_by_confirmation: String,
    pub delete_by_hotel_date: String,
}

impl StatementTexts {
    /// Render the DML for the descriptor's keyspace.
    pub(crate) fn render(schema: &ReservationSchema) -> Self {
        let by_confirmation = schema.qualified(TABLE_RESERVATIONS_BY_CONFIRMATION);
        let by_hotel_date = schema.qualified(TABLE_RESERVATIONS_BY_HOTEL_DATE);
        let columns = format!(
            "{HOTEL_ID}, {START_DATE}, {END_DATE}, {ROOM_NUMBER}, {CONFIRMATION_NUMBER}, {GUEST_ID}"
        );

        Self {
            exists_by_confirmation: format!(
                "SELECT {CONFIRMATION_NUMBER} FROM {by_confirmation} \
                 WHERE {CONFIRMATION_NUMBER} = ?"
            ),
            find_by_confirmation: format!(
                "SELECT {columns} FROM {by_confirmation} WHERE {CONFIRMATION_NUMBER} = ?"
            ),
            find_all: format!("SELECT {columns} FROM {by_confirmation}"),
            find_by_hotel_date: format!(
                "SELECT {columns} FROM {by_hotel_date} \
                 WHERE {HOTEL_ID} = ? AND {START_DATE} = ?"
            ),
            insert_by_hotel_date: format!(
                "INSERT INTO {by_hotel_date} \
                 ({HOTEL_ID}, {START_DATE}, {END_DATE}, {ROOM_NUMBER}, {CONFIRMATION_NUMBER}, {GUEST_ID}) \
                 VALUES (?, ?, ?, ?, ?, ?)"
            ),
            insert_by_confirmation: format!(
                "INSERT INTO {by_confirmation} \
                 ({CONFIRMATION_NUMBER}, {HOTEL_ID}, {START_DATE}, {END_DATE}, {ROOM_NUMBER}, {GUEST_ID}) \
                 VALUES (?, ?, ?, ?, ?, ?)"
            ),
            delete_by_confirmation: format!(
                "DELETE FROM {by_confirmation} WHERE {CONFIRMATION_NUMBER} = ?"
            ),
            delete_by_hotel_date: format!(
                "DELETE FROM {by_hotel_date} \
                 WHERE {HOTEL_ID} = ? AND {START_DATE} = ? AND {ROOM_NUMBER} = ?"
            ),
        }
    }
}

/// Every operation, prepared once against the session.
pub(crate) struct StatementCache {
    pub exists_by_confirmation: PreparedStatement,
    pub find_by_confirmation: PreparedStatement,
    pub find_all: PreparedStatement,
    pub find_by_hotel_date: PreparedStatement,
    pub insert_by_hotel_date: PreparedStatement,
    pub insert_by_confirmation: PreparedStatement,
    pub delete_by_confirmation: PreparedStatement,
    pub delete_by_hotel_date: PreparedStatement,
}

impl StatementCache {
    /// Prepare all operations.
    ///
    /// The two listing statements run at [`Consistency::One`]: both tolerate
    /// slightly stale rows in exchange for answering from a single replica.
    /// Everything else inherits the session default.
    pub(crate) async fn prepare(
        session: &Session,
        schema: &ReservationSchema,
    ) -> Result<Self, StoreError> {
        let texts = StatementTexts::render(schema);

        let mut find_all = prepare_one(session, "find_all", texts.find_all).await?;
        find_all.set_consistency(Consistency::One);
        let mut find_by_hotel_date =
            prepare_one(session, "find_by_hotel_and_date", texts.find_by_hotel_date).await?;
        find_by_hotel_date.set_consistency(Consistency::One);

        Ok(Self {
            exists_by_confirmation: prepare_one(
                session,
                "exists",
                texts.exists_by_confirmation,
            )
            .await?,
            find_by_confirmation: prepare_one(
                session,
                "find_by_confirmation",
                texts.find_by_confirmation,
            )
            .await?,
            find_all,
            find_by_hotel_date,
            insert_by_hotel_date: prepare_one(session, "upsert", texts.insert_by_hotel_date)
                .await?,
            insert_by_confirmation: prepare_one(
                session,
                "upsert",
                texts.insert_by_confirmation,
            )
            .await?,
            delete_by_confirmation: prepare_one(
                session,
                "delete",
                texts.delete_by_confirmation,
            )
            .await?,
            delete_by_hotel_date: prepare_one(session, "delete", texts.delete_by_hotel_date)
                .await?,
        })
    }
}

async fn prepare_one(
    session: &Session,
    operation: &'static str,
    text: String,
) -> Result<PreparedStatement, StoreError> {
    session
        .prepare(text)
        .await
        .map_err(|error: QueryError| StoreError::query(operation, error.to_string()))
}
