//! Physical schema descriptor and idempotent provisioning.
//!
//! One user-defined type and four tables, each keyed for a distinct access
//! pattern. Every creation statement is `IF NOT EXISTS`, so provisioning an
//! already-bootstrapped keyspace is a no-op; the destructive drop-first
//! path is opt-in via configuration and never the default.
//!
//! Column names and key structure are the storage contract — changing them
//! requires a migration.

use scylla::transport::errors::QueryError;
use scylla::Session;
use tracing::{debug, info, warn};

use crate::domain::ports::StoreError;

/// User-defined type storing one postal address.
pub const TYPE_ADDRESS: &str = "address";
/// Point-lookup table, keyed by confirmation number alone.
pub const TABLE_RESERVATIONS_BY_CONFIRMATION: &str = "reservations_by_confirmation";
/// Search table, keyed by hotel and start date, clustered by room.
pub const TABLE_RESERVATIONS_BY_HOTEL_DATE: &str = "reservations_by_hotel_date";
/// Guest-name table, provisioned for future queries but not read today.
pub const TABLE_RESERVATIONS_BY_GUEST: &str = "reservations_by_guest";
/// Guest profile table.
pub const TABLE_GUESTS: &str = "guests";

/// `hotel_id text` column.
pub const HOTEL_ID: &str = "hotel_id";
/// `start_date date` column.
pub const START_DATE: &str = "start_date";
/// `end_date date` column.
pub const END_DATE: &str = "end_date";
/// `room_number smallint` column.
pub const ROOM_NUMBER: &str = "room_number";
/// `confirmation_number text` column.
pub const CONFIRMATION_NUMBER: &str = "confirmation_number";
/// `guest_id uuid` column.
pub const GUEST_ID: &str = "guest_id";
/// `guest_last_name text` column.
pub const GUEST_LAST_NAME: &str = "guest_last_name";

/// Immutable schema descriptor: the keyspace the tables live in and the
/// replication factor used when it is first created.
///
/// Constructed once at startup and passed by reference to the schema,
/// statement, and mapping code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationSchema {
    keyspace: String,
    replication_factor: u8,
}

impl ReservationSchema {
    /// Validate the keyspace name and build the descriptor.
    ///
    /// Keyspace names are interpolated into DDL/DML text, so only
    /// `[A-Za-z][A-Za-z0-9_]*` up to 48 characters is accepted; the name is
    /// stored lowercased, matching how the store folds unquoted
    /// identifiers.
    pub fn new(
        keyspace: impl Into<String>,
        replication_factor: u8,
    ) -> Result<Self, StoreError> {
        let raw = keyspace.into();
        let valid = !raw.is_empty()
            && raw.len() <= 48
            && raw.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(StoreError::schema(format!(
                "keyspace name {raw:?} is not a valid unquoted identifier"
            )));
        }
        if replication_factor == 0 {
            return Err(StoreError::schema("replication factor must be at least 1"));
        }
        Ok(Self {
            keyspace: raw.to_ascii_lowercase(),
            replication_factor,
        })
    }

    /// Keyspace the reservation tables live in.
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Qualify a table name with the keyspace for DML text.
    pub(crate) fn qualified(&self, table: &str) -> String {
        format!("{}.{table}", self.keyspace)
    }

    fn create_keyspace_cql(&self) -> String {
        format!(
            "CREATE KEYSPACE IF NOT EXISTS {} \
             WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
            self.keyspace, self.replication_factor
        )
    }

    fn drop_keyspace_cql(&self) -> String {
        format!("DROP KEYSPACE IF EXISTS {}", self.keyspace)
    }

    fn create_type_address_cql(&self) -> String {
        format!(
            "CREATE TYPE IF NOT EXISTS {TYPE_ADDRESS} (\
             street text, \
             city text, \
             state_or_province text, \
             postal_code text, \
             country text)"
        )
    }

    fn create_reservations_by_hotel_date_cql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {TABLE_RESERVATIONS_BY_HOTEL_DATE} (\
             {HOTEL_ID} text, \
             {START_DATE} date, \
             {END_DATE} date, \
             {ROOM_NUMBER} smallint, \
             {CONFIRMATION_NUMBER} text, \
             {GUEST_ID} uuid, \
             PRIMARY KEY (({HOTEL_ID}, {START_DATE}), {ROOM_NUMBER})) \
             WITH CLUSTERING ORDER BY ({ROOM_NUMBER} ASC) \
             AND comment = 'Find reservations by hotel and date'"
        )
    }

    fn create_reservations_by_confirmation_cql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {TABLE_RESERVATIONS_BY_CONFIRMATION} (\
             {CONFIRMATION_NUMBER} text PRIMARY KEY, \
             {HOTEL_ID} text, \
             {START_DATE} date, \
             {END_DATE} date, \
             {ROOM_NUMBER} smallint, \
             {GUEST_ID} uuid)"
        )
    }

    fn create_reservations_by_guest_cql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {TABLE_RESERVATIONS_BY_GUEST} (\
             {GUEST_LAST_NAME} text, \
             {HOTEL_ID} text, \
             {START_DATE} date, \
             {END_DATE} date, \
             {ROOM_NUMBER} smallint, \
             {CONFIRMATION_NUMBER} text, \
             {GUEST_ID} uuid, \
             PRIMARY KEY (({GUEST_LAST_NAME}), {HOTEL_ID})) \
             WITH comment = 'Find reservations by guest name'"
        )
    }

    fn create_guests_cql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {TABLE_GUESTS} (\
             {GUEST_ID} uuid PRIMARY KEY, \
             first_name text, \
             last_name text, \
             title text, \
             emails set<text>, \
             phone_numbers list<text>, \
             addresses map<text, frozen<{TYPE_ADDRESS}>>, \
             {CONFIRMATION_NUMBER} text) \
             WITH comment = 'Find guest by ID'"
        )
    }

    /// In-keyspace DDL in dependency order: the address type first, since
    /// the guests table embeds it.
    pub(crate) fn ddl(&self) -> Vec<String> {
        vec![
            self.create_type_address_cql(),
            self.create_reservations_by_hotel_date_cql(),
            self.create_reservations_by_confirmation_cql(),
            self.create_reservations_by_guest_cql(),
            self.create_guests_cql(),
        ]
    }
}

/// Make the physical schema present, creating the keyspace, the address
/// type, and all four tables if absent. Re-running against a provisioned
/// keyspace is a no-op and leaves data intact.
///
/// With `drop_first` the keyspace is dropped before recreation — every
/// reservation is lost. That path exists for clean-slate test environments
/// and must stay opt-in.
///
/// # Errors
///
/// Any failure other than "already exists" surfaces as
/// [`StoreError::Schema`]; schema failures are fatal at startup.
pub async fn provision(
    session: &Session,
    schema: &ReservationSchema,
    drop_first: bool,
) -> Result<(), StoreError> {
    if drop_first {
        warn!(keyspace = %schema.keyspace(), "dropping keyspace before recreation");
        session
            .query_unpaged(schema.drop_keyspace_cql(), ())
            .await
            .map_err(map_schema_error)?;
    }

    session
        .query_unpaged(schema.create_keyspace_cql(), ())
        .await
        .map_err(map_schema_error)?;
    session
        .use_keyspace(schema.keyspace(), false)
        .await
        .map_err(map_schema_error)?;

    for ddl in schema.ddl() {
        debug!(statement = %ddl, "applying schema statement");
        session
            .query_unpaged(ddl, ())
            .await
            .map_err(map_schema_error)?;
    }

    info!(keyspace = %schema.keyspace(), "schema initialized");
    Ok(())
}

/// Map driver failures during provisioning to the domain error taxonomy.
fn map_schema_error(error: QueryError) -> StoreError {
    StoreError::schema(error.to_string())
}
