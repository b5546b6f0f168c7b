//! Store connection descriptor and bootstrap options.
//!
//! Everything the persistence adapter consumes from its environment lives
//! here: contact point, datacenter, keyspace, the destructive drop flag,
//! replication factor, default consistency, and the per-request timeout.
//! The struct doubles as a CLI/environment parser (clap) and a file-based
//! configuration section (serde).

use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Deserialize;

/// Tunable consistency level applied as the session default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsistencyLevel {
    /// One replica acknowledges.
    One,
    /// One replica in the local datacenter acknowledges.
    LocalOne,
    /// A quorum of replicas acknowledges.
    Quorum,
    /// A quorum within the local datacenter acknowledges.
    LocalQuorum,
    /// Every replica acknowledges.
    All,
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::One => "one",
            Self::LocalOne => "local-one",
            Self::Quorum => "quorum",
            Self::LocalQuorum => "local-quorum",
            Self::All => "all",
        })
    }
}

/// Connection descriptor for the reservation store.
///
/// # Example
///
/// ```
/// use clap::Parser;
/// use reservation_store::StoreConfig;
///
/// let config = StoreConfig::parse_from(["store", "--keyspace", "reservation_test"]);
/// assert_eq!(config.keyspace, "reservation_test");
/// assert!(!config.drop_schema);
/// ```
#[derive(Debug, Clone, Parser, Deserialize)]
#[command(name = "reservation-store", about = "Reservation store connection options")]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StoreConfig {
    /// Contact point hostname.
    #[arg(long, env = "RESERVATION_STORE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Contact point port.
    #[arg(long, env = "RESERVATION_STORE_PORT", default_value_t = 9042)]
    pub port: u16,

    /// Logical datacenter the driver should prefer for routing.
    #[arg(long, env = "RESERVATION_STORE_DATACENTER", default_value = "datacenter1")]
    pub datacenter: String,

    /// Keyspace holding the reservation tables.
    #[arg(long, env = "RESERVATION_STORE_KEYSPACE", default_value = "reservation")]
    pub keyspace: String,

    /// Drop the keyspace before recreating it on startup. Destructive:
    /// every reservation is lost. Opt-in, never the default.
    #[arg(long, env = "RESERVATION_STORE_DROP_SCHEMA")]
    pub drop_schema: bool,

    /// Replication factor used when the keyspace is first created.
    #[arg(long, env = "RESERVATION_STORE_REPLICATION_FACTOR", default_value_t = 1)]
    pub replication_factor: u8,

    /// Default consistency level for reads and writes.
    #[arg(
        long,
        env = "RESERVATION_STORE_CONSISTENCY",
        value_enum,
        default_value_t = ConsistencyLevel::LocalQuorum
    )]
    pub consistency: ConsistencyLevel,

    /// Per-request timeout in milliseconds. A write that exceeds it has an
    /// unknown outcome and is reported as retryable, never replayed here.
    #[arg(long, env = "RESERVATION_STORE_REQUEST_TIMEOUT_MS", default_value_t = 5_000)]
    pub request_timeout_ms: u64,
}

impl StoreConfig {
    /// `host:port` form the driver accepts as a known node.
    pub fn contact_point(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 9042,
            datacenter: "datacenter1".to_owned(),
            keyspace: "reservation".to_owned(),
            drop_schema: false,
            replication_factor: 1,
            consistency: ConsistencyLevel::LocalQuorum,
            request_timeout_ms: 5_000,
        }
    }
}
