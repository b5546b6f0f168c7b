//! Session bootstrap for the ScyllaDB/Cassandra cluster.
//!
//! A session is a long-lived, thread-safe handle over the cluster's TCP
//! connections: expensive to create, cheap to share. The store owns exactly
//! one for its process lifetime; dropping [`StoreSession`] closes the
//! sockets, and partial initialization failures simply drop whatever was
//! built so far.

use scylla::statement::Consistency;
use scylla::transport::errors::NewSessionError;
use scylla::transport::load_balancing::DefaultPolicy;
use scylla::{ExecutionProfile, Session, SessionBuilder};
use tracing::info;

use crate::config::{ConsistencyLevel, StoreConfig};
use crate::domain::ports::StoreError;

impl From<ConsistencyLevel> for Consistency {
    fn from(value: ConsistencyLevel) -> Self {
        match value {
            ConsistencyLevel::One => Self::One,
            ConsistencyLevel::LocalOne => Self::LocalOne,
            ConsistencyLevel::Quorum => Self::Quorum,
            ConsistencyLevel::LocalQuorum => Self::LocalQuorum,
            ConsistencyLevel::All => Self::All,
        }
    }
}

/// Owned session handle for the reservation store.
pub struct StoreSession {
    inner: Session,
}

impl StoreSession {
    /// Connect to the cluster described by `config`.
    ///
    /// The configured consistency level and request timeout become the
    /// session's default execution profile; the driver manages connection
    /// pooling and async I/O internally.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when no contact point answers
    /// within the connection timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let routing = DefaultPolicy::builder()
            .prefer_datacenter(config.datacenter.clone())
            .build();
        let profile = ExecutionProfile::builder()
            .load_balancing_policy(routing)
            .consistency(config.consistency.into())
            .request_timeout(Some(config.request_timeout()))
            .build();

        let inner = SessionBuilder::new()
            .known_node(config.contact_point())
            .connection_timeout(config.request_timeout())
            .default_execution_profile_handle(profile.into_handle())
            .build()
            .await
            .map_err(map_session_error)?;

        info!(
            node = %config.contact_point(),
            datacenter = %config.datacenter,
            "store session established"
        );
        Ok(Self { inner })
    }

    /// Borrow the underlying driver session.
    pub fn inner(&self) -> &Session {
        &self.inner
    }
}

/// Map driver connection failures to the domain error taxonomy.
fn map_session_error(error: NewSessionError) -> StoreError {
    StoreError::unavailable("connect", error.to_string())
}
