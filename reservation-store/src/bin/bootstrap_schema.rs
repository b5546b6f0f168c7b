//! Schema bootstrap entry-point: provisions the reservation keyspace,
//! address type, and tables, then exits.

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use reservation_store::outbound::persistence::{provision, ReservationSchema, StoreSession};
use reservation_store::StoreConfig;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = StoreConfig::parse();
    let schema = ReservationSchema::new(config.keyspace.clone(), config.replication_factor)
        .wrap_err("schema configuration rejected")?;

    let session = StoreSession::connect(&config)
        .await
        .wrap_err("could not reach the store cluster")?;
    provision(session.inner(), &schema, config.drop_schema)
        .await
        .wrap_err("schema provisioning failed")?;

    info!(keyspace = %schema.keyspace(), "reservation schema is ready");
    Ok(())
}
