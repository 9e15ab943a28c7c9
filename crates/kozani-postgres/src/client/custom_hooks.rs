//! Connection setup callbacks and pool lifecycle hooks.

use std::future::Future;
use std::time::Instant;

use deadpool::managed::{HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection, SetupCallback};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::{PgConfig, PgTlsMode, tls};
use crate::TRACING_TARGET_CONNECTION;

/// Returns the setup callback matching the configured TLS mode.
///
/// See [`ManagerConfig`] for more details.
///
/// [`ManagerConfig`]: diesel_async::pooled_connection::ManagerConfig
pub fn setup_callback_for(tls_mode: PgTlsMode) -> SetupCallback<AsyncPgConnection> {
    match tls_mode {
        PgTlsMode::Disable => Box::new(setup_callback),
        PgTlsMode::Require => Box::new(setup_tls_unverified_callback),
        PgTlsMode::VerifyFull => Box::new(setup_tls_callback),
    }
}

/// Establishes a plain connection.
fn setup_callback(addr: &str) -> BoxFuture<'_, ConnectionResult<AsyncPgConnection>> {
    traced(addr, PgTlsMode::Disable, AsyncPgConnection::establish(addr))
}

/// Establishes a TLS connection verified against the webpki roots.
fn setup_tls_callback(addr: &str) -> BoxFuture<'_, ConnectionResult<AsyncPgConnection>> {
    traced(addr, PgTlsMode::VerifyFull, tls::establish_tls(addr, true))
}

/// Establishes a TLS connection without certificate verification.
fn setup_tls_unverified_callback(addr: &str) -> BoxFuture<'_, ConnectionResult<AsyncPgConnection>> {
    traced(addr, PgTlsMode::Require, tls::establish_tls(addr, false))
}

/// Wraps a connection future with timing and outcome logging.
fn traced<'a, F>(
    addr: &'a str,
    tls_mode: PgTlsMode,
    connect: F,
) -> BoxFuture<'a, ConnectionResult<AsyncPgConnection>>
where
    F: Future<Output = ConnectionResult<AsyncPgConnection>> + Send + 'a,
{
    let start = Instant::now();
    let masked_addr = PgConfig::mask_url(addr);

    tracing::info!(
        target: TRACING_TARGET_CONNECTION,
        hook = "setup_callback",
        addr = %masked_addr,
        tls_mode = %tls_mode,
        "Establishing new database connection"
    );

    async move {
        let result = connect.await;
        let elapsed_ms = start.elapsed().as_millis();

        match &result {
            Ok(_) => tracing::info!(
                target: TRACING_TARGET_CONNECTION,
                hook = "setup_callback",
                addr = %masked_addr,
                elapsed_ms,
                "Database connection established"
            ),
            Err(err) => tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                hook = "setup_callback",
                addr = %masked_addr,
                elapsed_ms,
                error = %err,
                "Failed to establish database connection"
            ),
        }

        result
    }
    .boxed()
}

/// Called after a new connection has been added to the pool.
///
/// See [`PoolBuilder`] for more details.
///
/// [`PoolBuilder`]: deadpool::managed::PoolBuilder
pub fn post_create(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::debug!(
        target: TRACING_TARGET_CONNECTION,
        hook = "post_create",
        is_broken = conn.is_broken(),
        created_at = ?metrics.created,
        "Connection added to pool"
    );

    Ok(())
}

/// Called before a connection is recycled.
pub fn pre_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::warn!(
            target: TRACING_TARGET_CONNECTION,
            hook = "pre_recycle",
            recycle_count = metrics.recycle_count,
            "Connection is broken before recycling"
        );
    }

    Ok(())
}

/// Called after a connection has been recycled.
pub fn post_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    if conn.is_broken() {
        tracing::error!(
            target: TRACING_TARGET_CONNECTION,
            hook = "post_recycle",
            recycle_count = metrics.recycle_count,
            "Connection is broken after recycling, should be removed from pool"
        );
    }

    Ok(())
}
