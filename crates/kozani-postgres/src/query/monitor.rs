//! Connectivity checks against the database.

use std::future::Future;

use diesel::sql_types::Timestamptz;
use diesel_async::RunQueryDsl;

use crate::{PgConnection, PgError, PgResult};

#[derive(diesel::QueryableByName)]
struct NowRow {
    #[diesel(sql_type = Timestamptz)]
    now: jiff_diesel::Timestamp,
}

/// Repository for database health operations.
pub trait MonitorRepository {
    /// Returns the database server's current time.
    fn database_now(&mut self) -> impl Future<Output = PgResult<jiff::Timestamp>> + Send;
}

impl MonitorRepository for PgConnection {
    async fn database_now(&mut self) -> PgResult<jiff::Timestamp> {
        let row: NowRow = diesel::sql_query("SELECT NOW() AS now")
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(row.now.into())
    }
}
