//! Extension trait adding migration operations to [`PgClient`].

use std::future::Future;

use super::{MigrationResult, MigrationStatus, get_migration_status, run_pending_migrations};
use crate::{PgClient, PgResult};

/// Migration operations for [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies all pending embedded migrations. Safe to call repeatedly.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Returns the applied and pending migration versions.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        get_migration_status(&mut conn).await
    }
}
