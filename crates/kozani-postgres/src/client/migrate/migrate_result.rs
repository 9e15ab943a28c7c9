//! Migration status and outcome reporting.

use std::time::Duration;

/// Applied and pending migration versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Applied migration versions in chronological order.
    pub applied_versions: Vec<String>,
    /// Embedded migration versions not yet applied.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Creates a new migration status.
    pub fn new(
        applied_versions: impl Into<Vec<String>>,
        pending_versions: impl Into<Vec<String>>,
    ) -> Self {
        Self {
            applied_versions: applied_versions.into(),
            pending_versions: pending_versions.into(),
        }
    }

    #[inline]
    pub fn applied_migrations(&self) -> usize {
        self.applied_versions.len()
    }

    #[inline]
    pub fn pending_migrations(&self) -> usize {
        self.pending_versions.len()
    }

    /// Returns true if all embedded migrations have been applied.
    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Total time spent, including the status check.
    pub duration: Duration,
    /// Versions applied by this run.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Creates a successful migration result.
    pub fn success(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns whether nothing had to be applied.
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }

    /// Returns the last applied migration version, if any.
    pub fn last_processed_version(&self) -> Option<&str> {
        self.processed_versions.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_tracks_pending() {
        let status = MigrationStatus::new(vec!["20250601000000".to_string()], Vec::new());
        assert!(status.is_up_to_date());
        assert_eq!(status.applied_migrations(), 1);

        let status = MigrationStatus::new(Vec::new(), vec!["20250601000000".to_string()]);
        assert!(!status.is_up_to_date());
        assert_eq!(status.pending_migrations(), 1);
    }

    #[test]
    fn result_reports_last_version() {
        let result = MigrationResult::success(Duration::from_millis(5), Vec::new());
        assert!(result.is_no_op());
        assert_eq!(result.last_processed_version(), None);

        let result = MigrationResult::success(
            Duration::from_millis(5),
            vec!["20250601000000".to_string()],
        );
        assert_eq!(result.last_processed_version(), Some("20250601000000"));
    }
}
