//! Database layer
//!
//! Supports SQLite (default, single-file deployment) and MySQL (hosted
//! deployments). The driver is selected by configuration and hidden behind
//! [`DatabasePool`].
//!
//! Repositories write each statement once and run it against whichever
//! concrete pool is active through [`with_driver!`]. Row decoding for both
//! backends is generated by [`impl_from_row!`].
//!
//! ```ignore
//! use zuree::config::DatabaseConfig;
//! use zuree::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};

use sqlx::mysql::MySqlQueryResult;
use sqlx::sqlite::SqliteQueryResult;

/// Run `$body` with `$conn` bound to the concrete pool behind `$pool`.
///
/// The body is expanded once per backend, so the same query text is
/// type-checked against both `SqlitePool` and `MySqlPool`. Must be used in a
/// function returning `anyhow::Result`.
macro_rules! with_driver {
    ($pool:expr, |$conn:ident| $body:expr) => {
        match $pool.driver() {
            $crate::config::DatabaseDriver::Sqlite => {
                let $conn = $pool
                    .as_sqlite()
                    .ok_or_else(|| ::anyhow::anyhow!("SQLite pool is not available"))?;
                $body
            }
            $crate::config::DatabaseDriver::Mysql => {
                let $conn = $pool
                    .as_mysql()
                    .ok_or_else(|| ::anyhow::anyhow!("MySQL pool is not available"))?;
                $body
            }
        }
    };
}

/// Implement `sqlx::FromRow` for both `SqliteRow` and `MySqlRow` with one body.
///
/// `sqlx::Row` must be in scope at the call site.
macro_rules! impl_from_row {
    ($ty:ty, |$row:ident| $body:block) => {
        impl<'r> ::sqlx::FromRow<'r, ::sqlx::sqlite::SqliteRow> for $ty {
            fn from_row(
                $row: &'r ::sqlx::sqlite::SqliteRow,
            ) -> ::std::result::Result<Self, ::sqlx::Error> $body
        }

        impl<'r> ::sqlx::FromRow<'r, ::sqlx::mysql::MySqlRow> for $ty {
            fn from_row(
                $row: &'r ::sqlx::mysql::MySqlRow,
            ) -> ::std::result::Result<Self, ::sqlx::Error> $body
        }
    };
}

pub(crate) use impl_from_row;
pub(crate) use with_driver;

/// Auto-increment id of the row created by an `INSERT`
pub trait LastInsertId {
    fn last_id(&self) -> i64;
}

impl LastInsertId for SqliteQueryResult {
    fn last_id(&self) -> i64 {
        self.last_insert_rowid()
    }
}

impl LastInsertId for MySqlQueryResult {
    fn last_id(&self) -> i64 {
        self.last_insert_id() as i64
    }
}

/// Decode a text column into an enum implementing `FromStr`.
pub(crate) fn parse_column<T>(value: String, column: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.to_string().into(),
    })
}

/// Build a `LIKE` pattern from user search input, or `None` for blank input.
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('%', "").replace('_', "")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_blank_is_none() {
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("   ")), None);
    }

    #[test]
    fn test_like_pattern_strips_wildcards() {
        assert_eq!(like_pattern(Some(" 5G_%fiber ")), Some("%5Gfiber%".to_string()));
    }

    #[test]
    fn test_parse_column_reports_column_name() {
        match parse_column::<i64>("twelve".into(), "sort_order") {
            Err(sqlx::Error::ColumnDecode { index, .. }) => assert_eq!(index, "sort_order"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
