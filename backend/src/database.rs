/// Postgres pool owned by [`crate::store::PgStore`].
pub type DbPool = sqlx::PgPool;

/// Connection taken by every function in [`crate::queries`]; pass `&mut conn`
/// for a pooled connection or `&mut *tx` inside a transaction.
pub type DbConn = sqlx::PgConnection;
