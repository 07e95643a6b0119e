//! Unit of Work
//!
//! Transactional boundaries for database operations. Everything done through
//! a [`TransactionContext`] commits or rolls back together.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::shared::error::AppError;

/// Transaction context that wraps a SQLx transaction.
pub struct TransactionContext {
    tx: Transaction<'static, Postgres>,
}

impl TransactionContext {
    /// Create a new transaction context.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Connection to run queries on inside the transaction.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit the transaction.
    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(AppError::Database)
    }
}

/// Execute a closure within a transaction.
///
/// Commits when the closure hands the context back with `Ok`; on `Err` the
/// context is dropped and sqlx rolls the transaction back.
///
/// # Example
/// ```ignore
/// let rows = with_transaction(&pool, |mut tx| async move {
///     let rows = sqlx::query("SELECT ... FOR UPDATE").fetch_all(tx.conn()).await?;
///     sqlx::query("UPDATE ...").execute(tx.conn()).await?;
///     Ok((rows, tx))
/// }).await?;
/// ```
pub async fn with_transaction<F, Fut, T>(pool: &PgPool, f: F) -> Result<T, AppError>
where
    F: FnOnce(TransactionContext) -> Fut,
    Fut: std::future::Future<Output = Result<(T, TransactionContext), AppError>>,
{
    let tx = pool.begin().await.map_err(AppError::Database)?;
    let ctx = TransactionContext::new(tx);

    let (result, ctx) = f(ctx).await?;
    ctx.commit().await?;
    Ok(result)
}
