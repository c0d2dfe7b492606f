use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::api::schema::NewExpense;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Expense;
use crate::database::store::ExpenseStore;

const COLUMNS: &str = "id, title, amount, owner_id";

/// PostgreSQL-backed expense store.
///
/// Each mutation runs in its own transaction; a transaction that is dropped
/// without `commit` is rolled back by sqlx.
#[derive(Clone)]
pub struct PgExpenseStore {
    pool: PgPool,
}

impl PgExpenseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ExpenseStore for PgExpenseStore {
    async fn insert(&self, owner_id: i64, expense: NewExpense) -> Result<Expense, DatabaseError> {
        let sql = format!(
            "INSERT INTO expenses (title, amount, owner_id) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, Expense>(&sql)
            .bind(&expense.title)
            .bind(expense.amount)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Inserted expense {} for owner {}", row.id, owner_id);
        Ok(row)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Expense>, DatabaseError> {
        let sql = format!("SELECT {} FROM expenses WHERE owner_id = $1 ORDER BY id", COLUMNS);

        let rows = sqlx::query_as::<_, Expense>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Expense>, DatabaseError> {
        let sql = format!("SELECT {} FROM expenses WHERE id = $1", COLUMNS);

        let row = sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update(&self, expense: &Expense) -> Result<Expense, DatabaseError> {
        let sql = format!(
            "UPDATE expenses SET title = $2, amount = $3 WHERE id = $1 RETURNING {}",
            COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, Expense>(&sql)
            .bind(expense.id)
            .bind(&expense.title)
            .bind(expense.amount)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("expense {}", expense.id)))?;
        tx.commit().await?;

        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("expense {}", id)));
        }
        tx.commit().await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
