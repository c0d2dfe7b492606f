use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::api::schema::NewExpense;
use crate::database::manager::DatabaseError;
use crate::database::models::Expense;
use crate::database::store::ExpenseStore;

/// Process-local expense store for tests and database-less development runs
#[derive(Debug, Default)]
pub struct MemoryExpenseStore {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Expense>,
}

impl MemoryExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.rows.is_empty()
    }
}

#[async_trait]
impl ExpenseStore for MemoryExpenseStore {
    async fn insert(&self, owner_id: i64, expense: NewExpense) -> Result<Expense, DatabaseError> {
        let mut state = self.inner.write().await;
        // ids are never reused, even after deletes
        state.last_id += 1;

        let row = Expense {
            id: state.last_id,
            title: expense.title,
            amount: expense.amount,
            owner_id,
        };
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Expense>, DatabaseError> {
        let state = self.inner.read().await;
        Ok(state
            .rows
            .values()
            .filter(|row| row.is_owned_by(owner_id))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Expense>, DatabaseError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, expense: &Expense) -> Result<Expense, DatabaseError> {
        let mut state = self.inner.write().await;
        let row = state
            .rows
            .get_mut(&expense.id)
            .ok_or_else(|| DatabaseError::NotFound(format!("expense {}", expense.id)))?;

        row.title = expense.title.clone();
        row.amount = expense.amount;
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        self.inner
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("expense {}", id)))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
