use async_trait::async_trait;

use crate::api::schema::NewExpense;
use crate::database::manager::DatabaseError;
use crate::database::models::Expense;

/// Persistence for expense rows.
///
/// Implementations make each mutation atomic: a call either commits in full or
/// leaves the store untouched. Ownership is not checked here; callers load the
/// row and decide.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Insert a row owned by `owner_id` and return it with its assigned id
    async fn insert(&self, owner_id: i64, expense: NewExpense) -> Result<Expense, DatabaseError>;

    /// All rows owned by `owner_id`, ascending by id
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Expense>, DatabaseError>;

    async fn find(&self, id: i64) -> Result<Option<Expense>, DatabaseError>;

    /// Persist `title` and `amount` of an existing row. `NotFound` if it vanished.
    async fn update(&self, expense: &Expense) -> Result<Expense, DatabaseError>;

    /// Remove a row. `NotFound` if it does not exist.
    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}
