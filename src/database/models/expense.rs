use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::schema::ExpensePatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub title: String,
    pub amount: f64,
    pub owner_id: i64,
}

impl Expense {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Overwrite the fields present in `patch`, keeping the rest
    pub fn apply(&mut self, patch: ExpensePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
    }
}
