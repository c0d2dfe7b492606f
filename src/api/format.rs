use serde::{Deserialize, Serialize};

use crate::database::models::Expense;

/// Public wire format of an expense. The owner is never exposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseOut {
    pub id: i64,
    pub title: String,
    pub amount: f64,
}

impl From<Expense> for ExpenseOut {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title,
            amount: expense.amount,
        }
    }
}

pub fn expenses_to_api(expenses: Vec<Expense>) -> Vec<ExpenseOut> {
    expenses.into_iter().map(ExpenseOut::from).collect()
}
