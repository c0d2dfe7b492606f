pub mod format;
pub mod schema;

pub use format::ExpenseOut;
pub use schema::{validate_new, validate_patch, ExpensePatch, FieldErrors, NewExpense};
