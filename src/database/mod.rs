pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryExpenseStore;
pub use models::Expense;
pub use repository::PgExpenseStore;
pub use store::ExpenseStore;
