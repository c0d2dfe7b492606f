use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::database::store::ExpenseStore;

/// Dependencies handed to every request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExpenseStore>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(store: Arc<dyn ExpenseStore>, jwt: JwtKeys) -> Self {
        Self { store, jwt }
    }
}
