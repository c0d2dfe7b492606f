// handlers/protected/mod.rs - Handlers behind JWT authentication
//
// Every route here runs after `jwt_auth_middleware`, which injects the
// caller's `AuthUser` into the request extensions.

pub mod expense;

use axum::{middleware, routing::get, Router};

use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Expense routes under /expense. Both `/expense` and `/expense/` name the collection.
pub fn expense_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/expense", get(expense::list).post(expense::create))
        .route("/expense/", get(expense::list).post(expense::create))
        .route(
            "/expense/:id",
            get(expense::get)
                .patch(expense::update)
                .delete(expense::delete),
        )
        // route_layer so unknown paths still 404 instead of 401
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
