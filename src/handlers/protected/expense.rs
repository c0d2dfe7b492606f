use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    Json,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::format::{expenses_to_api, ExpenseOut};
use crate::api::schema::{validate_new, validate_patch};
use crate::database::models::Expense;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

const NOT_FOUND: &str = "Expense not found";
const NOT_OWNER: &str = "You do not have access to this expense";

/// POST /expense/ - Create an expense owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ExpenseOut> {
    let Json(payload) = payload?;
    let input = validate_new(&payload)?;

    let expense = state.store.insert(user.user_id, input).await?;
    info!("Created expense {} for user {}", expense.id, user.user_id);

    Ok(ApiResponse::created(expense.into()))
}

/// GET /expense/ - List the caller's expenses
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<ExpenseOut>> {
    let expenses = state.store.list_by_owner(user.user_id).await?;
    debug!("Listing {} expenses for user {}", expenses.len(), user.user_id);

    Ok(ApiResponse::success(expenses_to_api(expenses)))
}

/// GET /expense/:id - Fetch one of the caller's expenses
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ExpenseOut> {
    let Path(id) = id?;
    let expense = load_owned(&state, id, user).await?;

    Ok(ApiResponse::success(expense.into()))
}

/// PATCH /expense/:id - Overwrite the fields present in the body
///
/// Ownership is settled before the body is looked at, so a caller who does
/// not own the record gets the same answer whatever they send.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<ExpenseOut> {
    let Path(id) = id?;
    let mut expense = load_owned(&state, id, user).await?;

    let Json(payload) = payload?;
    let patch = validate_patch(&payload)?;
    if patch.is_empty() {
        return Ok(ApiResponse::success(expense.into()));
    }

    expense.apply(patch);
    let updated = state.store.update(&expense).await?;
    info!("Updated expense {} for user {}", updated.id, user.user_id);

    Ok(ApiResponse::success(updated.into()))
}

/// DELETE /expense/:id - Remove one of the caller's expenses
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    let expense = load_owned(&state, id, user).await?;

    state.store.delete(expense.id).await?;
    info!("Deleted expense {} for user {}", expense.id, user.user_id);

    Ok(ApiResponse::no_content())
}

/// Load an expense and make sure the caller owns it
async fn load_owned(state: &AppState, id: i64, user: AuthUser) -> Result<Expense, ApiError> {
    let expense = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    if !expense.is_owned_by(user.user_id) {
        warn!("User {} denied access to expense {}", user.user_id, id);
        return Err(ApiError::not_owner(NOT_OWNER));
    }

    Ok(expense)
}
