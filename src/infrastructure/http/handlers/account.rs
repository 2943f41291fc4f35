//! Account HTTP Handler

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::application::GetAccount;
use crate::infrastructure::http::dto::{AccountResponse, ApiResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthUser;
use crate::infrastructure::http::state::AppState;

/// 查询当前用户账户, 首次访问时按初始额度创建
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.get_account_handler.handle(GetAccount { user_id }).await?;

    Ok(Json(ApiResponse::success(AccountResponse {
        user_id: account.id,
        token_balance: account.token_balance,
    })))
}
