//! Outline HTTP Handler
//!
//! 大纲生成免费, 不经过扣费事务; 结果逐行流式返回。

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;

use crate::application::GenerateOutline;
use crate::infrastructure::http::dto::GenerateOutlineRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthUser;
use crate::infrastructure::http::state::AppState;

/// 生成小说大纲（流式, 逐行）
pub async fn generate_outline(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<GenerateOutlineRequest>,
) -> Result<Response, ApiError> {
    let command = GenerateOutline {
        user_id,
        novel_type: req.novel_type,
        theme: req.theme,
    };

    let outline = state.generate_outline_handler.handle(command).await?;

    let lines: Vec<Result<Bytes, std::io::Error>> = outline
        .lines()
        .map(|line| Ok(Bytes::from(format!("{}\n", line))))
        .collect();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(tokio_stream::iter(lines)))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response.into_response())
}
