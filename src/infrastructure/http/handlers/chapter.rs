//! Chapter HTTP Handlers
//!
//! generate 为流式端点: 前置校验失败走同步 errno JSON，
//! 校验通过后以 chunked text/plain 逐片段返回正文。

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use tokio_stream::StreamExt;

use crate::application::{GetChapterStatus, StartChapterGeneration};
use crate::infrastructure::http::dto::{
    ApiResponse, ChapterStatusRequest, ChapterStatusResponse, GenerateChapterRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthUser;
use crate::infrastructure::http::state::AppState;

/// 生成章节正文（流式）
///
/// 中途失败时回滚已在流内部完成, 对外表现为 body 提前终止。
pub async fn generate_chapter(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<GenerateChapterRequest>,
) -> Result<Response, ApiError> {
    let command = StartChapterGeneration {
        user_id,
        chapter_id: req.chapter_id,
    };

    let fragments = state.start_generation_handler.handle(command).await?;

    let body_stream = fragments.map(|item| {
        item.map(Bytes::from)
            .map_err(|e| std::io::Error::other(e.to_string()))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(body_stream))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response.into_response())
}

/// 查询章节状态（只反映已提交的持久化状态）
pub async fn chapter_status(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<ChapterStatusRequest>,
) -> Result<Json<ApiResponse<ChapterStatusResponse>>, ApiError> {
    let query = GetChapterStatus {
        user_id,
        chapter_id: req.chapter_id,
    };

    let view = state.get_chapter_status_handler.handle(query).await?;

    Ok(Json(ApiResponse::success(ChapterStatusResponse {
        status: view.status.as_str().to_string(),
        content: view.content,
        word_count: view.word_count,
        cost: view.cost,
    })))
}
