//! Novel HTTP Handlers

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::application::{CreateNovel, GetNovel, ListNovels, NovelDetail};
use crate::infrastructure::http::dto::{
    ApiResponse, ChapterResponse, CreateNovelRequest, GetNovelRequest, NovelDetailResponse,
    NovelResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::middleware::AuthUser;
use crate::infrastructure::http::state::AppState;

fn to_detail_response(detail: NovelDetail) -> NovelDetailResponse {
    let chapters: Vec<ChapterResponse> = detail
        .chapters
        .into_iter()
        .map(|c| ChapterResponse {
            id: c.id,
            chapter_number: c.chapter_number,
            title: c.title,
            summary: c.summary,
            status: c.status.as_str().to_string(),
            word_count: c.word_count,
        })
        .collect();

    NovelDetailResponse {
        novel: NovelResponse {
            id: detail.novel.id,
            title: detail.novel.title,
            novel_type: detail.novel.novel_type,
            theme: detail.novel.theme,
            outline: detail.novel.outline,
            total_chapters: chapters.len(),
            created_at: detail.novel.created_at.to_rfc3339(),
        },
        chapters,
    }
}

/// 创建小说: 解析大纲, 小说与全部章节一次性落库
pub async fn create_novel(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateNovelRequest>,
) -> Result<Json<ApiResponse<NovelDetailResponse>>, ApiError> {
    let command = CreateNovel {
        user_id,
        title: req.title,
        novel_type: req.novel_type,
        theme: req.theme,
        outline: req.outline,
    };

    let result = state.create_novel_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(to_detail_response(NovelDetail {
        novel: result.novel,
        chapters: result.chapters,
    }))))
}

/// 获取当前用户的小说列表
pub async fn list_novels(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<NovelDetailResponse>>>, ApiError> {
    let result = state.list_novels_handler.handle(ListNovels { user_id }).await?;

    let responses: Vec<NovelDetailResponse> = result.into_iter().map(to_detail_response).collect();
    Ok(Json(ApiResponse::success(responses)))
}

/// 获取小说详情
pub async fn get_novel(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<GetNovelRequest>,
) -> Result<Json<ApiResponse<NovelDetailResponse>>, ApiError> {
    let query = GetNovel {
        user_id,
        novel_id: req.id,
    };

    let result = state.get_novel_handler.handle(query).await?;
    Ok(Json(ApiResponse::success(to_detail_response(result))))
}
