//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Novel DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateNovelRequest {
    pub title: String,
    pub novel_type: String,
    pub theme: String,
    pub outline: String,
}

#[derive(Debug, Deserialize)]
pub struct GetNovelRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct NovelResponse {
    pub id: Uuid,
    pub title: String,
    pub novel_type: String,
    pub theme: String,
    pub outline: String,
    pub total_chapters: usize,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub id: Uuid,
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub word_count: i64,
}

#[derive(Debug, Serialize)]
pub struct NovelDetailResponse {
    pub novel: NovelResponse,
    pub chapters: Vec<ChapterResponse>,
}

// ============================================================================
// Chapter DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateChapterRequest {
    pub chapter_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ChapterStatusRequest {
    pub chapter_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ChapterStatusResponse {
    pub status: String,
    pub content: String,
    pub word_count: i64,
    pub cost: i64,
}

// ============================================================================
// Outline / Account DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GenerateOutlineRequest {
    pub novel_type: String,
    pub theme: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user_id: Uuid,
    pub token_balance: i64,
}
