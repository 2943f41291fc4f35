//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查（免认证）
//! - /api/novel/create      POST  创建小说（解析大纲, 落库全部章节）
//! - /api/novel/list        GET   列出当前用户的小说
//! - /api/novel/get         POST  获取小说详情（含章节）
//! - /api/chapter/generate  POST  生成章节正文（流式, 扣费事务）
//! - /api/chapter/status    POST  查询章节状态
//! - /api/outline/generate  POST  生成大纲（流式, 免费）
//! - /api/account/get       POST  查询账户余额

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::middleware::auth_middleware;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    // ping 之外的路由都要求 X-User-Id 认证
    let protected = Router::new()
        .nest("/novel", novel_routes())
        .nest("/chapter", chapter_routes())
        .route("/outline/generate", post(handlers::generate_outline))
        .route("/account/get", post(handlers::get_account))
        .layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/ping", get(handlers::ping))
        .merge(protected)
}

/// Novel 路由
fn novel_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_novel))
        .route("/list", get(handlers::list_novels))
        .route("/get", post(handlers::get_novel))
}

/// Chapter 路由
fn chapter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_chapter))
        .route("/status", post(handlers::chapter_status))
}
