//! Ping Handler
//!
//! 健康检查端点: 探测生成引擎可用性

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 健康检查
///
/// 生成引擎不可用时降级上报，但端点本身仍返回 200
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    let engine_healthy = state.llm_engine.health_check().await;
    Json(PingResponse {
        status: if engine_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
    })
}
