//! HTTP Middleware
//!
//! - 认证中间件: 从 X-User-Id 头解析调用方身份
//! - HTTP 状态码错误日志中间件

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::error::ApiError;

/// 已认证的调用方身份, 由认证中间件注入 request extensions
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

/// 认证中间件
///
/// 要求每个请求携带 `X-User-Id: <uuid>` 头；缺失或非法一律 401。
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok());

    let Some(user_id) = user_id else {
        return ApiError::Unauthorized("Missing or invalid X-User-Id header".to_string())
            .into_response();
    };

    request.extensions_mut().insert(AuthUser(user_id));
    next.run(request).await
}

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
/// 注意：业务错误（errno != 0）在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}
