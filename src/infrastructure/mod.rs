//! 基础设施层
//!
//! - http: Axum HTTP 服务（路由、中间件、流式端点）
//! - persistence: SQLite 存储实现
//! - adapters: LLM 引擎适配器（HTTP / Fake）

pub mod adapters;
pub mod http;
pub mod persistence;
