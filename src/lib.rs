//! Novelgen - AI 小说章节生成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - outline: 大纲解析（中文"第N章"方言为主, 英文 Chapter/Ch 方言兜底）
//! - prompt: 章节/大纲提示词构造与生成文本清洗
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Novel/Chapter/Account Repositories, LlmEngine）
//! - Commands: CQRS 命令处理器（建小说、章节生成事务、大纲生成）
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 流式生成端点
//! - Persistence: SQLite 存储
//! - Adapters: LLM Client（HTTP SSE / Fake）

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
