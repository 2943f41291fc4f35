//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod llm_engine;
mod repositories;

pub use llm_engine::{ContentStream, LlmEnginePort, LlmError};
pub use repositories::{
    AccountRecord, AccountRepositoryPort, ChapterRecord, ChapterRepositoryPort, ChapterStatus,
    NovelRecord, NovelRepositoryPort, RepositoryError,
};
