//! LLM Engine Port - 内容生成引擎抽象
//!
//! 定义外部生成服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::domain::ChapterPrompt;

/// LLM 错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),
}

/// 文本片段流
///
/// 惰性、有限、一次性: 逐个拉取片段直到服务端宣告结束；
/// 单次拉取可能因网络错误失败并终止整个流；失败后不可重放，
/// 重新生成必须重新调用 `open_chapter_stream`。
pub type ContentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// LLM Engine Port
///
/// 外部生成服务的抽象接口。凭据与模型选择在构造适配器时注入，
/// 核心逻辑不读取任何环境状态。
#[async_trait]
pub trait LlmEnginePort: Send + Sync {
    /// 打开章节正文生成流
    async fn open_chapter_stream(&self, prompt: &ChapterPrompt) -> Result<ContentStream, LlmError>;

    /// 生成完整大纲（非流式）
    async fn generate_outline(&self, novel_type: &str, theme: &str) -> Result<String, LlmError>;

    /// 检查生成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
