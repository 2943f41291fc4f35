//! Fake LLM Client - 测试与本地开发用的假 LLM 引擎
//!
//! 不发起任何网络调用, 按配置回放固定的正文片段与大纲文本,
//! 并记录收到的完整提示词供测试断言。

use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::application::ports::{ContentStream, LlmEnginePort, LlmError};
use crate::domain::ChapterPrompt;

/// Fake LLM 客户端配置
#[derive(Debug, Clone)]
pub struct FakeLlmClientConfig {
    /// 依次回放的正文片段
    pub fragments: Vec<String>,
    /// 回放 N 个片段后注入一次服务错误
    pub fail_after: Option<usize>,
    /// 片段之间的延迟（毫秒）, 用于模拟慢速流
    pub fragment_delay_ms: u64,
    /// generate_outline 返回的大纲文本
    pub outline_text: String,
}

impl Default for FakeLlmClientConfig {
    fn default() -> Self {
        Self {
            fragments: vec![
                "夜色如墨, ".to_string(),
                "城市的灯火次第亮起。".to_string(),
            ],
            fail_after: None,
            fragment_delay_ms: 0,
            outline_text: "第1章 开端：故事从这里开始。\n第2章 转折：风云突变。".to_string(),
        }
    }
}

/// Fake LLM 客户端
pub struct FakeLlmClient {
    config: FakeLlmClientConfig,
    captured_prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeLlmClient {
    pub fn new(config: FakeLlmClientConfig) -> Self {
        Self {
            config,
            captured_prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 已收到的完整提示词, 与调用方共享
    pub fn captured_prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.captured_prompts)
    }
}

#[async_trait]
impl LlmEnginePort for FakeLlmClient {
    async fn open_chapter_stream(&self, prompt: &ChapterPrompt) -> Result<ContentStream, LlmError> {
        self.captured_prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.render());

        let take = self
            .config
            .fail_after
            .unwrap_or(self.config.fragments.len())
            .min(self.config.fragments.len());

        let mut items: Vec<Result<String, LlmError>> = self.config.fragments[..take]
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        if self.config.fail_after.is_some() {
            items.push(Err(LlmError::ServiceError(
                "injected generation failure".to_string(),
            )));
        }

        let delay = Duration::from_millis(self.config.fragment_delay_ms);
        let stream = futures_util::stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });

        Ok(Box::pin(stream))
    }

    async fn generate_outline(&self, _novel_type: &str, _theme: &str) -> Result<String, LlmError> {
        Ok(self.config.outline_text.clone())
    }
}
