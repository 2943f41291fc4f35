//! HTTP LLM Client - 调用 OpenAI 兼容的生成服务
//!
//! 实现 LlmEnginePort trait:
//! - 章节正文: POST {base_url}/v1/chat/completions, stream=true, SSE 逐行解析
//! - 大纲: 同一端点非流式调用
//!
//! API Key 在构造时注入，不读取环境变量。

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::application::ports::{ContentStream, LlmEnginePort, LlmError};
use crate::domain::prompt::{outline_system_instruction, outline_user_prompt};
use crate::domain::ChapterPrompt;

/// HTTP LLM 客户端配置
#[derive(Debug, Clone)]
pub struct HttpLlmClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// API Key
    pub api_key: String,
    /// 模型名
    pub model: String,
    /// 请求超时时间（秒），超时按服务错误处理
    pub timeout_secs: u64,
    /// 采样温度
    pub temperature: f32,
    /// 单次生成的最大 token 数
    pub max_output_tokens: u32,
}

impl Default for HttpLlmClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: String::new(),
            model: "default".to_string(),
            timeout_secs: 300,
            temperature: 0.8,
            max_output_tokens: 8000,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Debug, Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP LLM 客户端
pub struct HttpLlmClient {
    client: Client,
    config: HttpLlmClientConfig,
}

impl HttpLlmClient {
    /// 创建新的 HTTP LLM 客户端
    pub fn new(config: HttpLlmClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    fn request_body(&self, messages: Vec<ChatMessage>, stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            stream,
            temperature: self.config.temperature,
            max_tokens: self.config.max_output_tokens,
        }
    }

    async fn send(&self, body: &ChatRequest) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else if e.is_connect() {
                    LlmError::NetworkError(format!("Cannot connect to LLM service: {}", e))
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmEnginePort for HttpLlmClient {
    async fn open_chapter_stream(&self, prompt: &ChapterPrompt) -> Result<ContentStream, LlmError> {
        let body = self.request_body(
            vec![ChatMessage {
                role: "user",
                content: prompt.render(),
            }],
            true,
        );

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            chapter_number = prompt.chapter_number,
            "Opening chapter content stream"
        );

        let response = self.send(&body).await?;

        let (tx, rx) = mpsc::channel::<Result<String, LlmError>>(32);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            'outer: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx
                            .send(Err(LlmError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                // 只在完整行边界上解析, 避免截断多字节字符
                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line_bytes);
                    match parse_sse_line(line.trim()) {
                        SseLine::Fragment(text) => {
                            if tx.send(Ok(text)).await.is_err() {
                                // 消费方放弃, 停止拉取
                                return;
                            }
                        }
                        SseLine::Done => break 'outer,
                        SseLine::Skip => {}
                        SseLine::Malformed(msg) => {
                            let _ = tx.send(Err(LlmError::InvalidResponse(msg))).await;
                            return;
                        }
                    }
                }
            }
            // 通道关闭即流结束
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn generate_outline(&self, novel_type: &str, theme: &str) -> Result<String, LlmError> {
        let body = self.request_body(
            vec![
                ChatMessage {
                    role: "system",
                    content: outline_system_instruction().to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: outline_user_prompt(novel_type, theme),
                },
            ],
            false,
        );

        let response = self.send(&body).await?;
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("empty choices".to_string()))
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/v1/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// 单行 SSE 解析结果
enum SseLine {
    /// 文本增量
    Fragment(String),
    /// 流结束标记
    Done,
    /// 空行 / 注释 / 无增量的数据行
    Skip,
    /// 无法解析的数据行
    Malformed(String),
}

/// 解析一行 SSE 数据
///
/// `data: [DONE]` 为结束标记, 其余 `data: {...}` 为增量 JSON；
/// 空行与非 data 行忽略。
fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let payload = payload.trim();

    if payload == "[DONE]" {
        return SseLine::Done;
    }
    if payload.is_empty() {
        return SseLine::Skip;
    }

    match serde_json::from_str::<ChatChunk>(payload) {
        Ok(chunk) => {
            let text = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default();
            if text.is_empty() {
                SseLine::Skip
            } else {
                SseLine::Fragment(text)
            }
        }
        Err(e) => SseLine::Malformed(format!("bad SSE payload: {}", e)),
    }
}
