//! Domain Layer - 领域层
//!
//! 纯领域逻辑，不依赖任何基础设施:
//! - outline: 大纲解析器（文本 -> 章节记录）
//! - prompt: 生成提示词组装（章节正文 / 大纲生成）

pub mod outline;
pub mod prompt;

pub use outline::{parse_outline, ParsedChapter};
pub use prompt::{ChapterPrompt, PREV_CONTEXT_MAX_CHARS};
