//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、LlmEngine）
//! - commands: CQRS 命令及处理器（建小说、生成章节、生成大纲）
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

/// 每章生成的固定费用（token）
pub const GENERATION_COST: i64 = 1000;

/// 新账户的初始赠送额度（token）
pub const INITIAL_TOKEN_GRANT: i64 = 10_000;

// Re-exports
pub use commands::{
    handlers::{
        ChapterFragmentStream, CreateNovelHandler, CreateNovelResponse, GenerateOutlineHandler,
        StartChapterGenerationHandler,
    },
    CreateNovel, GenerateOutline, StartChapterGeneration,
};

pub use error::ApplicationError;

pub use ports::{
    AccountRecord, AccountRepositoryPort, ChapterRecord, ChapterRepositoryPort, ChapterStatus,
    ContentStream, LlmEnginePort, LlmError, NovelRecord, NovelRepositoryPort, RepositoryError,
};

pub use queries::{
    handlers::{
        ChapterStatusView, GetAccountHandler, GetChapterStatusHandler, GetNovelHandler,
        ListNovelsHandler, NovelDetail,
    },
    GetAccount, GetChapterStatus, GetNovel, ListNovels,
};
