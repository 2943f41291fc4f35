//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Novel Repository
// ============================================================================

/// 小说实体（用于持久化）
#[derive(Debug, Clone)]
pub struct NovelRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub novel_type: String,
    pub theme: String,
    /// 大纲原文，逐字保存，生成时复用
    pub outline: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说及其全部章节（单个事务，要么全部存在要么全部不存在）
    async fn create_with_chapters(
        &self,
        novel: &NovelRecord,
        chapters: &[ChapterRecord],
    ) -> Result<(), RepositoryError>;

    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError>;

    /// 获取用户的所有小说（按创建时间倒序）
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<NovelRecord>, RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// 章节生成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterStatus {
    /// 待生成
    #[default]
    Pending,
    /// 生成中（已扣费）
    Generating,
    /// 已完成（正文已持久化，终态）
    Completed,
}

impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::Pending => "pending",
            ChapterStatus::Generating => "generating",
            ChapterStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ChapterStatus::Pending),
            "generating" => Some(ChapterStatus::Generating),
            "completed" => Some(ChapterStatus::Completed),
            _ => None,
        }
    }
}

/// 章节实体（用于持久化）
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: Uuid,
    pub novel_id: Uuid,
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    /// 生成前为空字符串
    pub content: String,
    pub status: ChapterStatus,
    pub word_count: i64,
    pub cost: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Chapter Repository Port
///
/// 状态迁移方法均为条件 UPDATE: 只有当前状态匹配时才生效，
/// 返回值表明本次调用是否赢得迁移。
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 根据 ID 查找章节
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError>;

    /// 获取小说的所有章节（按章节号升序）
    async fn find_by_novel(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError>;

    /// 原子迁移 pending -> generating 并记录本次费用
    ///
    /// 并发调用中至多一个返回 true，其余调用在扣费前即被拒绝
    async fn try_begin_generation(&self, id: Uuid, cost: i64) -> Result<bool, RepositoryError>;

    /// 原子迁移 generating -> completed，持久化正文与字数
    ///
    /// 这是正文唯一的落盘点
    async fn complete_generation(
        &self,
        id: Uuid,
        content: &str,
        word_count: i64,
    ) -> Result<bool, RepositoryError>;

    /// 回滚: generating -> pending，费用清零，丢弃未持久化的正文
    async fn reset_generation(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// 上一章（编号减一、已完成）的正文，用于连续性上下文
    async fn find_previous_completed_content(
        &self,
        novel_id: Uuid,
        chapter_number: u32,
    ) -> Result<Option<String>, RepositoryError>;
}

// ============================================================================
// Account Repository
// ============================================================================

/// 账户实体（用于持久化）
#[derive(Debug, Clone)]
pub struct AccountRecord {
    /// 用户 ID
    pub id: Uuid,
    pub token_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account Repository Port
#[async_trait]
pub trait AccountRepositoryPort: Send + Sync {
    /// 根据用户 ID 查找账户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, RepositoryError>;

    /// 查找账户，不存在则按初始赠送额度创建
    async fn ensure(&self, id: Uuid, initial_balance: i64) -> Result<AccountRecord, RepositoryError>;

    /// 条件扣费: 余额不低于 amount 时原子扣减，返回是否成功
    async fn try_debit(&self, id: Uuid, amount: i64) -> Result<bool, RepositoryError>;

    /// 退款: 原子加回 amount
    async fn credit(&self, id: Uuid, amount: i64) -> Result<(), RepositoryError>;
}
