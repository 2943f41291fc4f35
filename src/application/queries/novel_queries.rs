//! Novel / Chapter / Account Queries

use uuid::Uuid;

/// 获取用户的所有小说（含章节概览）
#[derive(Debug, Clone)]
pub struct ListNovels {
    pub user_id: Uuid,
}

/// 获取小说详情（含全部章节）
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub user_id: Uuid,
    pub novel_id: Uuid,
}

/// 查询章节生成状态（只反映已持久化的状态）
#[derive(Debug, Clone)]
pub struct GetChapterStatus {
    pub user_id: Uuid,
    pub chapter_id: Uuid,
}

/// 查询账户余额
#[derive(Debug, Clone)]
pub struct GetAccount {
    pub user_id: Uuid,
}
