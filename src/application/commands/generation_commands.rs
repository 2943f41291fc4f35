//! Generation Commands

use uuid::Uuid;

/// 启动章节生成命令（扣费 + 流式生成 + 提交/回滚）
#[derive(Debug, Clone)]
pub struct StartChapterGeneration {
    pub user_id: Uuid,
    pub chapter_id: Uuid,
}

/// 生成大纲命令（免费，不扣费）
#[derive(Debug, Clone)]
pub struct GenerateOutline {
    pub user_id: Uuid,
    pub novel_type: String,
    pub theme: String,
}
