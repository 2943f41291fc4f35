//! Novel Commands

use uuid::Uuid;

/// 创建小说命令（解析大纲并落库全部章节）
#[derive(Debug, Clone)]
pub struct CreateNovel {
    pub user_id: Uuid,
    pub title: String,
    pub novel_type: String,
    pub theme: String,
    pub outline: String,
}
