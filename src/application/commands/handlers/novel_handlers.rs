//! Novel Command Handlers

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::CreateNovel;
use crate::application::error::ApplicationError;
use crate::application::ports::{ChapterRecord, ChapterStatus, NovelRecord, NovelRepositoryPort};
use crate::domain::parse_outline;

/// 创建小说响应
#[derive(Debug, Clone)]
pub struct CreateNovelResponse {
    pub novel: NovelRecord,
    pub chapters: Vec<ChapterRecord>,
}

/// CreateNovel Handler - 解析大纲并在单个事务内落库小说与全部章节
pub struct CreateNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
}

impl CreateNovelHandler {
    pub fn new(novel_repo: Arc<dyn NovelRepositoryPort>) -> Self {
        Self { novel_repo }
    }

    pub async fn handle(
        &self,
        command: CreateNovel,
    ) -> Result<CreateNovelResponse, ApplicationError> {
        if command.title.trim().is_empty() {
            return Err(ApplicationError::validation("title is required"));
        }
        if command.novel_type.trim().is_empty() {
            return Err(ApplicationError::validation("novel_type is required"));
        }
        if command.theme.trim().is_empty() {
            return Err(ApplicationError::validation("theme is required"));
        }
        if command.outline.trim().is_empty() {
            return Err(ApplicationError::validation("outline is required"));
        }

        let parsed = parse_outline(&command.outline);
        if parsed.is_empty() {
            return Err(ApplicationError::UnparsableOutline);
        }

        let now = Utc::now();
        let novel = NovelRecord {
            id: Uuid::new_v4(),
            user_id: command.user_id,
            title: command.title,
            novel_type: command.novel_type,
            theme: command.theme,
            outline: command.outline,
            created_at: now,
            updated_at: now,
        };

        let chapters: Vec<ChapterRecord> = parsed
            .into_iter()
            .map(|pc| ChapterRecord {
                id: Uuid::new_v4(),
                novel_id: novel.id,
                chapter_number: pc.number,
                title: pc.title,
                summary: pc.summary,
                content: String::new(),
                status: ChapterStatus::Pending,
                word_count: 0,
                cost: 0,
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.novel_repo.create_with_chapters(&novel, &chapters).await?;

        tracing::info!(
            novel_id = %novel.id,
            user_id = %novel.user_id,
            title = %novel.title,
            chapters = chapters.len(),
            "Novel created"
        );

        Ok(CreateNovelResponse { novel, chapters })
    }
}
