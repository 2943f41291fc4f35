//! SQLite Chapter Repository
//!
//! 状态迁移全部通过条件 UPDATE 实现:
//! UPDATE ... WHERE status = '<前置状态>'，用受影响行数判定迁移归属，
//! 保证并发调用中至多一个赢家。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, ChapterStatus, RepositoryError,
};

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    novel_id: String,
    chapter_number: i64,
    title: String,
    summary: String,
    content: String,
    status: String,
    word_count: i64,
    cost: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            novel_id: Uuid::parse_str(&row.novel_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            chapter_number: row.chapter_number as u32,
            title: row.title,
            summary: row.summary,
            content: row.content,
            status: ChapterStatus::from_str(&row.status).unwrap_or_default(),
            word_count: row.word_count,
            cost: row.cost,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

const CHAPTER_COLUMNS: &str =
    "id, novel_id, chapter_number, title, summary, content, status, word_count, cost, created_at, updated_at";

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE id = ?",
            CHAPTER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_novel(&self, novel_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chapters WHERE novel_id = ? ORDER BY chapter_number ASC",
            CHAPTER_COLUMNS
        ))
        .bind(novel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn try_begin_generation(&self, id: Uuid, cost: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE chapters
            SET status = 'generating', cost = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(cost)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_generation(
        &self,
        id: Uuid,
        content: &str,
        word_count: i64,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE chapters
            SET status = 'completed', content = ?, word_count = ?, updated_at = ?
            WHERE id = ? AND status = 'generating'
            "#,
        )
        .bind(content)
        .bind(word_count)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn reset_generation(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE chapters
            SET status = 'pending', cost = 0, updated_at = ?
            WHERE id = ? AND status = 'generating'
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_previous_completed_content(
        &self,
        novel_id: Uuid,
        chapter_number: u32,
    ) -> Result<Option<String>, RepositoryError> {
        if chapter_number <= 1 {
            return Ok(None);
        }

        // 编号可能重复, 取最近更新的已完成章节
        let content: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT content FROM chapters
            WHERE novel_id = ? AND chapter_number = ? AND status = 'completed'
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(novel_id.to_string())
        .bind((chapter_number - 1) as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(content.map(|(c,)| c))
    }
}
