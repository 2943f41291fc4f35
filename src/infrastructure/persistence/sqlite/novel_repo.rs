//! SQLite Novel Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::DbPool;
use crate::application::ports::{
    ChapterRecord, NovelRecord, NovelRepositoryPort, RepositoryError,
};

/// SQLite Novel Repository
pub struct SqliteNovelRepository {
    pool: DbPool,
}

impl SqliteNovelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NovelRow {
    id: String,
    user_id: String,
    title: String,
    novel_type: String,
    theme: String,
    outline: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<NovelRow> for NovelRecord {
    type Error = RepositoryError;

    fn try_from(row: NovelRow) -> Result<Self, Self::Error> {
        Ok(NovelRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            novel_type: row.novel_type,
            theme: row.theme,
            outline: row.outline,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

const NOVEL_COLUMNS: &str = "id, user_id, title, novel_type, theme, outline, created_at, updated_at";

#[async_trait]
impl NovelRepositoryPort for SqliteNovelRepository {
    async fn create_with_chapters(
        &self,
        novel: &NovelRecord,
        chapters: &[ChapterRecord],
    ) -> Result<(), RepositoryError> {
        // 单事务写入: 小说与全部章节要么都在要么都不在
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO novels (id, user_id, title, novel_type, theme, outline, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(novel.id.to_string())
        .bind(novel.user_id.to_string())
        .bind(&novel.title)
        .bind(&novel.novel_type)
        .bind(&novel.theme)
        .bind(&novel.outline)
        .bind(novel.created_at.to_rfc3339())
        .bind(novel.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        for chapter in chapters {
            sqlx::query(
                r#"
                INSERT INTO chapters
                    (id, novel_id, chapter_number, title, summary, content, status, word_count, cost, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(chapter.id.to_string())
            .bind(chapter.novel_id.to_string())
            .bind(chapter.chapter_number as i64)
            .bind(&chapter.title)
            .bind(&chapter.summary)
            .bind(&chapter.content)
            .bind(chapter.status.as_str())
            .bind(chapter.word_count)
            .bind(chapter.cost)
            .bind(chapter.created_at.to_rfc3339())
            .bind(chapter.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<NovelRecord>, RepositoryError> {
        let row: Option<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels WHERE id = ?",
            NOVEL_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(NovelRecord::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<NovelRecord>, RepositoryError> {
        let rows: Vec<NovelRow> = sqlx::query_as(&format!(
            "SELECT {} FROM novels WHERE user_id = ? ORDER BY created_at DESC",
            NOVEL_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(NovelRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ChapterRepositoryPort, ChapterStatus};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
    };

    async fn setup() -> (SqliteNovelRepository, SqliteChapterRepository) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (
            SqliteNovelRepository::new(pool.clone()),
            SqliteChapterRepository::new(pool),
        )
    }

    fn novel_record() -> NovelRecord {
        let now = Utc::now();
        NovelRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "测试小说".to_string(),
            novel_type: "都市".to_string(),
            theme: "逆袭".to_string(),
            outline: "第1章 开端：起点。".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn chapter_record(novel_id: Uuid, id: Uuid, number: u32) -> ChapterRecord {
        let now = Utc::now();
        ChapterRecord {
            id,
            novel_id,
            chapter_number: number,
            title: format!("第{}章标题", number),
            summary: "梗概。".to_string(),
            content: String::new(),
            status: ChapterStatus::Pending,
            word_count: 0,
            cost: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_with_chapters_persists_both() {
        let (novel_repo, chapter_repo) = setup().await;
        let novel = novel_record();
        let chapters = vec![
            chapter_record(novel.id, Uuid::new_v4(), 1),
            chapter_record(novel.id, Uuid::new_v4(), 2),
        ];

        novel_repo.create_with_chapters(&novel, &chapters).await.unwrap();

        let stored = novel_repo.find_by_id(novel.id).await.unwrap().unwrap();
        assert_eq!(stored.title, novel.title);
        assert_eq!(chapter_repo.find_by_novel(novel.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mid_batch_failure_leaves_no_rows() {
        let (novel_repo, chapter_repo) = setup().await;
        let novel = novel_record();

        // 两个章节撞同一主键, 第二条插入必然失败
        let duplicate_id = Uuid::new_v4();
        let chapters = vec![
            chapter_record(novel.id, duplicate_id, 1),
            chapter_record(novel.id, duplicate_id, 2),
        ];

        let result = novel_repo.create_with_chapters(&novel, &chapters).await;
        assert!(matches!(result, Err(RepositoryError::DatabaseError(_))));

        // 要么都在要么都不在: 小说与任何章节都不得落库
        assert!(novel_repo.find_by_id(novel.id).await.unwrap().is_none());
        assert!(chapter_repo.find_by_novel(novel.id).await.unwrap().is_empty());
    }
}
