//! Novel / Chapter / Account Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    AccountRecord, AccountRepositoryPort, ChapterRecord, ChapterRepositoryPort, ChapterStatus,
    NovelRecord, NovelRepositoryPort,
};
use crate::application::queries::{GetAccount, GetChapterStatus, GetNovel, ListNovels};
use crate::application::INITIAL_TOKEN_GRANT;

/// 小说详情（含章节）
#[derive(Debug, Clone)]
pub struct NovelDetail {
    pub novel: NovelRecord,
    pub chapters: Vec<ChapterRecord>,
}

/// 章节状态视图 - 只反映已持久化提交的状态，绝不暴露生成中的累积缓冲
#[derive(Debug, Clone)]
pub struct ChapterStatusView {
    pub status: ChapterStatus,
    pub content: String,
    pub word_count: i64,
    pub cost: i64,
}

/// ListNovels Handler
pub struct ListNovelsHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl ListNovelsHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: ListNovels) -> Result<Vec<NovelDetail>, ApplicationError> {
        let novels = self.novel_repo.find_by_user(query.user_id).await?;

        let mut details = Vec::with_capacity(novels.len());
        for novel in novels {
            let chapters = self.chapter_repo.find_by_novel(novel.id).await?;
            details.push(NovelDetail { novel, chapters });
        }
        Ok(details)
    }
}

/// GetNovel Handler
pub struct GetNovelHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetNovelHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(&self, query: GetNovel) -> Result<NovelDetail, ApplicationError> {
        let novel = self
            .novel_repo
            .find_by_id(query.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", query.novel_id))?;

        if novel.user_id != query.user_id {
            return Err(ApplicationError::not_found("Novel", query.novel_id));
        }

        let chapters = self.chapter_repo.find_by_novel(novel.id).await?;
        Ok(NovelDetail { novel, chapters })
    }
}

/// GetChapterStatus Handler
pub struct GetChapterStatusHandler {
    novel_repo: Arc<dyn NovelRepositoryPort>,
    chapter_repo: Arc<dyn ChapterRepositoryPort>,
}

impl GetChapterStatusHandler {
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
    ) -> Self {
        Self {
            novel_repo,
            chapter_repo,
        }
    }

    pub async fn handle(
        &self,
        query: GetChapterStatus,
    ) -> Result<ChapterStatusView, ApplicationError> {
        let chapter = self
            .chapter_repo
            .find_by_id(query.chapter_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Chapter", query.chapter_id))?;

        let novel = self
            .novel_repo
            .find_by_id(chapter.novel_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Novel", chapter.novel_id))?;
        if novel.user_id != query.user_id {
            return Err(ApplicationError::not_found("Chapter", query.chapter_id));
        }

        Ok(ChapterStatusView {
            status: chapter.status,
            content: chapter.content,
            word_count: chapter.word_count,
            cost: chapter.cost,
        })
    }
}

/// GetAccount Handler - 不存在则按初始赠送额度创建
pub struct GetAccountHandler {
    account_repo: Arc<dyn AccountRepositoryPort>,
}

impl GetAccountHandler {
    pub fn new(account_repo: Arc<dyn AccountRepositoryPort>) -> Self {
        Self { account_repo }
    }

    pub async fn handle(&self, query: GetAccount) -> Result<AccountRecord, ApplicationError> {
        let account = self
            .account_repo
            .ensure(query.user_id, INITIAL_TOKEN_GRANT)
            .await?;
        Ok(account)
    }
}
