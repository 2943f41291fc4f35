//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateNovelHandler, GenerateOutlineHandler, StartChapterGenerationHandler,
    // Query handlers
    GetAccountHandler, GetChapterStatusHandler, GetNovelHandler, ListNovelsHandler,
    // Ports
    AccountRepositoryPort, ChapterRepositoryPort, LlmEnginePort, NovelRepositoryPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    // 生成引擎保留直接入口供健康检查使用，仓储只通过 handlers 访问
    pub llm_engine: Arc<dyn LlmEnginePort>,

    // ========== Command Handlers ==========
    pub create_novel_handler: CreateNovelHandler,
    pub start_generation_handler: StartChapterGenerationHandler,
    pub generate_outline_handler: GenerateOutlineHandler,

    // ========== Query Handlers ==========
    pub get_novel_handler: GetNovelHandler,
    pub list_novels_handler: ListNovelsHandler,
    pub get_chapter_status_handler: GetChapterStatusHandler,
    pub get_account_handler: GetAccountHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        novel_repo: Arc<dyn NovelRepositoryPort>,
        chapter_repo: Arc<dyn ChapterRepositoryPort>,
        account_repo: Arc<dyn AccountRepositoryPort>,
        llm_engine: Arc<dyn LlmEnginePort>,
    ) -> Self {
        Self {
            // Ports
            llm_engine: llm_engine.clone(),

            // Command handlers
            create_novel_handler: CreateNovelHandler::new(novel_repo.clone()),
            start_generation_handler: StartChapterGenerationHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
                account_repo.clone(),
                llm_engine.clone(),
            ),
            generate_outline_handler: GenerateOutlineHandler::new(llm_engine.clone()),

            // Query handlers
            get_novel_handler: GetNovelHandler::new(novel_repo.clone(), chapter_repo.clone()),
            list_novels_handler: ListNovelsHandler::new(novel_repo.clone(), chapter_repo.clone()),
            get_chapter_status_handler: GetChapterStatusHandler::new(
                novel_repo.clone(),
                chapter_repo.clone(),
            ),
            get_account_handler: GetAccountHandler::new(account_repo.clone()),
        }
    }
}
