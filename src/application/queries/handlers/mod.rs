//! Query Handlers

mod novel_handlers;

pub use novel_handlers::{
    ChapterStatusView, GetAccountHandler, GetChapterStatusHandler, GetNovelHandler,
    ListNovelsHandler, NovelDetail,
};
