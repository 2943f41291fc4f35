//! Command Handlers

mod generation_handlers;
mod novel_handlers;

pub use generation_handlers::{
    ChapterFragmentStream, GenerateOutlineHandler, StartChapterGenerationHandler,
};
pub use novel_handlers::{CreateNovelHandler, CreateNovelResponse};
