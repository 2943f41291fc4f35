//! CQRS Queries

pub mod handlers;

mod novel_queries;

pub use novel_queries::{GetAccount, GetChapterStatus, GetNovel, ListNovels};
