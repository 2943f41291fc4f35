//! SQLite Persistence - SQLite 数据库持久化实现

mod account_repo;
mod chapter_repo;
mod database;
mod novel_repo;

pub use account_repo::*;
pub use chapter_repo::*;
pub use database::*;
pub use novel_repo::*;
