//! HTTP Handlers

mod account;
mod chapter;
mod novel;
mod outline;
mod ping;

pub use account::get_account;
pub use chapter::{chapter_status, generate_chapter};
pub use novel::{create_novel, get_novel, list_novels};
pub use outline::generate_outline;
pub use ping::ping;
