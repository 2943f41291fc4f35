//! CQRS Commands

pub mod handlers;

mod generation_commands;
mod novel_commands;

pub use generation_commands::{GenerateOutline, StartChapterGeneration};
pub use novel_commands::CreateNovel;
