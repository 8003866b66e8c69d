//! Content module - reads markdown posts and answers queries over them

mod frontmatter;
mod markdown;
mod post;
pub mod query;
pub mod store;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::PostRecord;
pub use query::PostQuery;
pub use store::{normalize_slug, FsPostStore, MemoryPostStore, PostSource};
