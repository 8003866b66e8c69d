//! Post model

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::frontmatter::{parse_date_string, FrontMatter};

/// A blog post as read from the posts directory
///
/// Records are rebuilt from their source text on every read; nothing here is
/// cached between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Extension-free identifier taken from the file name
    pub slug: String,

    /// Post title (falls back to the slug)
    pub title: String,

    /// Publication date exactly as written in the front-matter
    pub date: String,

    /// Short description used on listings and in the page meta
    pub summary: String,

    /// Cover image file name, relative to the post's image folder
    pub image: Option<String>,

    /// Whether the post is promoted on the home page
    pub is_featured: bool,

    /// Raw markdown body
    pub content: String,

    /// Remaining front-matter fields
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl PostRecord {
    /// Build a record from parsed front-matter and the markdown body
    pub fn from_parts(slug: &str, fm: FrontMatter, body: &str) -> Self {
        Self {
            slug: slug.to_string(),
            title: fm.title.unwrap_or_else(|| slug.to_string()),
            date: fm.date.unwrap_or_default(),
            summary: fm.summary.unwrap_or_default(),
            image: fm.image,
            is_featured: fm.is_featured,
            content: body.to_string(),
            extra: fm.extra,
        }
    }

    /// Parsed publication date, if the front-matter date is recognizable
    pub fn parsed_date(&self) -> Option<DateTime<Local>> {
        parse_date_string(&self.date)
    }

    /// Get the previous (newer) post in a date-ordered list
    pub fn prev<'a>(&self, posts: &'a [PostRecord]) -> Option<&'a PostRecord> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos > 0 {
            Some(&posts[pos - 1])
        } else {
            None
        }
    }

    /// Get the next (older) post in a date-ordered list
    pub fn next<'a>(&self, posts: &'a [PostRecord]) -> Option<&'a PostRecord> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        posts.get(pos + 1)
    }
}
