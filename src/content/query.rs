//! Post queries used by the page generator

use std::cmp::Reverse;

use super::store::{is_addressable, normalize_slug, PostSource, POST_EXTENSION};
use super::PostRecord;
use crate::error::ContentError;

/// Read-only queries over a [`PostSource`]
///
/// Every call goes back to the source; there is no cache to invalidate.
pub struct PostQuery<S> {
    source: S,
}

impl<S: PostSource> PostQuery<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// All posts, newest first
    ///
    /// A post with malformed front-matter is skipped with a warning instead of
    /// failing the whole listing.
    pub fn get_all(&self) -> Result<Vec<PostRecord>, ContentError> {
        let mut posts = Vec::new();

        for identifier in self.post_files()? {
            match self.source.read_post(&identifier) {
                Ok(post) => posts.push(post),
                Err(ContentError::Parse { slug, reason }) => {
                    tracing::warn!("Skipping post {}: {}", slug, reason);
                }
                Err(e) => return Err(e),
            }
        }

        sort_newest_first(&mut posts);
        Ok(posts)
    }

    /// Featured posts, newest first
    pub fn get_featured(&self) -> Result<Vec<PostRecord>, ContentError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.is_featured)
            .collect())
    }

    /// A single post by slug or file name
    pub fn get_one(&self, identifier: &str) -> Result<PostRecord, ContentError> {
        self.source.read_post(identifier)
    }

    /// Slugs of every routable post
    pub fn list_all_slugs(&self) -> Result<Vec<String>, ContentError> {
        Ok(self
            .post_files()?
            .iter()
            .map(|name| normalize_slug(name).to_string())
            .collect())
    }

    /// Whether `slug` is one of the generated post routes
    pub fn has_slug(&self, slug: &str) -> Result<bool, ContentError> {
        Ok(self.list_all_slugs()?.iter().any(|s| s == slug))
    }

    fn post_files(&self) -> Result<Vec<String>, ContentError> {
        let mut names = self.source.list_identifiers()?;
        names.retain(|name| {
            name.ends_with(POST_EXTENSION) && is_addressable(normalize_slug(name))
        });
        Ok(names)
    }
}

/// Sort by publication date, descending
///
/// Recognizable dates compare in time whatever their notation. Posts whose
/// date cannot be parsed come after all dated posts, ordered by their raw
/// text. Posts sharing a date keep their listing order.
pub fn sort_newest_first(posts: &mut [PostRecord]) {
    posts.sort_by_cached_key(|post| match post.parsed_date() {
        Some(date) => Reverse((Some(date), String::new())),
        None => Reverse((None, post.date.clone())),
    });
}
