//! Post storage - the directory of markdown files and an in-memory stand-in

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{FrontMatter, PostRecord};
use crate::error::ContentError;

/// File extension of post sources
pub const POST_EXTENSION: &str = ".md";

/// Read access to the raw post files
pub trait PostSource {
    /// Raw file names in the posts location, in no particular order
    fn list_identifiers(&self) -> Result<Vec<String>, ContentError>;

    /// Load one post; `identifier` may carry a trailing `.md`
    fn read_post(&self, identifier: &str) -> Result<PostRecord, ContentError>;
}

/// Strip one trailing `.md` from an identifier
pub fn normalize_slug(identifier: &str) -> &str {
    identifier
        .strip_suffix(POST_EXTENSION)
        .unwrap_or(identifier)
}

/// A slug must name a file directly inside the posts location
pub(crate) fn is_addressable(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains(['/', '\\']) && slug != "." && slug != ".."
}

/// Split raw post text into a record
fn parse_post(slug: &str, text: &str) -> Result<PostRecord, ContentError> {
    let (fm, body) = FrontMatter::parse(text).map_err(|e| ContentError::Parse {
        slug: slug.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PostRecord::from_parts(slug, fm, body))
}

/// Posts stored as `<slug>.md` files in one directory
#[derive(Debug, Clone)]
pub struct FsPostStore {
    posts_dir: PathBuf,
}

impl FsPostStore {
    pub fn new<P: Into<PathBuf>>(posts_dir: P) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }

    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }
}

impl PostSource for FsPostStore {
    fn list_identifiers(&self) -> Result<Vec<String>, ContentError> {
        let mut names = Vec::new();

        for entry in WalkDir::new(&self.posts_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.posts_dir.clone());
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(ErrorKind::Other, "walk failed"));
                ContentError::Io { path, source }
            })?;

            // `Path::is_file` follows symlinks, as reading the post does
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        tracing::debug!("Found {} files in {:?}", names.len(), self.posts_dir);
        Ok(names)
    }

    fn read_post(&self, identifier: &str) -> Result<PostRecord, ContentError> {
        let slug = normalize_slug(identifier);
        if !is_addressable(slug) {
            return Err(ContentError::NotFound(identifier.to_string()));
        }

        let path = self.posts_dir.join(format!("{}{}", slug, POST_EXTENSION));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::NotFound(slug.to_string()))
            }
            Err(source) => return Err(ContentError::Io { path, source }),
        };

        parse_post(slug, &text)
    }
}

/// In-memory post storage keyed by file name
#[derive(Debug, Clone, Default)]
pub struct MemoryPostStore {
    files: BTreeMap<String, String>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file; `name` is the raw file name, e.g. `hello.md`
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.insert(name.into(), text.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl PostSource for MemoryPostStore {
    fn list_identifiers(&self) -> Result<Vec<String>, ContentError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_post(&self, identifier: &str) -> Result<PostRecord, ContentError> {
        let slug = normalize_slug(identifier);
        let name = format!("{}{}", slug, POST_EXTENSION);
        match self.files.get(&name) {
            Some(text) if is_addressable(slug) => parse_post(slug, text),
            _ => Err(ContentError::NotFound(slug.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HELLO: &str = "---\ntitle: Hello\ndate: 2022-10-15\nisFeatured: true\n---\n# Hi\n";

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("hello.md"), "hello");
        assert_eq!(normalize_slug("hello"), "hello");
        assert_eq!(normalize_slug("notes.md.md"), "notes.md");
        assert_eq!(normalize_slug("archive.markdown"), "archive.markdown");
    }

    #[test]
    fn test_fs_store_lists_raw_file_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.md"), HELLO).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("drafts").join("nested.md"), HELLO).unwrap();

        let store = FsPostStore::new(dir.path());
        let mut names = store.list_identifiers().unwrap();
        names.sort();
        assert_eq!(names, vec!["hello.md", "notes.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_fs_store_lists_symlinked_posts() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("elsewhere");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("real.md"), HELLO).unwrap();

        let posts = dir.path().join("posts");
        fs::create_dir(&posts).unwrap();
        std::os::unix::fs::symlink(target.join("real.md"), posts.join("linked.md")).unwrap();
        std::os::unix::fs::symlink(target.join("gone.md"), posts.join("dangling.md")).unwrap();

        let store = FsPostStore::new(&posts);
        assert_eq!(store.list_identifiers().unwrap(), vec!["linked.md"]);
        assert_eq!(store.read_post("linked").unwrap().title, "Hello");
    }

    #[test]
    fn test_fs_store_unreadable_location() {
        let dir = TempDir::new().unwrap();
        let store = FsPostStore::new(dir.path().join("missing"));
        assert!(matches!(
            store.list_identifiers(),
            Err(ContentError::Io { .. })
        ));
    }

    #[test]
    fn test_fs_store_read_post_with_and_without_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.md"), HELLO).unwrap();
        let store = FsPostStore::new(dir.path());

        let a = store.read_post("hello").unwrap();
        let b = store.read_post("hello.md").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.slug, "hello");
        assert_eq!(a.title, "Hello");
        assert!(a.is_featured);
        assert_eq!(a.content, "# Hi\n");
    }

    #[test]
    fn test_fs_store_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsPostStore::new(dir.path());
        assert!(store.read_post("nope").unwrap_err().is_not_found());
        assert!(store.read_post("../etc/passwd").unwrap_err().is_not_found());
    }

    #[test]
    fn test_fs_store_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.md"), "---\ntitle: [oops\n---\n").unwrap();
        let store = FsPostStore::new(dir.path());
        assert!(matches!(
            store.read_post("bad"),
            Err(ContentError::Parse { ref slug, .. }) if slug == "bad"
        ));
    }

    #[test]
    fn test_memory_store_matches_fs_contract() {
        let store = MemoryPostStore::new().with_file("hello.md", HELLO);
        assert_eq!(store.list_identifiers().unwrap(), vec!["hello.md"]);
        assert_eq!(store.read_post("hello.md").unwrap().slug, "hello");
        assert!(store.read_post("other").unwrap_err().is_not_found());
    }
}
