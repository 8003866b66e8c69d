//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::store::POST_EXTENSION;
use crate::Blog;

/// Front-matter options for a new post
#[derive(Debug, Clone, Default)]
pub struct PostOptions {
    pub featured: bool,
    pub summary: Option<String>,
}

/// Create a new post file and return its path
pub fn create_post(blog: &Blog, title: &str, options: &PostOptions) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title: {:?}", title);
    }

    fs::create_dir_all(&blog.posts_dir)?;
    let file_path = blog.posts_dir.join(format!("{}{}", slug, POST_EXTENSION));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let content = format!(
        "---\ntitle: {}\ndate: {}\nsummary: {}\nimage: \nisFeatured: {}\n---\n",
        yaml_string(title),
        now.format("%Y-%m-%d"),
        yaml_string(options.summary.as_deref().unwrap_or("")),
        options.featured
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a scalar so any title survives the YAML round trip
fn yaml_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_is_readable() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());

        let options = PostOptions {
            featured: true,
            summary: Some("Colons: and \"quotes\"".into()),
        };
        let path = create_post(&blog, "Getting Started: Part 1", &options).unwrap();
        assert!(path.ends_with("getting-started-part-1.md"));

        let post = blog.posts().get_one("getting-started-part-1").unwrap();
        assert_eq!(post.title, "Getting Started: Part 1");
        assert_eq!(post.summary, "Colons: and \"quotes\"");
        assert!(post.is_featured);
        assert_eq!(post.image, None);
    }

    #[test]
    fn test_create_post_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());

        create_post(&blog, "Twice", &PostOptions::default()).unwrap();
        assert!(create_post(&blog, "Twice", &PostOptions::default()).is_err());
    }
}
