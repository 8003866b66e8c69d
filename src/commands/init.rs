//! Initialize a new blog

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::{Blog, CONFIG_FILE};

const CONFIG_TEMPLATE: &str = r#"# Site
title: My Blog
description: Posts about web development and software
author: Anonymous
tagline: I blog about web development.

# URL
url: http://localhost:4000
root: /

# Directory
posts_dir: content/posts
images_dir: images
public_dir: public

# Contact messages (overridden by INKWELL_DATABASE)
database: data/messages.db

# Seconds between background regenerations while serving
revalidate: 21600

# How long success and error notifications stay visible
notification_timeout_ms: 3000

# Date format (chrono strftime)
date_format: "%B %-d, %Y"
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let defaults = SiteConfig::default();
    let posts_dir = target_dir.join(&defaults.posts_dir);
    let images_dir = target_dir.join(&defaults.images_dir);

    fs::create_dir_all(&posts_dir)?;
    fs::create_dir_all(images_dir.join("posts").join("hello-world"))?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        tracing::info!("Keeping existing {:?}", config_path);
    } else {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
    }

    let sample_path = posts_dir.join("hello-world.md");
    if !sample_path.exists() {
        let now = chrono::Local::now();
        let sample_post = format!(
            r#"---
title: Hello World
date: {}
summary: The first post on this blog.
isFeatured: true
---

Welcome! This post lives in `{}/hello-world.md`.

## Writing posts

```bash
$ inkwell new "My New Post" --featured
```

Images for a post go in `{}/posts/<slug>/` and are referenced by file name.

## Building

```bash
$ inkwell generate
$ inkwell server
```
"#,
            now.format("%Y-%m-%d"),
            defaults.posts_dir,
            defaults.images_dir,
        );
        fs::write(&sample_path, sample_post)?;
    }

    Ok(())
}

/// Run the init command with an existing Blog instance
pub fn run(blog: &Blog) -> Result<()> {
    init_site(&blog.base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let config = SiteConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.posts_dir, "content/posts");
        assert_eq!(config.date_format, "%B %-d, %Y");

        let blog = Blog::with_config(dir.path().to_path_buf(), config);
        let posts = blog.posts().get_featured().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "hello-world");
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();

        let config = SiteConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.title, "Mine");
    }
}
