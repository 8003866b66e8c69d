//! Generator module - renders the static pages with the built-in Tera templates

use anyhow::{Context as _, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::contact::form::{error_notification, pending_notification, success_notification};
use crate::content::{FsPostStore, MarkdownRenderer, PostQuery, PostRecord};
use crate::error::ContentError;
use crate::helpers::{
    date_xml, display_date, encode_segment, full_url_for, post_image_path, post_url, url_for,
};
use crate::templates::{NavPost, PostCard, SiteData, TemplateRenderer};
use crate::Blog;

/// Summary of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub posts: usize,
    pub featured: usize,
    pub skipped: usize,
    pub removed: usize,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::new(),
        })
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<GenerateReport> {
        let query = self.blog.posts();
        let public_dir = &self.blog.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("failed to create {:?}", public_dir))?;

        let site = self.site_data();

        let all_posts = query.get_all()?;
        let featured = query.get_featured()?;

        self.generate_home(&site, &featured)?;
        self.generate_post_list(&site, &all_posts)?;
        let (written, skipped) = self.generate_post_pages(&site, &query, &all_posts)?;
        self.generate_contact_page(&site)?;
        self.generate_not_found_page(&site)?;
        self.copy_images()?;
        let removed = self.remove_stale_posts(&written)?;

        Ok(GenerateReport {
            posts: written.len(),
            featured: featured.len(),
            skipped,
            removed,
        })
    }

    fn site_data(&self) -> SiteData {
        let config = &self.blog.config;
        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            tagline: config.tagline.clone(),
            root: url_for(&config.root, ""),
        }
    }

    /// Context shared by every page; `path` is the page route below the root
    fn base_context(&self, site: &SiteData, path: &str) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("canonical", &full_url_for(&config.url, &config.root, path));
        context
    }

    fn post_card(&self, post: &PostRecord) -> PostCard {
        let root = &self.blog.config.root;
        let parsed = post.parsed_date();
        PostCard {
            slug: post.slug.clone(),
            title: post.title.clone(),
            date: display_date(&post.date, parsed, &self.blog.config.date_format),
            datetime: parsed.map(|d| date_xml(&d)).unwrap_or_else(|| post.date.clone()),
            summary: post.summary.clone(),
            image: post
                .image
                .as_deref()
                .map(|image| post_image_path(root, &post.slug, image)),
            url: post_url(root, &post.slug),
        }
    }

    fn nav_post(&self, post: &PostRecord) -> NavPost {
        NavPost {
            title: post.title.clone(),
            url: post_url(&self.blog.config.root, &post.slug),
        }
    }

    /// Home page with the featured posts
    fn generate_home(&self, site: &SiteData, featured: &[PostRecord]) -> Result<()> {
        let cards: Vec<PostCard> = featured.iter().map(|p| self.post_card(p)).collect();

        let mut context = self.base_context(site, "");
        context.insert("posts", &cards);

        let html = self.renderer.render("home.html", &context)?;
        write_page(&self.blog.public_dir.join("index.html"), &html)
    }

    /// Listing of every post
    fn generate_post_list(&self, site: &SiteData, posts: &[PostRecord]) -> Result<()> {
        let cards: Vec<PostCard> = posts.iter().map(|p| self.post_card(p)).collect();

        let mut context = self.base_context(site, "posts/");
        context.insert("posts", &cards);

        let html = self.renderer.render("posts.html", &context)?;
        write_page(&self.blog.public_dir.join("posts").join("index.html"), &html)
    }

    /// One page per routable slug; returns the written slugs and the skip count
    fn generate_post_pages(
        &self,
        site: &SiteData,
        query: &PostQuery<FsPostStore>,
        ordered: &[PostRecord],
    ) -> Result<(HashSet<String>, usize)> {
        let mut written = HashSet::new();
        let mut skipped = 0;

        for slug in query.list_all_slugs()? {
            let post = match query.get_one(&slug) {
                Ok(post) => post,
                Err(e @ ContentError::Parse { .. }) => {
                    tracing::warn!("Skipping page for {}: {}", slug, e);
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let content = self
                .markdown
                .render_post(&post.content, &self.blog.config.root, &post.slug);

            let card = self.post_card(&post);
            let route = format!("posts/{}/", encode_segment(&post.slug));
            let mut context = self.base_context(site, &route);
            context.insert("post", &card);
            context.insert("content", &content);
            context.insert("prev", &post.prev(ordered).map(|p| self.nav_post(p)));
            context.insert("next", &post.next(ordered).map(|p| self.nav_post(p)));

            let html = self.renderer.render("post.html", &context)?;
            let output_path = self
                .blog
                .public_dir
                .join("posts")
                .join(&post.slug)
                .join("index.html");
            write_page(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);

            written.insert(post.slug);
        }

        Ok((written, skipped))
    }

    fn generate_contact_page(&self, site: &SiteData) -> Result<()> {
        let notifications = serde_json::json!({
            "pending": pending_notification(),
            "success": success_notification(),
            "error": error_notification(),
        });

        let mut context = self.base_context(site, "contact/");
        context.insert("notifications", &notifications.to_string());
        context.insert(
            "notification_timeout_ms",
            &self.blog.config.notification_timeout_ms,
        );

        let html = self.renderer.render("contact.html", &context)?;
        write_page(&self.blog.public_dir.join("contact").join("index.html"), &html)
    }

    fn generate_not_found_page(&self, site: &SiteData) -> Result<()> {
        let html = self.renderer.render("404.html", &self.base_context(site, "404.html"))?;
        write_page(&self.blog.public_dir.join("404.html"), &html)
    }

    /// Copy post images into the public directory
    fn copy_images(&self) -> Result<()> {
        let images_dir = &self.blog.images_dir;
        if !images_dir.exists() {
            return Ok(());
        }

        let dest_root = self.blog.public_dir.join("images");
        for entry in WalkDir::new(images_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(images_dir)?;
            let dest = dest_root.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("failed to copy {:?} to {:?}", path, dest))?;
        }

        Ok(())
    }

    /// Remove pages of posts that no longer exist
    fn remove_stale_posts(&self, written: &HashSet<String>) -> Result<usize> {
        let posts_dir = self.blog.public_dir.join("posts");
        let mut removed = 0;

        for entry in fs::read_dir(&posts_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !written.contains(&name) {
                fs::remove_dir_all(entry.path())?;
                tracing::info!("Removed stale post page: {}", name);
                removed += 1;
            }
        }

        Ok(removed)
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir {:?}", parent))?;
    }
    fs::write(path, html).with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    fn blog_with_posts(dir: &TempDir) -> Blog {
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(&blog.posts_dir).unwrap();
        fs::write(
            blog.posts_dir.join("first.md"),
            "---\ntitle: First\ndate: 2022-01-01\nsummary: one\nimage: cover.png\nisFeatured: true\n---\n![inline](diagram.png)\n",
        )
        .unwrap();
        fs::write(
            blog.posts_dir.join("second.md"),
            "---\ntitle: Second\ndate: 2023-01-01\nsummary: two\nisFeatured: false\n---\n## Body\n",
        )
        .unwrap();
        blog
    }

    #[test]
    fn test_generate_writes_all_pages() {
        let dir = TempDir::new().unwrap();
        let blog = blog_with_posts(&dir);

        let report = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(report.posts, 2);
        assert_eq!(report.featured, 1);

        let public = &blog.public_dir;
        let home = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(home.contains("First"));
        assert!(!home.contains("Second"));

        let listing = fs::read_to_string(public.join("posts/index.html")).unwrap();
        let second = listing.find("Second").unwrap();
        let first = listing.find("First").unwrap();
        assert!(second < first, "newest post should be listed first");
        assert!(listing.contains("January 1, 2022"));

        let page = fs::read_to_string(public.join("posts/first/index.html")).unwrap();
        assert!(page.contains("/images/posts/first/cover.png"));
        assert!(page.contains("/images/posts/first/diagram.png"));
        assert!(page.contains(r#"href="/posts/second/""#));

        assert!(public.join("contact/index.html").exists());
        assert!(public.join("404.html").exists());
    }

    #[test]
    fn test_regeneration_removes_deleted_posts() {
        let dir = TempDir::new().unwrap();
        let blog = blog_with_posts(&dir);
        let generator = Generator::new(&blog).unwrap();
        generator.generate().unwrap();

        fs::remove_file(blog.posts_dir.join("second.md")).unwrap();
        let report = generator.generate().unwrap();
        assert_eq!(report.removed, 1);
        assert!(!blog.public_dir.join("posts/second").exists());
        assert!(blog.public_dir.join("posts/first/index.html").exists());
    }

    #[test]
    fn test_broken_post_is_skipped() {
        let dir = TempDir::new().unwrap();
        let blog = blog_with_posts(&dir);
        fs::write(blog.posts_dir.join("broken.md"), "---\ntitle: [x\n---\n").unwrap();

        let report = Generator::new(&blog).unwrap().generate().unwrap();
        assert_eq!(report.posts, 2);
        assert_eq!(report.skipped, 1);
    }
}
