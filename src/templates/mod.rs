//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary, so a site needs nothing but its
//! posts and configuration.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Template renderer with the embedded blog templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Post bodies are rendered HTML; user-provided text is escaped explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("home.html", include_str!("blog/home.html")),
            ("posts.html", include_str!("blog/posts.html")),
            ("post.html", include_str!("blog/post.html")),
            ("contact.html", include_str!("blog/contact.html")),
            ("404.html", include_str!("blog/404.html")),
            // Partials
            ("partials/nav.html", include_str!("blog/partials/nav.html")),
            (
                "partials/post_grid.html",
                include_str!("blog/partials/post_grid.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}...", truncated.trim_end())))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub tagline: String,
    pub root: String,
}

/// A post as shown on listings
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    /// Display date
    pub date: String,
    /// Machine readable date for `<time>`
    pub datetime: String,
    pub summary: String,
    pub image: Option<String>,
    pub url: String,
}

/// Link to a neighbouring post
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "Jordan's Blog".into(),
            description: "desc".into(),
            author: "Jordan".into(),
            tagline: "I blog".into(),
            root: "/".into(),
        }
    }

    #[test]
    fn test_render_home_with_posts() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("canonical", "http://localhost:4000/");
        context.insert(
            "posts",
            &vec![PostCard {
                slug: "hello".into(),
                title: "Hello <World>".into(),
                date: "January 5, 2024".into(),
                datetime: "2024-01-05T00:00:00+00:00".into(),
                summary: "First post".into(),
                image: None,
                url: "/posts/hello/".into(),
            }],
        );

        let html = renderer.render("home.html", &context).unwrap();
        assert!(html.contains("Featured Posts"));
        assert!(html.contains(r#"href="/posts/hello/""#));
        assert!(html.contains("Hello &lt;World&gt;"));
    }

    #[test]
    fn test_raw_dates_are_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("canonical", "http://localhost:4000/posts/");
        context.insert(
            "posts",
            &vec![PostCard {
                slug: "odd".into(),
                title: "Odd".into(),
                date: "<b>soon</b>".into(),
                datetime: "\"><script>".into(),
                summary: String::new(),
                image: None,
                url: "/posts/odd/".into(),
            }],
        );

        let html = renderer.render("posts.html", &context).unwrap();
        assert!(html.contains("&lt;b&gt;soon&lt;&#x2F;b&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let value = tera::Value::String("abcdef".into());
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(3));
        let out = truncate_chars_filter(&value, &args).unwrap();
        assert_eq!(out, tera::Value::String("abc...".into()));
    }
}
