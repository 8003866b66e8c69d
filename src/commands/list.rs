//! List site content

use anyhow::Result;

use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let query = blog.posts();

    match content_type {
        "post" | "posts" => {
            let posts = query.get_all()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", post.date, post.title, post.slug);
            }
        }
        "featured" => {
            let posts = query.get_featured()?;
            println!("Featured ({}):", posts.len());
            for post in posts {
                println!("  {} - {} [{}]", post.date, post.title, post.slug);
            }
        }
        "slug" | "slugs" => {
            for slug in query.list_all_slugs()? {
                println!("{}", slug);
            }
        }
        "message" | "messages" => {
            let messages = blog.submissions()?.list()?;
            println!("Messages ({}):", messages.len());
            for message in messages {
                println!(
                    "  {} <{}> [{}]",
                    message.name,
                    message.email,
                    message.id.as_deref().unwrap_or("-")
                );
                println!("    {}", message.message);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, featured, slugs, messages",
                content_type
            );
        }
    }

    Ok(())
}
