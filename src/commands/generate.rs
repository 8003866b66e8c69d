//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::new_debouncer;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Blog;

/// Generate the static site
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let report = Generator::new(blog)?.generate()?;

    tracing::info!(
        "Generated {} posts ({} featured) in {:.2}s",
        report.posts,
        report.featured,
        start.elapsed().as_secs_f64()
    );
    if report.skipped > 0 {
        tracing::warn!("Skipped {} posts with invalid front-matter", report.skipped);
    }
    if report.removed > 0 {
        tracing::info!("Removed {} stale post pages", report.removed);
    }

    Ok(())
}

/// Watch the posts directory and regenerate on change
pub async fn watch(blog: &Blog) -> Result<()> {
    let blog = blog.clone();
    tokio::task::spawn_blocking(move || watch_blocking(&blog)).await?
}

fn watch_blocking(blog: &Blog) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    debouncer
        .watcher()
        .watch(&blog.posts_dir, notify::RecursiveMode::Recursive)?;
    if blog.images_dir.exists() {
        debouncer
            .watcher()
            .watch(&blog.images_dir, notify::RecursiveMode::Recursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                tracing::info!("{} file(s) changed, regenerating...", events.len());
                if let Err(e) = run(blog) {
                    tracing::error!("Generation failed: {}", e);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}
