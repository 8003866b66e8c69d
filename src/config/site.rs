//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::helpers::DISPLAY_DATE_FORMAT;

/// Environment variable overriding the submissions database location
pub const DATABASE_ENV: &str = "INKWELL_DATABASE";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    /// Short introduction shown on the home page
    pub tagline: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub posts_dir: String,
    pub images_dir: String,
    pub public_dir: String,

    // Contact submissions
    pub database: String,

    // Regeneration
    /// Seconds between background regenerations while serving
    pub revalidate: u64,

    // Notifications
    pub notification_timeout_ms: u64,

    // Date format (chrono)
    pub date_format: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: "Posts about web development and software".to_string(),
            author: "Anonymous".to_string(),
            tagline: "I blog about web development.".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            posts_dir: "content/posts".to_string(),
            images_dir: "images".to_string(),
            public_dir: "public".to_string(),

            database: "data/messages.db".to_string(),

            revalidate: 21600,

            notification_timeout_ms: 3000,

            date_format: DISPLAY_DATE_FORMAT.to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Apply overrides taken from the environment
    pub fn apply_env(&mut self) {
        if let Ok(database) = std::env::var(DATABASE_ENV) {
            if !database.trim().is_empty() {
                tracing::debug!("Using database from {}: {}", DATABASE_ENV, database);
                self.database = database;
            }
        }
    }

    pub fn revalidate_interval(&self) -> Duration {
        Duration::from_secs(self.revalidate.max(1))
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}
