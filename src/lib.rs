//! inkwell: a small markdown blog
//!
//! Posts are markdown files with YAML front-matter, rendered into static
//! pages with embedded Tera templates. A contact form posts to a small API
//! route that stores messages in a SQLite-backed document store.

pub mod commands;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod notification;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use contact::{SqliteBackend, SubmissionStore};
use content::{FsPostStore, PostQuery};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// The blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Markdown posts directory
    pub posts_dir: PathBuf,
    /// Post images directory
    pub images_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// SQLite file holding contact messages
    pub database_path: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog instance from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let posts_dir = base_dir.join(&config.posts_dir);
        let images_dir = base_dir.join(&config.images_dir);
        let public_dir = base_dir.join(&config.public_dir);
        let database_path = base_dir.join(&config.database);

        Self {
            config,
            base_dir,
            posts_dir,
            images_dir,
            public_dir,
            database_path,
        }
    }

    /// Queries over the posts directory
    pub fn posts(&self) -> PostQuery<FsPostStore> {
        PostQuery::new(FsPostStore::new(&self.posts_dir))
    }

    /// The contact message store, creating the database directory if needed
    pub fn submissions(&self) -> Result<SubmissionStore<SqliteBackend>> {
        if let Some(parent) = self.database_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(SubmissionStore::new(SqliteBackend::new(&self.database_path)))
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, options: &commands::new::PostOptions) -> Result<PathBuf> {
        commands::new::create_post(self, title, options)
    }
}
