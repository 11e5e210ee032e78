//! sanity-blog: a server-rendered blog front end for a Sanity content backend
//!
//! Posts, authors and comments live in a Sanity dataset. This crate
//! fetches them with GROQ queries, renders pages with embedded Tera
//! templates and forwards reader comments back as unapproved documents.

pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pages;
pub mod sanity;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The main blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
    /// Static assets served and copied as-is
    pub static_dir: std::path::PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    ///
    /// `_config.yml` is optional; `SANITY_*` environment variables win
    /// over whatever it says.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog instance from an already built configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        }
    }

    /// Page renderers bound to this site's content backend
    pub fn pages(&self) -> Result<pages::Pages> {
        pages::Pages::new(&self.config)
    }

    /// Pre-render every page into the public directory
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
