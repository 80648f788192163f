//! spacetraveling: a server-rendered blog backed by a Prismic repository
//!
//! Posts are fetched from the content API, mapped to view models and rendered
//! with embedded Tera templates. Rendered pages are cached for a fixed
//! revalidation window by the HTTP server, or written to disk by `build`.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod templates;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cms::{ContentSource, PrismicClient};
use helpers::DateFormatter;
use templates::TemplateRenderer;

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets directory
    pub static_dir: PathBuf,
    /// Publication date formatter
    pub dates: DateFormatter,
    source: Arc<dyn ContentSource>,
    renderer: Arc<TemplateRenderer>,
}

impl Blog {
    /// Create a blog from a directory, talking to the configured Prismic repository
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir.as_ref());
            config::SiteConfig::default()
        };
        config.apply_env();

        let client = PrismicClient::new(&config.cms)?;
        Self::with_source(base_dir, config, Arc::new(client))
    }

    /// Create a blog over any content source
    pub fn with_source<P: AsRef<Path>>(
        base_dir: P,
        config: config::SiteConfig,
        source: Arc<dyn ContentSource>,
    ) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let dates = DateFormatter::from_config(&config)?;
        let renderer = Arc::new(TemplateRenderer::new()?);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            static_dir,
            dates,
            source,
            renderer,
        })
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Statically generate the site into the public directory
    pub async fn build(&self) -> Result<()> {
        commands::build::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
