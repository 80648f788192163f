//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary; there is no theme directory to load.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Autoescaping stays on for every template: titles and authors come
        // from the CMS. Rich text bodies opt out with `| safe`.
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Base context shared by every page
    pub fn site_context(&self, config: &SiteConfig) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from(config));
        context
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub logo: String,
    pub reading_time: String,
    pub load_more_label: String,
    pub loading_label: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            logo: config.logo.clone(),
            reading_time: config.reading_time.clone(),
            load_more_label: config.load_more_label.clone(),
            loading_label: config.loading_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_links_home_around_logo() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let html = renderer
            .render("not_found.html", &renderer.site_context(&config))
            .unwrap();
        assert!(html.contains(r#"<a href="/"><img src="#));
        assert!(html.contains(r#"alt="logo""#));
    }

    #[test]
    fn test_values_are_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig {
            title: "<b>blog</b>".to_string(),
            ..SiteConfig::default()
        };
        let html = renderer
            .render("not_found.html", &renderer.site_context(&config))
            .unwrap();
        assert!(html.contains("&lt;b&gt;blog&lt;&#x2F;b&gt;"));
        assert!(!html.contains("<b>blog</b>"));
    }
}
