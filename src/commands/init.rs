//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
language: pt-BR
timezone: America/Sao_Paulo
date_format: dd MMM yyyy
logo: /images/Logo.svg

# Directory
public_dir: public
static_dir: static

# Rendering
## Seconds before a page is regenerated on the next request
revalidate: 600
## Most pages kept in memory by `serve`
cache_capacity: 1000
## blocking | placeholder
fallback: blocking
reading_time: 4 min
load_more_label: Carregar mais posts
loading_label: Carregando...

# Content API
## PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN override these
cms:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  document_type: post
  page_size: 2
"#;

const LOGO: &str = include_str!("../../static/images/Logo.svg");
const STYLESHEET: &str = include_str!("../../static/css/style.css");

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir.join("static/images"))?;
    fs::create_dir_all(target_dir.join("static/css"))?;

    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join("static/images/Logo.svg"), LOGO)?;
    fs::write(target_dir.join("static/css/style.css"), STYLESHEET)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackMode, SiteConfig};

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.revalidate, 600);
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.fallback, FallbackMode::Blocking);
        assert_eq!(config.cms.page_size, 2);
        assert!(dir.path().join("static/images/Logo.svg").exists());
        assert!(dir.path().join("static/css/style.css").exists());
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
