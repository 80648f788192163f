//! Static generation of the pre-rendered routes

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use walkdir::WalkDir;

use crate::pages;
use crate::pages::home::Pagination;
use crate::Blog;

/// Render `/` and every static post path into the public directory.
///
/// Any content API failure aborts the build.
pub async fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();
    fs::create_dir_all(&blog.public_dir)?;

    copy_static_assets(&blog.static_dir, &blog.public_dir)?;

    // No server behind static output; the browser follows the cursor itself
    let home = pages::home_page(blog, Pagination::Direct).await?;
    write_route(&blog.public_dir, "/", &home)?;

    let paths = pages::post::static_paths(blog)
        .await
        .context("failed to enumerate post paths")?;

    for path in &paths {
        let uid = path.trim_start_matches("/post/");
        let html = pages::post_page(blog, uid).await?;
        write_route(&blog.public_dir, path, &html)?;
        tracing::debug!("Generated: {}", path);
    }

    tracing::info!(
        "Generated {} pages in {:.2}s",
        paths.len() + 1,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Write a route as `<route>/index.html`
fn write_route(public_dir: &Path, route: &str, html: &str) -> Result<()> {
    let dir = public_dir.join(route.trim_start_matches('/'));
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("index.html"), html)?;
    Ok(())
}

/// Copy static assets into the public directory
fn copy_static_assets(static_dir: &Path, public_dir: &Path) -> Result<()> {
    if !static_dir.exists() {
        tracing::debug!("No static directory at {:?}", static_dir);
        return Ok(());
    }

    for entry in WalkDir::new(static_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
    {
        let relative = entry.path().strip_prefix(static_dir)?;
        let dest = public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest)?;
    }

    Ok(())
}
