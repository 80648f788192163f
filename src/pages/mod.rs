//! Page-level data loading and rendering
//!
//! Each page has a load step returning `Result<_, CmsError>` and a render step
//! that is free of I/O. The helpers here compose both for the server and the
//! build command.

pub mod home;
pub mod post;

use anyhow::{Context, Result};

use crate::cms::CmsError;
use crate::Blog;

/// Load and render `/`
pub async fn home_page(blog: &Blog, pagination: home::Pagination) -> Result<String> {
    let initial = home::load_initial(blog)
        .await
        .context("failed to load the post list")?;
    home::render(blog, &home::PostList::new(initial), pagination)
}

/// Load and render `/post/{uid}`
pub async fn post_page(blog: &Blog, uid: &str) -> Result<String> {
    let post = post::load_post(blog, uid)
        .await
        .with_context(|| format!("failed to load post {:?}", uid))?;
    post::render(blog, Some(&post))
}

/// Whether an error chain bottoms out in a missing document
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<CmsError>())
        .any(CmsError::is_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_missing_post_error_is_detectable() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, source) = testing::blog(dir.path());

        let err = post_page(&blog, "missing").await.unwrap_err();
        assert!(is_not_found(&err));

        source.set_failing(true);
        let err = post_page(&blog, "first-post").await.unwrap_err();
        assert!(!is_not_found(&err));
    }
}
