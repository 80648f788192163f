//! Post detail page

use anyhow::Result;

use crate::cms::CmsError;
use crate::content::PostDetail;
use crate::Blog;

/// Routes pre-rendered at build time: one per post on the first page
pub async fn static_paths(blog: &Blog) -> Result<Vec<String>, CmsError> {
    let cms = &blog.config.cms;
    let response = blog
        .source()
        .query_by_type(&cms.document_type, cms.page_size)
        .await?;

    Ok(response
        .results
        .iter()
        .filter_map(|doc| doc.uid.as_deref())
        .map(path_for)
        .collect())
}

/// Route of a post
pub fn path_for(uid: &str) -> String {
    format!("/post/{}", uid)
}

/// Fetch one post by uid
pub async fn load_post(blog: &Blog, uid: &str) -> Result<PostDetail, CmsError> {
    let doc = blog
        .source()
        .get_by_uid(&blog.config.cms.document_type, uid)
        .await?;
    Ok(PostDetail::from_document(&doc, &blog.dates))
}

/// Render a post, or the loading placeholder while it is not available yet
pub fn render(blog: &Blog, post: Option<&PostDetail>) -> Result<String> {
    let Some(post) = post else {
        return render_loading(blog, None);
    };

    let renderer = blog.renderer();
    let mut context = renderer.site_context(&blog.config);
    context.insert("post", post);
    renderer.render("post.html", &context)
}

/// Loading placeholder, optionally refreshing itself after `refresh` seconds
pub fn render_loading(blog: &Blog, refresh: Option<u32>) -> Result<String> {
    let renderer = blog.renderer();
    let mut context = renderer.site_context(&blog.config);
    context.insert("refresh", &refresh);
    renderer.render("loading.html", &context)
}

pub fn render_not_found(blog: &Blog) -> Result<String> {
    let renderer = blog.renderer();
    renderer.render("not_found.html", &renderer.site_context(&blog.config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn test_static_paths() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, _source) = testing::blog(dir.path());

        let paths = static_paths(&blog).await.unwrap();
        assert_eq!(paths, vec!["/post/first-post", "/post/second-post"]);
    }

    #[tokio::test]
    async fn test_render_sections_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, _source) = testing::blog(dir.path());

        let post = load_post(&blog, "first-post").await.unwrap();
        let html = render(&blog, Some(&post)).unwrap();

        assert_eq!(html.matches("<h3").count(), 2);
        let intro = html.find("Introduction").unwrap();
        let conclusion = html.find("Conclusion").unwrap();
        assert!(intro < conclusion);

        assert!(html.contains("<p>Lorem ipsum</p>"));
        assert!(html.contains("15 Mar 2021"));
        assert!(html.contains("Joseph Oliveira"));
        assert!(html.contains("4 min"));
        assert!(html.contains(r#"class="banner""#));
    }

    #[tokio::test]
    async fn test_unknown_uid_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, _source) = testing::blog(dir.path());

        let err = load_post(&blog, "missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_loading_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let (blog, _source) = testing::blog(dir.path());

        let html = render(&blog, None).unwrap();
        assert!(html.contains("Carregando..."));
        assert!(!html.contains("http-equiv"));

        let html = render_loading(&blog, Some(1)).unwrap();
        assert!(html.contains(r#"<meta http-equiv="refresh" content="1" />"#));
    }
}
