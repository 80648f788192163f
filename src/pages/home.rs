//! Home page: the post list and its "load more" pagination

use anyhow::Result;
use tera::Context;

use crate::cms::CmsError;
use crate::content::{PostPagination, PostSummary};
use crate::Blog;

/// Fetch the first page of posts
pub async fn load_initial(blog: &Blog) -> Result<PostPagination, CmsError> {
    let cms = &blog.config.cms;
    let response = blog
        .source()
        .query_by_type(&cms.document_type, cms.page_size)
        .await?;
    tracing::debug!(
        "Loaded {} posts, more: {}",
        response.results.len(),
        response.next_page.is_some()
    );
    Ok(PostPagination::from_response(&response, &blog.dates))
}

/// Fetch the page behind a `next_page` cursor
pub async fn load_more(blog: &Blog, cursor: &str) -> Result<PostPagination, CmsError> {
    let response = blog.source().fetch_page(cursor).await?;
    Ok(PostPagination::from_response(&response, &blog.dates))
}

/// Posts fetched so far for one view, plus the cursor to the rest
#[derive(Debug, Clone, Default)]
pub struct PostList {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
}

impl PostList {
    pub fn new(initial: PostPagination) -> Self {
        Self {
            posts: initial.results,
            next_page: initial.next_page,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether the "load more" control is shown
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Append a page in order and take over its cursor; returns how many posts were added
    pub fn extend(&mut self, page: PostPagination) -> usize {
        let added = page.results.len();
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        added
    }

    /// Follow the cursor once. Without a cursor nothing is fetched.
    pub async fn load_more(&mut self, blog: &Blog) -> Result<usize, CmsError> {
        let Some(cursor) = self.next_page.clone() else {
            return Ok(0);
        };
        let page = load_more(blog, &cursor).await?;
        Ok(self.extend(page))
    }
}

/// Where the "load more" control fetches the next page from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// `/posts/more` on the serving process
    Server,
    /// The cursor URL itself, straight from the browser. Used for static output,
    /// where dates of appended posts are formatted client side.
    Direct,
}

/// Render the list
pub fn render(blog: &Blog, list: &PostList, pagination: Pagination) -> Result<String> {
    let renderer = blog.renderer();
    let mut context: Context = renderer.site_context(&blog.config);
    context.insert("posts", list.posts());
    context.insert("next_page", &list.next_page());
    context.insert("direct_pagination", &(pagination == Pagination::Direct));
    if pagination == Pagination::Direct {
        // Inlined in a <script>; keep "</" from closing it
        let dates = serde_json::to_string(&blog.dates.client_format())?.replace("</", "<\\/");
        context.insert("date_format", &dates);
    }
    renderer.render("index.html", &context)
}
