//! HTTP server with incremental revalidation

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{CachedPage, PageCache};
use crate::cms;
use crate::config::FallbackMode;
use crate::pages;
use crate::pages::home::Pagination;
use crate::Blog;

/// Server state
pub struct AppState {
    blog: Blog,
    cache: PageCache,
    /// Routes rendered before the server started
    static_paths: HashSet<String>,
}

impl AppState {
    pub fn new(blog: Blog) -> Self {
        let cache = PageCache::new(
            blog.config.revalidate_after(),
            blog.config.cache_capacity,
        );
        Self {
            blog,
            cache,
            static_paths: HashSet::new(),
        }
    }

    /// Pre-render `/` and the static post paths. Content API failures are fatal.
    pub async fn prerender(&mut self) -> Result<()> {
        let home = pages::home_page(&self.blog, Pagination::Server).await?;
        self.cache.insert("/", CachedPage::ok(home)).await;

        for path in pages::post::static_paths(&self.blog).await? {
            let uid = path.trim_start_matches("/post/");
            let html = pages::post_page(&self.blog, uid).await?;
            self.cache.insert(&path, CachedPage::ok(html)).await;
            self.static_paths.insert(path);
        }

        tracing::info!("Pre-rendered {} pages", self.static_paths.len() + 1);
        Ok(())
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.blog.static_dir);

    Router::new()
        .route("/", get(home_handler))
        .route("/post/:uid", get(post_handler))
        .route("/posts/more", get(more_handler))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pre-render and start serving
pub async fn start(blog: Blog, ip: &str, port: u16) -> Result<()> {
    let mut state = AppState::new(blog);
    state.prerender().await?;
    let app = router(Arc::new(state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    let result = state
        .cache
        .get_or_render("/", || async {
            let html = pages::home_page(&state.blog, Pagination::Server).await?;
            Ok::<_, anyhow::Error>(CachedPage::ok(html))
        })
        .await;
    respond("/", result)
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Response {
    let key = pages::post::path_for(&uid);

    if state.blog.config.fallback == FallbackMode::Placeholder
        && !state.static_paths.contains(&key)
    {
        if let Some(claim) = state.cache.try_claim(&key) {
            let background = state.clone();
            let route = key.clone();
            tokio::spawn(async move {
                match render_post(&background.blog, &uid).await {
                    Ok(page) => claim.fill(page),
                    Err(e) => {
                        tracing::error!("Background render of {} failed: {:#}", route, e);
                        drop(claim);
                        background.cache.remove_if_empty(&route);
                    }
                }
            });

            return match pages::post::render_loading(&state.blog, Some(1)) {
                Ok(html) => Html(html).into_response(),
                Err(e) => internal_error(&key, e),
            };
        }
    }

    let result = state
        .cache
        .get_or_render(&key, || render_post(&state.blog, &uid))
        .await;
    respond(&key, result)
}

/// Render a post page; a missing document becomes a cacheable 404 page
async fn render_post(blog: &Blog, uid: &str) -> Result<CachedPage> {
    match pages::post_page(blog, uid).await {
        Ok(html) => Ok(CachedPage::ok(html)),
        Err(e) if pages::is_not_found(&e) => {
            tracing::info!("Post not found: {}", uid);
            Ok(CachedPage::new(
                StatusCode::NOT_FOUND,
                pages::post::render_not_found(blog)?,
            ))
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Deserialize)]
struct MoreParams {
    cursor: String,
}

/// Next page of post summaries as JSON, for the "load more" control
async fn more_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MoreParams>,
) -> Response {
    if let Err(e) = cms::check_cursor(&state.blog.config.cms.endpoint, &params.cursor) {
        tracing::warn!("Rejected pagination request: {}", e);
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    match pages::home::load_more(&state.blog, &params.cursor).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            tracing::warn!("Pagination fetch failed: {}", e);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}

fn respond(route: &str, result: Result<CachedPage>) -> Response {
    match result {
        Ok(page) => (page.status, Html(page.html)).into_response(),
        Err(e) => internal_error(route, e),
    }
}

fn internal_error(route: &str, e: anyhow::Error) -> Response {
    tracing::error!("Rendering {} failed: {:#}", route, e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
