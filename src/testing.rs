//! In-memory content source for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cms::{CmsError, ContentGroup, ContentSource, Document, DocumentData, ImageField};
use crate::cms::{QueryResponse, RichTextBlock};
use crate::config::SiteConfig;
use crate::Blog;

/// Cursor of the second page served by [`MockSource::sample`]
pub const SECOND_PAGE: &str =
    "https://spacetraveling.cdn.prismic.io/api/v2/documents/search?page=2&pageSize=2";

/// A content source backed by maps, counting every fetch
#[derive(Default)]
pub struct MockSource {
    first_page: Mutex<QueryResponse>,
    pages: Mutex<HashMap<String, QueryResponse>>,
    documents: Mutex<HashMap<String, Document>>,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl MockSource {
    /// Three posts split over two pages of two
    pub fn sample() -> Self {
        let source = Self::default();
        let posts = [
            post("first-post", "First post"),
            post("second-post", "Second post"),
            post("third-post", "Third post"),
        ];

        *source.first_page.lock().unwrap() = QueryResponse {
            page: 1,
            next_page: Some(SECOND_PAGE.to_string()),
            results: posts[..2].to_vec(),
            ..Default::default()
        };
        source.pages.lock().unwrap().insert(
            SECOND_PAGE.to_string(),
            QueryResponse {
                page: 2,
                next_page: None,
                results: posts[2..].to_vec(),
                ..Default::default()
            },
        );
        for doc in posts {
            source.insert(doc);
        }
        source
    }

    pub fn insert(&self, doc: Document) {
        let uid = doc.uid.clone().unwrap_or_default();
        self.documents.lock().unwrap().insert(uid, doc);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn begin_fetch(&self) -> Result<(), CmsError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(CmsError::Status {
                status: 503,
                url: "mock://content".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn query_by_type(
        &self,
        _doc_type: &str,
        page_size: usize,
    ) -> Result<QueryResponse, CmsError> {
        self.begin_fetch()?;
        let mut page = self.first_page.lock().unwrap().clone();
        page.results.truncate(page_size);
        Ok(page)
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError> {
        self.begin_fetch()?;
        self.documents
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError> {
        self.begin_fetch()?;
        self.pages
            .lock()
            .unwrap()
            .get(cursor)
            .cloned()
            .ok_or(CmsError::Status {
                status: 404,
                url: cursor.to_string(),
            })
    }
}

/// A post published on 2021-03-15 with two sections
pub fn post(uid: &str, title: &str) -> Document {
    Document {
        id: format!("id-{}", uid),
        uid: Some(uid.to_string()),
        doc_type: "post".to_string(),
        first_publication_date: Some("2021-03-15T10:00:00+0000".to_string()),
        last_publication_date: None,
        data: DocumentData {
            title: Some(title.to_string()),
            subtitle: Some(format!("Subtitle of {}", title)),
            author: Some("Joseph Oliveira".to_string()),
            banner: Some(ImageField {
                url: Some("https://images.prismic.io/banner.png".to_string()),
                alt: None,
            }),
            content: vec![section("Introduction", "Lorem ipsum"), section("Conclusion", "Dolor")],
        },
    }
}

fn section(heading: &str, text: &str) -> ContentGroup {
    ContentGroup {
        heading: Some(heading.to_string()),
        body: vec![RichTextBlock {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            ..Default::default()
        }],
    }
}

/// A blog over the sample source with default configuration
pub fn blog(base_dir: &Path) -> (Blog, Arc<MockSource>) {
    blog_with_config(base_dir, SiteConfig::default())
}

pub fn blog_with_config(base_dir: &Path, config: SiteConfig) -> (Blog, Arc<MockSource>) {
    let source = Arc::new(MockSource::sample());
    let blog = Blog::with_source(base_dir, config, source.clone()).unwrap();
    (blog, source)
}
