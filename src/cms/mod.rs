//! Content API access
//!
//! Pages talk to the CMS through [`ContentSource`] so the server, the build
//! command and the tests can share one data-loading path.

mod client;
mod document;
mod error;

use async_trait::async_trait;

pub use client::{check_cursor, Predicate, PrismicClient};
pub use document::{
    ApiInfo, ContentGroup, Document, DocumentData, Embed, ImageField, QueryResponse, Ref,
    RichTextBlock, Span,
};
pub use error::CmsError;

/// A paged store of CMS documents
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents of a custom type, in the API's default order
    async fn query_by_type(&self, doc_type: &str, page_size: usize)
        -> Result<QueryResponse, CmsError>;

    /// A single document by uid; absent documents are [`CmsError::NotFound`]
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError>;

    /// Follow an opaque `next_page` cursor
    async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError>;
}
