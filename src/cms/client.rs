//! Prismic REST API v2 client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use url::Url;

use super::document::{ApiInfo, Document, QueryResponse};
use super::{CmsError, ContentSource};
use crate::config::CmsConfig;

/// A query predicate in Prismic's query syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[at(path, "value")]`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::At {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Match documents of the given custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Match a document by its uid field
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let value = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({}, \"{}\")]", path, value)
            }
        }
    }
}

/// Handle to a Prismic repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for the configured repository endpoint
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        let endpoint = Url::parse(config.endpoint.trim_end_matches('/'))?;
        if endpoint.cannot_be_a_base() {
            return Err(CmsError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Run a document search against the master ref
    pub async fn query(
        &self,
        predicates: &[Predicate],
        page_size: usize,
    ) -> Result<QueryResponse, CmsError> {
        let reference = self.master_ref().await?;
        let url = self.search_url(&reference, predicates, page_size);
        tracing::debug!("Querying content API: {}", url);
        self.get_json(url).await
    }

    async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }

        let info: ApiInfo = self.get_json(url).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(CmsError::NoMasterRef)
    }

    fn search_url(&self, reference: &str, predicates: &[Predicate], page_size: usize) -> Url {
        let q = format!(
            "[{}]",
            predicates
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("")
        );

        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["documents", "search"]);
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", reference);
            pairs.append_pair("q", &q);
            pairs.append_pair("pageSize", &page_size.to_string());
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query_by_type(
        &self,
        doc_type: &str,
        page_size: usize,
    ) -> Result<QueryResponse, CmsError> {
        self.query(&[Predicate::document_type(doc_type)], page_size)
            .await
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Document, CmsError> {
        let response = self.query(&[Predicate::uid(doc_type, uid)], 1).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, cursor: &str) -> Result<QueryResponse, CmsError> {
        let url = Url::parse(cursor)?;
        tracing::debug!("Fetching next page: {}", url);
        self.get_json(url).await
    }
}

/// Check that a pagination cursor points at the same origin as the endpoint
pub fn check_cursor(endpoint: &str, cursor: &str) -> Result<Url, CmsError> {
    let endpoint = Url::parse(endpoint)?;
    let cursor_url =
        Url::parse(cursor).map_err(|_| CmsError::InvalidCursor(cursor.to_string()))?;

    if cursor_url.origin() == endpoint.origin() {
        Ok(cursor_url)
    } else {
        Err(CmsError::InvalidCursor(cursor.to_string()))
    }
}
