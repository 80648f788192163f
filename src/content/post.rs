//! Post view models

use serde::{Deserialize, Serialize};

use super::richtext;
use crate::cms::{Document, QueryResponse};
use crate::helpers::DateFormatter;

/// A post as listed on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: Option<String>,
    /// Formatted publication date
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    pub fn from_document(doc: &Document, dates: &DateFormatter) -> Self {
        Self {
            uid: doc.uid.clone(),
            first_publication_date: format_date(doc, dates),
            title: doc.data.title.clone().unwrap_or_default(),
            subtitle: doc.data.subtitle.clone().unwrap_or_default(),
            author: doc.data.author.clone().unwrap_or_default(),
        }
    }
}

/// One page of post summaries plus the cursor to the next one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostPagination {
    pub fn from_response(response: &QueryResponse, dates: &DateFormatter) -> Self {
        Self {
            next_page: response.next_page.clone(),
            results: response
                .results
                .iter()
                .map(|doc| PostSummary::from_document(doc, dates))
                .collect(),
        }
    }
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: Option<String>,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub banner_url: Option<String>,
    pub author: String,
    pub content: Vec<Section>,
}

/// A heading and its body, already rendered to HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub body_html: String,
}

impl PostDetail {
    pub fn from_document(doc: &Document, dates: &DateFormatter) -> Self {
        Self {
            uid: doc.uid.clone(),
            first_publication_date: format_date(doc, dates),
            title: doc.data.title.clone().unwrap_or_default(),
            banner_url: doc.data.banner.as_ref().and_then(|b| b.url.clone()),
            author: doc.data.author.clone().unwrap_or_default(),
            content: doc
                .data
                .content
                .iter()
                .map(|group| Section {
                    heading: group.heading.clone().unwrap_or_default(),
                    body_html: richtext::as_html(&group.body),
                })
                .collect(),
        }
    }
}

fn format_date(doc: &Document, dates: &DateFormatter) -> Option<String> {
    doc.first_publication_date
        .as_deref()
        .and_then(|raw| dates.format_timestamp(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        serde_json::from_str(
            r#"{
                "id": "YFd3",
                "uid": "como-utilizar-hooks",
                "type": "post",
                "first_publication_date": "2021-03-15T10:00:00Z",
                "data": {
                    "title": "Como utilizar Hooks",
                    "subtitle": "Pensando em sincronização",
                    "author": "Joseph Oliveira",
                    "banner": {"url": "https://images.prismic.io/banner.png"},
                    "content": [
                        {"heading": "Proin et varius", "body": [{"type": "paragraph", "text": "Lorem", "spans": []}]},
                        {"heading": "Cras laoreet", "body": [{"type": "paragraph", "text": "Ipsum", "spans": []}]}
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_summary_mapping() {
        let summary = PostSummary::from_document(&document(), &DateFormatter::default());
        assert_eq!(summary.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(summary.first_publication_date.as_deref(), Some("15 Mar 2021"));
        assert_eq!(summary.title, "Como utilizar Hooks");
        assert_eq!(summary.subtitle, "Pensando em sincronização");
        assert_eq!(summary.author, "Joseph Oliveira");
    }

    #[test]
    fn test_null_date_stays_empty() {
        let mut doc = document();
        doc.first_publication_date = None;
        let summary = PostSummary::from_document(&doc, &DateFormatter::default());
        assert_eq!(summary.first_publication_date, None);
    }

    #[test]
    fn test_detail_mapping() {
        let detail = PostDetail::from_document(&document(), &DateFormatter::default());
        assert_eq!(
            detail.banner_url.as_deref(),
            Some("https://images.prismic.io/banner.png")
        );
        assert_eq!(detail.content.len(), 2);
        assert_eq!(detail.content[0].heading, "Proin et varius");
        assert_eq!(detail.content[0].body_html, "<p>Lorem</p>");
        assert_eq!(detail.content[1].heading, "Cras laoreet");
    }

    #[test]
    fn test_pagination_keeps_cursor_and_order() {
        let mut second = document();
        second.uid = Some("second".to_string());
        let response = QueryResponse {
            next_page: Some("https://repo.cdn.prismic.io/api/v2/documents/search?page=2".into()),
            results: vec![document(), second],
            ..Default::default()
        };

        let page = PostPagination::from_response(&response, &DateFormatter::default());
        assert_eq!(page.next_page, response.next_page);
        let uids: Vec<_> = page.results.iter().map(|p| p.uid.as_deref()).collect();
        assert_eq!(uids, vec![Some("como-utilizar-hooks"), Some("second")]);
    }
}
