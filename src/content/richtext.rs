//! Structured text to HTML
//!
//! Block and span markup follows what `prismic-dom` emits. Text content is
//! escaped; embed HTML is passed through untouched.

use crate::cms::{RichTextBlock, Span};
use crate::helpers::{html_escape, image_tag, text_to_html};

/// Render a sequence of structured text blocks as HTML
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        // Consecutive list items share one list element
        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_block(block: &RichTextBlock) -> String {
    let kind = block.kind.as_str();

    if let Some(level) = heading_level(kind) {
        return format!(
            "<h{level}>{}</h{level}>",
            render_spans(&block.text, &block.spans)
        );
    }

    match kind {
        "paragraph" => format!("<p>{}</p>", render_spans(&block.text, &block.spans)),
        "preformatted" => format!("<pre>{}</pre>", render_spans(&block.text, &block.spans)),
        "list-item" | "o-list-item" => {
            format!("<li>{}</li>", render_spans(&block.text, &block.spans))
        }
        "image" => match &block.url {
            Some(url) => format!(
                r#"<p class="block-img">{}</p>"#,
                image_tag(url, block.alt.as_deref())
            ),
            None => String::new(),
        },
        "embed" => match &block.oembed {
            Some(embed) => format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                html_escape(embed.embed_url.as_deref().unwrap_or_default()),
                html_escape(embed.kind.as_deref().unwrap_or_default()),
                html_escape(embed.provider_name.as_deref().unwrap_or_default()),
                embed.html.as_deref().unwrap_or_default()
            ),
            None => String::new(),
        },
        other => {
            tracing::debug!("Skipping unsupported rich text block: {}", other);
            String::new()
        }
    }
}

fn heading_level(kind: &str) -> Option<u8> {
    kind.strip_prefix("heading")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))
}

/// Apply inline spans to a block's text.
///
/// Span offsets count UTF-16 code units. Overlapping spans are closed and
/// reopened so the output stays well nested.
fn render_spans(text: &str, spans: &[Span]) -> String {
    if spans.is_empty() {
        return text_to_html(text);
    }

    let mut spans: Vec<&Span> = spans.iter().filter(|s| s.start < s.end).collect();
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len() * 2);
    let mut segment = String::new();
    let mut stack: Vec<&Span> = Vec::new();
    let mut next = 0;
    let mut pos = 0;
    let mut chars = text.chars();

    loop {
        if stack.iter().any(|s| s.end <= pos) {
            flush(&mut out, &mut segment);
            let mut reopen = Vec::new();
            while let Some(top) = stack.pop() {
                out.push_str(span_tags(top).1);
                if top.end > pos {
                    reopen.push(top);
                }
                if !stack.iter().any(|s| s.end <= pos) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&span_tags(span).0);
                stack.push(span);
            }
        }

        while next < spans.len() && spans[next].start <= pos {
            flush(&mut out, &mut segment);
            out.push_str(&span_tags(spans[next]).0);
            stack.push(spans[next]);
            next += 1;
        }

        match chars.next() {
            Some(c) => {
                segment.push(c);
                pos += c.len_utf16();
            }
            None => break,
        }
    }

    flush(&mut out, &mut segment);
    while let Some(span) = stack.pop() {
        out.push_str(span_tags(span).1);
    }

    out
}

fn flush(out: &mut String, segment: &mut String) {
    if !segment.is_empty() {
        out.push_str(&text_to_html(segment));
        segment.clear();
    }
}

/// Opening and closing markup for a span
fn span_tags(span: &Span) -> (String, &'static str) {
    let data = |key: &str| {
        span.data
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(|v| v.as_str())
    };

    match span.kind.as_str() {
        "strong" => ("<strong>".to_string(), "</strong>"),
        "em" => ("<em>".to_string(), "</em>"),
        "hyperlink" => match data("url") {
            Some(url) => {
                let target = data("target")
                    .map(|t| format!(r#" target="{}" rel="noopener""#, html_escape(t)))
                    .unwrap_or_default();
                (format!(r#"<a href="{}"{}>"#, html_escape(url), target), "</a>")
            }
            None => (String::new(), ""),
        },
        "label" => (
            format!(
                r#"<span class="{}">"#,
                html_escape(data("label").unwrap_or_default())
            ),
            "</span>",
        ),
        _ => (String::new(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::Embed;
    use serde_json::json;

    fn block(kind: &str, text: &str) -> RichTextBlock {
        RichTextBlock {
            kind: kind.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    fn span(kind: &str, start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_paragraph_is_escaped() {
        let html = as_html(&[block("paragraph", "a < b\nc")]);
        assert_eq!(html, "<p>a &lt; b<br />c</p>");
    }

    #[test]
    fn test_headings() {
        let html = as_html(&[block("heading2", "Title"), block("heading7", "nope")]);
        assert_eq!(html, "<h2>Title</h2>");
    }

    #[test]
    fn test_list_grouping() {
        let html = as_html(&[
            block("list-item", "one"),
            block("list-item", "two"),
            block("o-list-item", "first"),
            block("paragraph", "after"),
        ]);
        assert_eq!(
            html,
            "<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol><p>after</p>"
        );
    }

    #[test]
    fn test_strong_and_link_spans() {
        let mut b = block("paragraph", "Hello bold link");
        b.spans = vec![
            span("strong", 6, 10),
            Span {
                data: Some(json!({"url": "https://example.com", "target": "_blank"})),
                ..span("hyperlink", 11, 15)
            },
        ];
        assert_eq!(
            as_html(&[b]),
            r#"<p>Hello <strong>bold</strong> <a href="https://example.com" target="_blank" rel="noopener">link</a></p>"#
        );
    }

    #[test]
    fn test_overlapping_spans_stay_nested() {
        let mut b = block("paragraph", "abcdefghij");
        b.spans = vec![span("em", 3, 8), span("strong", 0, 5)];
        assert_eq!(
            as_html(&[b]),
            "<p><strong>abc<em>de</em></strong><em>fgh</em>ij</p>"
        );
    }

    #[test]
    fn test_span_offsets_are_utf16() {
        let mut b = block("paragraph", "😀 bold");
        b.spans = vec![span("strong", 3, 7)];
        assert_eq!(as_html(&[b]), "<p>😀 <strong>bold</strong></p>");
    }

    #[test]
    fn test_image_and_embed() {
        let mut image = block("image", "");
        image.url = Some("https://images.prismic.io/a.png".to_string());
        image.alt = Some("a".to_string());

        let mut embed = block("embed", "");
        embed.oembed = Some(Embed {
            kind: Some("video".to_string()),
            embed_url: Some("https://youtu.be/x".to_string()),
            provider_name: Some("YouTube".to_string()),
            html: Some("<iframe></iframe>".to_string()),
        });

        let html = as_html(&[image, embed]);
        assert!(html.starts_with(
            r#"<p class="block-img"><img src="https://images.prismic.io/a.png" alt="a" /></p>"#
        ));
        assert!(html.ends_with(r#"data-oembed-provider="YouTube"><iframe></iframe></div>"#));
    }
}
