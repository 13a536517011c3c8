//! services/api/src/client/normalize.rs
//!
//! Maps the remote service's JSON entries and annotations onto domain types.
//! Integer flags stop here; the domain only sees booleans.

use crate::client::error::ClientError;
use reading_list_core::domain::{Annotation, AnnotationRange, Article};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

pub const PREVIEW_CHARS: usize = 150;
pub const NO_PREVIEW: &str = "No preview available";
pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_DOMAIN: &str = "unknown";

fn tag_pattern() -> &'static Regex {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Numeric ids become strings; string ids pass through.
fn id_of(item: &Value) -> Result<String, ClientError> {
    match item.get("id") {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ClientError::Shape("Item is missing an id".to_string())),
    }
}

/// A non-empty string field, if present.
fn text_of<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Upstream flags are integers; only `1` means set.
fn flag_of(item: &Value, field: &str) -> bool {
    item.get(field).and_then(Value::as_i64) == Some(1)
}

/// Strips tags from the first 150 characters of `content`.
pub fn preview_from_content(content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    tag_pattern().replace_all(&head, "").into_owned()
}

/// Hostname of `url` without a leading `www.`.
pub fn domain_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => UNKNOWN_DOMAIN.to_string(),
        },
        Err(e) => {
            warn!(url, "Could not parse article url: {}", e);
            UNKNOWN_DOMAIN.to_string()
        }
    }
}

pub fn article_from_entry(item: &Value) -> Result<Article, ClientError> {
    if !item.is_object() {
        return Err(ClientError::invalid_format());
    }
    let id = id_of(item)?;
    let url = text_of(item, "url").unwrap_or_default().to_string();
    let content = text_of(item, "content").unwrap_or_default().to_string();

    let preview = match text_of(item, "preview") {
        Some(preview) => preview.to_string(),
        None if !content.is_empty() => preview_from_content(&content),
        None => NO_PREVIEW.to_string(),
    };
    let domain = if url.is_empty() {
        UNKNOWN_DOMAIN.to_string()
    } else {
        domain_of(&url)
    };
    let created_at = text_of(item, "created_at")
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());
    let annotations = match item.get("annotations") {
        Some(Value::Array(rows)) => embedded_annotations(&id, rows),
        _ => Vec::new(),
    };

    Ok(Article {
        id,
        title: text_of(item, "title").unwrap_or(UNTITLED).to_string(),
        url,
        content,
        preview,
        domain,
        created_at,
        is_archived: flag_of(item, "is_archived"),
        is_starred: flag_of(item, "is_starred"),
        annotations,
    })
}

pub fn annotation_from_row(row: &Value) -> Result<Annotation, ClientError> {
    let ranges = match row.get("ranges") {
        Some(ranges @ Value::Array(_)) => Some(
            serde_json::from_value::<Vec<AnnotationRange>>(ranges.clone())
                .map_err(|e| ClientError::Shape(format!("Invalid annotation ranges: {}", e)))?,
        ),
        _ => None,
    };

    Ok(Annotation {
        id: id_of(row)?,
        text: text_of(row, "text").unwrap_or_default().to_string(),
        quote: text_of(row, "quote").unwrap_or_default().to_string(),
        created_at: text_of(row, "created_at").unwrap_or_default().to_string(),
        ranges,
    })
}

pub fn annotations_from_rows(rows: &[Value]) -> Result<Vec<Annotation>, ClientError> {
    rows.iter().map(annotation_from_row).collect()
}

/// Annotations carried inside an entry. Rows that do not normalize are
/// dropped so one bad annotation cannot hide the article.
fn embedded_annotations(article_id: &str, rows: &[Value]) -> Vec<Annotation> {
    rows.iter()
        .filter_map(|row| match annotation_from_row(row) {
            Ok(annotation) => Some(annotation),
            Err(e) => {
                warn!(article_id, "Skipping embedded annotation: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_is_normalized() {
        let article = article_from_entry(&json!({
            "id": 1,
            "title": "T",
            "url": "http://www.example.com/a",
            "is_archived": 1,
            "is_starred": 0,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(article.id, "1");
        assert_eq!(article.title, "T");
        assert_eq!(article.domain, "example.com");
        assert!(article.is_archived);
        assert!(!article.is_starred);
        assert_eq!(article.preview, NO_PREVIEW);
        assert_eq!(article.created_at, "2024-01-01T00:00:00Z");
        assert!(article.annotations.is_empty());
    }

    #[test]
    fn missing_fields_get_fallbacks() {
        let article = article_from_entry(&json!({"id": "abc"})).unwrap();
        assert_eq!(article.id, "abc");
        assert_eq!(article.title, UNTITLED);
        assert_eq!(article.domain, UNKNOWN_DOMAIN);
        assert!(!article.created_at.is_empty());
    }

    #[test]
    fn boolean_flags_are_not_integers() {
        let article = article_from_entry(&json!({"id": 2, "is_archived": true, "is_starred": "1"})).unwrap();
        assert!(!article.is_archived);
        assert!(!article.is_starred);
    }

    #[test]
    fn preview_is_stripped_from_content_head() {
        let content = format!("<p>Hello <b>world</b></p>{}", "x".repeat(300));
        let article = article_from_entry(&json!({"id": 3, "content": content})).unwrap();
        assert!(article.preview.starts_with("Hello world"));
        assert!(!article.preview.contains('<'));
        assert!(article.preview.chars().count() <= PREVIEW_CHARS);

        let article = article_from_entry(&json!({"id": 3, "content": "<p>x</p>", "preview": "given"})).unwrap();
        assert_eq!(article.preview, "given");
    }

    #[test]
    fn only_leading_www_is_stripped() {
        assert_eq!(domain_of("https://www.example.com/x"), "example.com");
        assert_eq!(domain_of("https://blog.www.example.com/x"), "blog.www.example.com");
        assert_eq!(domain_of("not a url"), UNKNOWN_DOMAIN);
    }

    #[test]
    fn entry_without_id_is_a_shape_error() {
        let err = article_from_entry(&json!({"title": "no id"})).unwrap_err();
        assert!(matches!(err, ClientError::Shape(_)));
    }

    #[test]
    fn embedded_annotations_are_normalized() {
        let article = article_from_entry(&json!({
            "id": 4,
            "annotations": [{
                "id": 9,
                "text": "note",
                "quote": "passage",
                "created_at": "2024-02-02T00:00:00+0000",
                "ranges": [{"start": "/div[1]/p[1]", "startOffset": 0, "end": "/div[1]/p[1]", "endOffset": 7}]
            }]
        }))
        .unwrap();

        let annotation = &article.annotations[0];
        assert_eq!(annotation.id, "9");
        assert_eq!(annotation.quote, "passage");
        assert_eq!(annotation.ranges.as_ref().unwrap()[0].end_offset, 7);
    }

    #[test]
    fn malformed_embedded_annotations_are_skipped() {
        let article = article_from_entry(&json!({
            "id": 2,
            "annotations": [
                {"id": 3, "ranges": [{"start": "/p", "startOffset": "0", "end": "/p", "endOffset": "5"}]},
                {"text": "no id"},
                {"id": 4, "quote": "kept"}
            ]
        }))
        .unwrap();

        assert_eq!(article.id, "2");
        assert_eq!(article.annotations.len(), 1);
        assert_eq!(article.annotations[0].id, "4");
    }

    #[test]
    fn annotation_rows_stay_strict() {
        let rows = [json!({"id": 1}), json!({"text": "no id"})];
        assert!(matches!(annotations_from_rows(&rows), Err(ClientError::Shape(_))));
    }
}
