//! arXiv Atom feed decoding and mapping to [`Paper`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::ArxivError;
use crate::models::paper::Paper;

#[derive(Debug, Default, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    published: String,
    #[serde(default)]
    updated: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
    #[serde(rename = "link", default)]
    links: Vec<Link>,
    #[serde(rename = "category", default)]
    categories: Vec<Category>,
}

#[derive(Debug, Default, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Link {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@type", default)]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Category {
    #[serde(rename = "@term", default)]
    term: String,
}

/// Decode an Atom response body into papers, preserving feed order.
pub fn parse_feed(xml: &str) -> Result<Vec<Paper>, ArxivError> {
    let feed: Feed = quick_xml::de::from_str(xml)
        .map_err(|e| ArxivError::InvalidResponse(format!("failed to parse XML: {e}")))?;
    Ok(feed.entries.into_iter().map(entry_to_paper).collect())
}

fn entry_to_paper(entry: Entry) -> Paper {
    let id = extract_id(&entry.id);

    let categories: Vec<String> = entry.categories.into_iter().map(|c| c.term).collect();
    let primary_category = categories.first().cloned().unwrap_or_default();

    let mut arxiv_url = String::new();
    let mut pdf_url = String::new();
    for link in entry.links {
        match link.kind.as_deref() {
            Some("text/html") => arxiv_url = link.href,
            Some("application/pdf") => pdf_url = link.href,
            _ => {}
        }
    }

    let image_url = if id.is_empty() {
        String::new()
    } else {
        format!("https://arxiv.org/html/{id}/x1.png")
    };

    Paper {
        title: clean_text(&entry.title),
        summary: clean_text(&entry.summary),
        authors: entry.authors.into_iter().map(|a| a.name).collect(),
        published: parse_time(&entry.published),
        updated: parse_time(&entry.updated),
        categories,
        primary_category,
        arxiv_url,
        pdf_url,
        image_url,
        id,
    }
}

/// `http://arxiv.org/abs/2301.12345v2` → `2301.12345`.
pub fn extract_id(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    match last.find('v') {
        Some(idx) if idx > 0 => last[..idx].to_string(),
        _ => last.to_string(),
    }
}

/// Collapse every whitespace run (including newlines) to one space.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
