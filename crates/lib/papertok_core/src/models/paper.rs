//! Paper domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a paper fetched from the upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// Ordered; the first entry is the primary category.
    pub categories: Vec<String>,
    pub primary_category: String,
    pub arxiv_url: String,
    pub pdf_url: String,
    pub image_url: String,
}

/// Parameters for a category feed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub category: String,
    pub limit: u32,
    pub offset: u32,
    /// `lastUpdatedDate` or `submittedDate`.
    pub sort_by: String,
}
