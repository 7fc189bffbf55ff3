//! Paper feed and lookup services.
//!
//! Both services sit between the HTTP layer and a
//! [`PaperSource`](crate::arxiv::PaperSource), reading through a shared
//! [`PaperCache`].

mod cache;
mod feed;
mod search;

use thiserror::Error;

use crate::arxiv::ArxivError;

pub use cache::{PaperCache, PaperEntry, category_key, paper_key};
pub use feed::PaperFeedService;
pub use search::PaperSearchService;

/// Paper service errors.
#[derive(Debug, Clone, Error)]
pub enum PaperError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Upstream(#[from] ArxivError),
}

/// Result type for paper operations.
pub type Result<T> = std::result::Result<T, PaperError>;
