//! Data models: the unified paper record, search responses and route parameters.

mod enums;
mod inputs;
mod paper;

pub use enums::Source;
pub use inputs::{SearchParams, SearchQuery};
pub use paper::{NO_ABSTRACT, Paper, PaperSummary, SearchResponse, arxiv_url, pubmed_url};
