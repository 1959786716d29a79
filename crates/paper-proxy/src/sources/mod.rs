//! Upstream source adapters.
//!
//! Each adapter:
//! 1. Issues its upstream calls through the shared [`UpstreamClient`]
//! 2. Extracts fields from the raw payload by declarative element/tag tables
//! 3. Normalizes every field into a [`Paper`] or [`PaperSummary`]
//!
//! Secondary fetches (PMC body, arXiv PDF) never fail a request; see [`degrade`].

mod arxiv;
mod medline;
mod pdf;
mod pubmed;

pub use arxiv::{ATOM_ENTRY, ArxivAdapter, AtomEntrySchema, clean_pdf_text, parse_feed};
pub use medline::{MEDLINE_TAGS, MedlineField, parse_medline};
pub use pubmed::{
    ArticleFields, ArticleSchema, PUBMED_ARTICLE, PubmedAdapter, extract_article,
    extract_body_paragraphs,
};

use crate::client::UpstreamClient;
use crate::config::Config;
use crate::error::GatewayResult;
use crate::models::{Paper, PaperSummary, SearchQuery, Source};

/// A bibliographic source that can fetch one paper or search.
#[async_trait::async_trait]
pub trait PaperSource: Send + Sync {
    /// Which source this adapter serves.
    fn source(&self) -> Source;

    /// Fetch the full normalized record for one identifier.
    async fn fetch_paper(&self, id: &str) -> GatewayResult<Paper>;

    /// Search by free-text query, returning partial records.
    async fn search(&self, query: &SearchQuery) -> GatewayResult<Vec<PaperSummary>>;
}

/// All configured adapters, sharing one upstream client.
#[derive(Debug)]
pub struct SourceRegistry {
    pubmed: PubmedAdapter,
    arxiv: ArxivAdapter,
}

impl SourceRegistry {
    /// Build the upstream client and both adapters from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = UpstreamClient::new(config)?;
        Ok(Self {
            pubmed: PubmedAdapter::new(client.clone(), config),
            arxiv: ArxivAdapter::new(client, config),
        })
    }

    /// Adapter for `source`.
    #[must_use]
    pub fn get(&self, source: Source) -> &dyn PaperSource {
        match source {
            Source::Pubmed => &self.pubmed,
            Source::Arxiv => &self.arxiv,
        }
    }

    /// The PubMed adapter.
    #[must_use]
    pub const fn pubmed(&self) -> &PubmedAdapter {
        &self.pubmed
    }

    /// The arXiv adapter.
    #[must_use]
    pub const fn arxiv(&self) -> &ArxivAdapter {
        &self.arxiv
    }
}

/// Collapse a failed best-effort fetch into an empty field, logging why.
pub(crate) fn degrade<E: std::fmt::Display>(result: Result<String, E>, what: &str, id: &str) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(id = %id, error = %e, "{what} unavailable, continuing without it");
        String::new()
    })
}
