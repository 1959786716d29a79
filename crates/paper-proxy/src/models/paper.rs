//! Unified paper record returned for both sources.

use serde::{Deserialize, Serialize};

use crate::config::api;

/// Abstract used when a PubMed record carries no abstract text.
pub const NO_ABSTRACT: &str = "(No abstract available.)";

/// A normalized paper record.
///
/// Every field is a plain string or list of strings; absence is `""` or `[]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Paper title, never empty.
    pub title: String,

    /// Surnames or collective names in source order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Best-effort publication date.
    #[serde(default)]
    pub published: String,

    /// Normalized abstract.
    #[serde(rename = "abstract", default)]
    pub r#abstract: String,

    /// Full text from a secondary fetch, `""` when unavailable.
    #[serde(default)]
    pub full_text: String,

    /// Canonical public URL.
    pub url: String,
}

/// Partial record returned by searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSummary {
    /// PMID or arXiv identifier.
    pub id: String,

    /// Paper title.
    #[serde(default)]
    pub title: String,

    /// Author names in source order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication date as given by the source.
    #[serde(default)]
    pub published: String,

    /// Abstract or summary text, `""` when absent.
    #[serde(default)]
    pub summary: String,
}

/// Search response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching papers in upstream order.
    pub papers: Vec<PaperSummary>,
}

/// Canonical PubMed page for a PMID.
#[must_use]
pub fn pubmed_url(pmid: &str) -> String {
    format!("{}/{}/", api::PUBMED_WEB_URL, pmid)
}

/// Canonical arXiv abstract page for an arXiv id.
#[must_use]
pub fn arxiv_url(arxiv_id: &str) -> String {
    format!("{}/{}", api::ARXIV_ABS_URL, arxiv_id)
}
