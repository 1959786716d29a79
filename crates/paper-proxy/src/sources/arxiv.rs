//! arXiv adapter over the Atom query API.

use std::time::Duration;

use super::{PaperSource, degrade, pdf};
use crate::client::UpstreamClient;
use crate::config::{Config, api};
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Paper, PaperSummary, SearchQuery, Source, arxiv_url};
use crate::text::{normalize, normalize_opt, truncate_chars};
use crate::xml::{Element, XmlDocument};

/// Element names read from an Atom feed.
#[derive(Debug, Clone, Copy)]
pub struct AtomEntrySchema {
    /// One element per result.
    pub entry: &'static str,
    /// Entry identifier URL; its last path segment is the arXiv id.
    pub id: &'static str,
    /// Title, normalized.
    pub title: &'static str,
    /// Author container, repeated in feed order.
    pub author: &'static str,
    /// Name inside each author container.
    pub author_name: &'static str,
    /// Publication timestamp, passed through.
    pub published: &'static str,
    /// Abstract, normalized.
    pub summary: &'static str,
}

/// Mapping for arXiv Atom entries.
pub const ATOM_ENTRY: AtomEntrySchema = AtomEntrySchema {
    entry: "entry",
    id: "id",
    title: "title",
    author: "author",
    author_name: "name",
    published: "published",
    summary: "summary",
};

// arXiv reports query errors as an entry whose id lives under this path.
const API_ERROR_PATH: &str = "/api/errors";

fn child_text(entry: Element<'_>, name: &str) -> Option<String> {
    entry.find(name).map(|e| e.text())
}

/// Final path segment of an entry id URL (`http://arxiv.org/abs/2101.00001v1` → `2101.00001v1`).
fn last_path_segment(entry_id: &str) -> String {
    url::Url::parse(entry_id)
        .ok()
        .and_then(|u| u.path_segments()?.filter(|s| !s.is_empty()).last().map(str::to_string))
        .unwrap_or_else(|| {
            entry_id.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_string()
        })
}

/// Parse an Atom feed into partial records, in feed order.
///
/// Error entries returned by the arXiv API are skipped.
#[must_use]
pub fn parse_feed(xml: &str) -> Vec<PaperSummary> {
    let schema = &ATOM_ENTRY;
    let doc = XmlDocument::parse(xml);

    doc.find_all(schema.entry)
        .filter_map(|entry| {
            let entry_id = normalize_opt(child_text(entry, schema.id).as_deref());
            if entry_id.contains(API_ERROR_PATH) {
                tracing::debug!(entry_id = %entry_id, "Skipping arXiv error entry");
                return None;
            }
            Some(PaperSummary {
                id: last_path_segment(&entry_id),
                title: normalize_opt(child_text(entry, schema.title).as_deref()),
                authors: entry
                    .find_all(schema.author)
                    .filter_map(|author| author.find(schema.author_name))
                    .map(|name| normalize(&name.text()))
                    .filter(|name| !name.is_empty())
                    .collect(),
                published: child_text(entry, schema.published)
                    .map(|p| p.trim().to_string())
                    .unwrap_or_default(),
                summary: normalize_opt(child_text(entry, schema.summary).as_deref()),
            })
        })
        .collect()
}

/// Normalize extracted PDF text and cap it at [`api::PDF_TEXT_MAX_CHARS`] characters.
#[must_use]
pub fn clean_pdf_text(raw: &str) -> String {
    truncate_chars(&normalize(raw), api::PDF_TEXT_MAX_CHARS)
}

/// arXiv adapter.
#[derive(Debug, Clone)]
pub struct ArxivAdapter {
    client: UpstreamClient,
    api_url: String,
    pdf_url: String,
    pdf_enabled: bool,
    metadata_timeout: Duration,
    pdf_timeout: Duration,
}

impl ArxivAdapter {
    /// Create an adapter sharing `client`.
    #[must_use]
    pub fn new(client: UpstreamClient, config: &Config) -> Self {
        Self {
            client,
            api_url: config.arxiv_api_url.clone(),
            pdf_url: config.arxiv_pdf_url.clone(),
            pdf_enabled: config.arxiv_pdf,
            metadata_timeout: config.metadata_timeout,
            pdf_timeout: config.pdf_timeout,
        }
    }

    async fn query(&self, search_query: &str, max_results: usize) -> GatewayResult<Vec<PaperSummary>> {
        let params = [
            ("search_query", search_query.to_string()),
            ("max_results", max_results.to_string()),
        ];
        let xml = self.client.fetch_text(&self.api_url, &params, self.metadata_timeout).await?;
        Ok(parse_feed(&xml))
    }

    /// Title, authors, timestamp and summary for one arXiv id.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if the feed has no entry;
    /// [`GatewayError::UpstreamUnavailable`] if the query call fails.
    pub async fn fetch_meta(&self, arxiv_id: &str) -> GatewayResult<PaperSummary> {
        self.query(&format!("id:{arxiv_id}"), 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::not_found(format!("arXiv ID {arxiv_id}")))
    }

    /// Text extracted from the paper PDF, or `""`.
    ///
    /// Returns `""` without any request when PDF extraction is disabled, and
    /// whenever the download or extraction fails.
    pub async fn fetch_pdf_text(&self, arxiv_id: &str) -> String {
        if !self.pdf_enabled {
            return String::new();
        }

        let text = self.download_pdf_text(arxiv_id).await;
        degrade(text.map(|raw| clean_pdf_text(&raw)), "arXiv PDF text", arxiv_id)
    }

    async fn download_pdf_text(&self, arxiv_id: &str) -> anyhow::Result<String> {
        let url = format!("{}/{}.pdf", self.pdf_url, arxiv_id);
        let response = self.client.fetch(&url, &[], self.pdf_timeout).await?;
        pdf::extract_text(response.body).await
    }

    /// Search arXiv with a raw query string.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if the feed has no entries;
    /// [`GatewayError::UpstreamUnavailable`] if the query call fails.
    pub async fn search_by_query(&self, query: &SearchQuery) -> GatewayResult<Vec<PaperSummary>> {
        let papers = self.query(&query.query, query.max_results).await?;
        if papers.is_empty() {
            return Err(GatewayError::not_found(format!("arXiv results for '{}'", query.query)));
        }
        tracing::info!(query = %query.query, papers = papers.len(), "arXiv search");
        Ok(papers)
    }

    /// Metadata plus optional PDF text, as a full record.
    ///
    /// # Errors
    ///
    /// Same as [`ArxivAdapter::fetch_meta`]; PDF failures never error.
    pub async fn fetch_full(&self, arxiv_id: &str) -> GatewayResult<Paper> {
        let meta = self.fetch_meta(arxiv_id).await?;
        let full_text = self.fetch_pdf_text(arxiv_id).await;

        tracing::info!(
            arxiv_id,
            authors = meta.authors.len(),
            full_text = !full_text.is_empty(),
            "Fetched arXiv record"
        );

        Ok(Paper {
            title: meta.title,
            authors: meta.authors,
            published: meta.published,
            r#abstract: meta.summary,
            full_text,
            url: arxiv_url(arxiv_id),
        })
    }
}

#[async_trait::async_trait]
impl PaperSource for ArxivAdapter {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    async fn fetch_paper(&self, id: &str) -> GatewayResult<Paper> {
        self.fetch_full(id).await
    }

    async fn search(&self, query: &SearchQuery) -> GatewayResult<Vec<PaperSummary>> {
        self.search_by_query(query).await
    }
}
