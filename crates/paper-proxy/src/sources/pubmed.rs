//! PubMed / PMC adapter over NCBI E-utilities.
//!
//! Endpoints used:
//!   efetch:   article XML (`db=pubmed`), PMC body XML (`db=pmc`), MEDLINE text for search
//!   esummary: title fallback when the efetch XML carries no title
//!   elink:    PMID to PMC id resolution (`linkname=pubmed_pmc`)
//!   esearch:  query to PMID list

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use super::medline::parse_medline;
use super::{PaperSource, degrade};
use crate::client::UpstreamClient;
use crate::config::{Config, api};
use crate::error::{ClientResult, GatewayError, GatewayResult};
use crate::models::{NO_ABSTRACT, Paper, PaperSummary, SearchQuery, Source, pubmed_url};
use crate::text::normalize;
use crate::xml::XmlDocument;

/// Element names read from a PubMed efetch document.
///
/// Lists are tried in order; the first entry that yields a non-empty value wins.
#[derive(Debug, Clone, Copy)]
pub struct ArticleSchema {
    /// Title elements.
    pub title: &'static [&'static str],
    /// Author name elements. The whole list of the first matching name is used.
    pub authors: &'static [&'static str],
    /// Abstract section elements, joined with a space.
    pub abstract_parts: &'static [&'static str],
    /// Date containers.
    pub date_containers: &'static [&'static str],
    /// Date parts read inside the container, joined with a space.
    pub date_parts: &'static [&'static str],
    /// Free-form date read inside the container when no parts are present.
    pub date_fallback: &'static [&'static str],
}

/// Mapping for PubMed article and book records.
pub const PUBMED_ARTICLE: ArticleSchema = ArticleSchema {
    title: &["ArticleTitle", "article-title", "BookTitle", "Title"],
    authors: &["LastName", "CollectiveName"],
    abstract_parts: &["AbstractText"],
    date_containers: &["PubDate", "BookDate"],
    date_parts: &["Year", "Month", "Day"],
    date_fallback: &["MedlineDate"],
};

/// Fields extracted from one efetch document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    /// Normalized title, `None` if no title element had text.
    pub title: Option<String>,
    /// Normalized author names.
    pub authors: Vec<String>,
    /// Normalized abstract, or [`NO_ABSTRACT`].
    pub r#abstract: String,
    /// Space-joined date parts, possibly empty.
    pub published: String,
}

/// Extract article fields from an efetch document using `schema`.
#[must_use]
pub fn extract_article(doc: &XmlDocument, schema: &ArticleSchema) -> ArticleFields {
    let title = schema
        .title
        .iter()
        .filter_map(|name| doc.find(name))
        .map(|e| normalize(&e.text()))
        .find(|t| !t.is_empty());

    let authors = schema
        .authors
        .iter()
        .map(|name| {
            doc.find_all(name)
                .map(|e| normalize(&e.text()))
                .filter(|a| !a.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|names| !names.is_empty())
        .unwrap_or_default();

    let abstract_text = normalize(
        &schema
            .abstract_parts
            .iter()
            .flat_map(|name| doc.find_all(name))
            .map(|e| e.text())
            .collect::<Vec<_>>()
            .join(" "),
    );
    let r#abstract = if abstract_text.is_empty() { NO_ABSTRACT.to_string() } else { abstract_text };

    let published = schema
        .date_containers
        .iter()
        .find_map(|name| doc.find(name))
        .map(|container| {
            let parts: Vec<String> = schema
                .date_parts
                .iter()
                .filter_map(|part| container.find(part))
                .map(|e| normalize(&e.text()))
                .filter(|p| !p.is_empty())
                .collect();
            if parts.is_empty() {
                schema
                    .date_fallback
                    .iter()
                    .find_map(|name| container.find(name))
                    .map(|e| normalize(&e.text()))
                    .unwrap_or_default()
            } else {
                parts.join(" ")
            }
        })
        .unwrap_or_default();

    ArticleFields { title, authors, r#abstract, published }
}

/// Normalized text of every paragraph under the first `body`, separated by blank lines.
#[must_use]
pub fn extract_body_paragraphs(doc: &XmlDocument) -> String {
    let Some(body) = doc.find("body") else {
        return String::new();
    };
    body.find_all("p")
        .map(|p| normalize(&p.text()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ELinkResponse {
    #[serde(default)]
    linksets: Vec<LinkSet>,
}

#[derive(Debug, Deserialize)]
struct LinkSet {
    #[serde(default)]
    linksetdbs: Vec<LinkSetDb>,
}

#[derive(Debug, Deserialize)]
struct LinkSetDb {
    #[serde(default)]
    linkname: String,
    #[serde(default)]
    links: Vec<String>,
}

/// PubMed adapter.
#[derive(Debug, Clone)]
pub struct PubmedAdapter {
    client: UpstreamClient,
    eutils_url: String,
    api_key: Option<String>,
    email: Option<String>,
    metadata_timeout: Duration,
    full_text_timeout: Duration,
    delay: Duration,
}

impl PubmedAdapter {
    /// Create an adapter sharing `client`.
    #[must_use]
    pub fn new(client: UpstreamClient, config: &Config) -> Self {
        Self {
            client,
            eutils_url: config.eutils_url.clone(),
            api_key: config.ncbi_api_key.clone(),
            email: config.entrez_email.clone(),
            metadata_timeout: config.metadata_timeout,
            full_text_timeout: config.full_text_timeout,
            delay: config.pubmed_delay,
        }
    }

    fn endpoint(&self, utility: &str) -> String {
        format!("{}/{}.fcgi", self.eutils_url, utility)
    }

    /// Utility parameters plus the NCBI courtesy parameters.
    fn params(&self, extra: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> =
            extra.iter().map(|(k, v)| (*k, (*v).to_string())).collect();
        params.push(("tool", api::EUTILS_TOOL.to_string()));
        if let Some(ref email) = self.email {
            params.push(("email", email.clone()));
        }
        if let Some(ref key) = self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Fetch and normalize one PubMed record.
    ///
    /// Without an API key this first waits the advisory delay. The wait is
    /// per call and does not coordinate concurrent callers.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if neither efetch nor esummary yields a title;
    /// [`GatewayError::UpstreamUnavailable`] if a required call fails.
    pub async fn fetch_by_pmid(&self, pmid: &str) -> GatewayResult<Paper> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let xml = self
            .client
            .fetch_text(
                &self.endpoint("efetch"),
                &self.params(&[("db", "pubmed"), ("id", pmid), ("retmode", "xml")]),
                self.metadata_timeout,
            )
            .await?;

        let doc = XmlDocument::parse(&xml);
        let fields = extract_article(&doc, &PUBMED_ARTICLE);

        let title = match fields.title {
            Some(title) => title,
            None => {
                tracing::debug!(pmid, "No title in efetch XML, trying esummary");
                self.summary_title(pmid)
                    .await?
                    .ok_or_else(|| GatewayError::not_found(format!("PMID {pmid}")))?
            }
        };

        let full_text = degrade(self.pmc_full_text(pmid).await, "PMC full text", pmid);

        tracing::info!(
            pmid,
            authors = fields.authors.len(),
            full_text = !full_text.is_empty(),
            "Fetched PubMed record"
        );

        Ok(Paper {
            title,
            authors: fields.authors,
            published: fields.published,
            r#abstract: fields.r#abstract,
            full_text,
            url: pubmed_url(pmid),
        })
    }

    /// Title from esummary. An empty or undecodable body counts as no title.
    async fn summary_title(&self, pmid: &str) -> GatewayResult<Option<String>> {
        let response = self
            .client
            .fetch(
                &self.endpoint("esummary"),
                &self.params(&[("db", "pubmed"), ("id", pmid), ("retmode", "json")]),
                self.metadata_timeout,
            )
            .await?;

        let Ok(summary) = response.json::<serde_json::Value>() else {
            tracing::debug!(pmid, "esummary body is not JSON");
            return Ok(None);
        };

        Ok(summary["result"][pmid]["title"]
            .as_str()
            .map(normalize)
            .filter(|t| !t.is_empty()))
    }

    /// First PMC id linked from `pmid`, if any.
    async fn linked_pmc_id(&self, pmid: &str) -> ClientResult<Option<String>> {
        let links: ELinkResponse = self
            .client
            .fetch_json(
                &self.endpoint("elink"),
                &self.params(&[
                    ("dbfrom", "pubmed"),
                    ("db", "pmc"),
                    ("linkname", "pubmed_pmc"),
                    ("id", pmid),
                    ("retmode", "json"),
                ]),
                self.metadata_timeout,
            )
            .await?;

        Ok(links
            .linksets
            .into_iter()
            .flat_map(|set| set.linksetdbs)
            .filter(|db| db.linkname.is_empty() || db.linkname == "pubmed_pmc")
            .find_map(|db| db.links.into_iter().next()))
    }

    /// PMC body paragraphs for `pmid`, `""` when there is no PMC deposit.
    async fn pmc_full_text(&self, pmid: &str) -> ClientResult<String> {
        let Some(pmcid) = self.linked_pmc_id(pmid).await? else {
            tracing::debug!(pmid, "No linked PMC record");
            return Ok(String::new());
        };

        let xml = self
            .client
            .fetch_text(
                &self.endpoint("efetch"),
                &self.params(&[("db", "pmc"), ("id", pmcid.as_str()), ("retmode", "xml")]),
                self.full_text_timeout,
            )
            .await?;

        Ok(extract_body_paragraphs(&XmlDocument::parse(&xml)))
    }

    /// Search PubMed, returning partial records parsed from MEDLINE text.
    ///
    /// # Errors
    ///
    /// [`GatewayError::UpstreamUnavailable`] if either call fails. No ids
    /// is an empty result, not an error.
    pub async fn search_by_query(&self, query: &SearchQuery) -> GatewayResult<Vec<PaperSummary>> {
        let max = query.max_results.to_string();
        let found: ESearchResponse = self
            .client
            .fetch_json(
                &self.endpoint("esearch"),
                &self.params(&[
                    ("db", "pubmed"),
                    ("term", query.query.as_str()),
                    ("retmax", max.as_str()),
                    ("retmode", "json"),
                ]),
                self.metadata_timeout,
            )
            .await?;

        let mut ids = found.esearchresult.idlist;
        ids.truncate(query.max_results);
        if ids.is_empty() {
            tracing::info!(query = %query.query, "PubMed search returned no ids");
            return Ok(Vec::new());
        }

        let id_list = ids.join(",");
        let text = self
            .client
            .fetch_text(
                &self.endpoint("efetch"),
                &self.params(&[
                    ("db", "pubmed"),
                    ("id", id_list.as_str()),
                    ("rettype", "medline"),
                    ("retmode", "text"),
                ]),
                self.metadata_timeout,
            )
            .await?;

        let mut seen = HashSet::new();
        let papers: Vec<PaperSummary> = parse_medline(&text)
            .into_iter()
            .filter(|p| p.id.is_empty() || seen.insert(p.id.clone()))
            .collect();

        tracing::info!(query = %query.query, ids = ids.len(), papers = papers.len(), "PubMed search");
        Ok(papers)
    }
}

#[async_trait::async_trait]
impl PaperSource for PubmedAdapter {
    fn source(&self) -> Source {
        Source::Pubmed
    }

    async fn fetch_paper(&self, id: &str) -> GatewayResult<Paper> {
        self.fetch_by_pmid(id).await
    }

    async fn search(&self, query: &SearchQuery) -> GatewayResult<Vec<PaperSummary>> {
        self.search_by_query(query).await
    }
}
