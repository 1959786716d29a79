//! Configuration for the paper proxy.

use std::time::Duration;

/// Upstream endpoints and request constants.
pub mod api {
    use std::time::Duration;

    /// NCBI E-utilities base URL (efetch, esearch, esummary, elink live below it).
    pub const EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// arXiv Atom query API.
    pub const ARXIV_API_URL: &str = "http://export.arxiv.org/api/query";

    /// arXiv PDF download base.
    pub const ARXIV_PDF_URL: &str = "https://arxiv.org/pdf";

    /// Public PubMed record page base.
    pub const PUBMED_WEB_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";

    /// Public arXiv abstract page base.
    pub const ARXIV_ABS_URL: &str = "https://arxiv.org/abs";

    /// Timeout for metadata and search calls.
    pub const METADATA_TIMEOUT: Duration = Duration::from_secs(15);

    /// Timeout for the PMC full-text fetch.
    pub const FULL_TEXT_TIMEOUT: Duration = Duration::from_secs(25);

    /// Timeout for the arXiv PDF download.
    pub const PDF_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Pause before a single-paper PubMed fetch without an API key (~3 req/s).
    pub const UNAUTHENTICATED_DELAY: Duration = Duration::from_millis(400);

    /// Cap on extracted PDF text, in characters.
    pub const PDF_TEXT_MAX_CHARS: usize = 100_000;

    /// `tool` parameter sent to E-utilities.
    pub const EUTILS_TOOL: &str = "paper-proxy";

    /// User-Agent for all outbound requests.
    pub const USER_AGENT: &str = concat!("paper-proxy/", env!("CARGO_PKG_VERSION"));
}

/// Search request limits.
pub mod limits {
    /// Minimum query length, in characters.
    pub const MIN_QUERY_LEN: usize = 3;

    /// Results returned when `max_results` is omitted.
    pub const DEFAULT_MAX_RESULTS: i64 = 5;

    /// Upper bound on `max_results`.
    pub const MAX_RESULTS: i64 = 20;
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contact email sent to NCBI (optional).
    pub entrez_email: Option<String>,

    /// NCBI API key (optional). Raises the upstream rate ceiling and disables the advisory delay.
    pub ncbi_api_key: Option<String>,

    /// Download arXiv PDFs and extract their text.
    pub arxiv_pdf: bool,

    /// E-utilities base URL (for testing with mock servers).
    pub eutils_url: String,

    /// arXiv query API URL (for testing with mock servers).
    pub arxiv_api_url: String,

    /// arXiv PDF base URL (for testing with mock servers).
    pub arxiv_pdf_url: String,

    /// Timeout for metadata and search calls.
    pub metadata_timeout: Duration,

    /// Timeout for the PMC full-text fetch.
    pub full_text_timeout: Duration,

    /// Timeout for the PDF download.
    pub pdf_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Advisory delay before a single-paper PubMed fetch.
    pub pubmed_delay: Duration,
}

impl Config {
    /// Create a new configuration.
    ///
    /// The PubMed advisory delay is dropped when an API key is present.
    #[must_use]
    pub fn new(ncbi_api_key: Option<String>, entrez_email: Option<String>, arxiv_pdf: bool) -> Self {
        let pubmed_delay = if ncbi_api_key.is_some() {
            Duration::ZERO
        } else {
            api::UNAUTHENTICATED_DELAY
        };
        Self {
            entrez_email,
            ncbi_api_key,
            arxiv_pdf,
            eutils_url: api::EUTILS_URL.to_string(),
            arxiv_api_url: api::ARXIV_API_URL.to_string(),
            arxiv_pdf_url: api::ARXIV_PDF_URL.to_string(),
            metadata_timeout: api::METADATA_TIMEOUT,
            full_text_timeout: api::FULL_TEXT_TIMEOUT,
            pdf_timeout: api::PDF_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            pubmed_delay,
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            entrez_email: None,
            ncbi_api_key: None,
            arxiv_pdf: false,
            eutils_url: format!("{}/eutils", base_url),
            arxiv_api_url: format!("{}/api/query", base_url),
            arxiv_pdf_url: format!("{}/pdf", base_url),
            metadata_timeout: Duration::from_secs(5),
            full_text_timeout: Duration::from_secs(5),
            pdf_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            pubmed_delay: Duration::ZERO, // No pacing in tests
        }
    }

    /// Create configuration from environment variables
    /// (`NCBI_KEY`, `ENTREZ_EMAIL`, `ARXIV_PDF`).
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let entrez_email = var("ENTREZ_EMAIL");
        if let Some(ref email) = entrez_email {
            anyhow::ensure!(email.contains('@'), "ENTREZ_EMAIL is not an email address: {email}");
        }

        let arxiv_pdf = var("ARXIV_PDF").is_some_and(|v| v.eq_ignore_ascii_case("yes"));

        Ok(Self::new(var("NCBI_KEY"), entrez_email, arxiv_pdf))
    }

    /// Check if an NCBI API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.ncbi_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, None, false)
    }
}
