//! Enumeration types for route parameters.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

static PMID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,9}$").expect("valid PMID regex"));

// New-style `2101.00001v2` and old-style `hep-th/9901001` / `math.GT/0309136`.
static ARXIV_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]{4}\.[0-9]{4,5}|[a-z]+(?:-[a-z]+)*(?:\.[A-Z]{2})?/[0-9]{7})(?:v[0-9]+)?$")
        .expect("valid arXiv id regex")
});

/// Upstream bibliographic source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// PubMed / PubMed Central.
    Pubmed,
    /// arXiv preprint server.
    Arxiv,
}

impl Source {
    /// Path segment naming this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pubmed => "pubmed",
            Self::Arxiv => "arxiv",
        }
    }

    /// Reject identifiers that cannot belong to this source.
    pub fn validate_id(self, id: &str) -> GatewayResult<()> {
        let (re, what) = match self {
            Self::Pubmed => (&*PMID_RE, "PMID must be numeric"),
            Self::Arxiv => (&*ARXIV_ID_RE, "not a valid arXiv identifier"),
        };
        if re.is_match(id) {
            Ok(())
        } else {
            Err(GatewayError::invalid_input("id", format!("{what}: {id}")))
        }
    }
}

impl FromStr for Source {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pubmed" => Ok(Self::Pubmed),
            "arxiv" => Ok(Self::Arxiv),
            other => Err(GatewayError::invalid_input(
                "source",
                format!("unknown source '{other}', expected 'arxiv' or 'pubmed'"),
            )),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
