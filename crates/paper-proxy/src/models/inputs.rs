//! Query parameters for the search routes.

use serde::{Deserialize, Serialize};

use crate::config::limits;
use crate::error::{GatewayError, GatewayResult};

/// Raw `?query=&max_results=` parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text query passed to the upstream search API.
    #[serde(default)]
    pub query: String,

    /// Number of results to return.
    #[serde(default = "default_max_results")]
    pub max_results: i64,
}

fn default_max_results() -> i64 {
    limits::DEFAULT_MAX_RESULTS
}

/// Search parameters that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Query string, as given.
    pub query: String,

    /// Result cap, within `1..=limits::MAX_RESULTS`.
    pub max_results: usize,
}

impl SearchParams {
    /// Validate before any outbound call is made.
    pub fn validate(self) -> GatewayResult<SearchQuery> {
        if self.query.chars().count() < limits::MIN_QUERY_LEN {
            return Err(GatewayError::invalid_input(
                "query",
                format!("must be at least {} characters", limits::MIN_QUERY_LEN),
            ));
        }

        if !(1..=limits::MAX_RESULTS).contains(&self.max_results) {
            return Err(GatewayError::invalid_input(
                "max_results",
                format!("must be between 1 and {}", limits::MAX_RESULTS),
            ));
        }

        Ok(SearchQuery { query: self.query, max_results: self.max_results as usize })
    }
}
