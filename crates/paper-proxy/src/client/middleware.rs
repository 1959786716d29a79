//! Outbound request logging middleware.

use std::time::Instant;

use axum::http::Extensions;
use reqwest::{Request, Response, Url};
use reqwest_middleware::{Middleware, Next};

/// Logs method, URL, status and latency of every upstream call.
///
/// The `api_key` query parameter is masked before logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

#[async_trait::async_trait]
impl Middleware for RequestLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let url = redact(req.url());
        let started = Instant::now();

        let result = next.run(req, extensions).await.map_err(strip_url);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::debug!(
                %method,
                %url,
                status = response.status().as_u16(),
                elapsed_ms,
                "Upstream request"
            ),
            Err(e) => tracing::warn!(%method, %url, error = %e, elapsed_ms, "Upstream request failed"),
        }

        result
    }
}

/// Drop the request URL from transport errors; `url` above is the logged form.
fn strip_url(err: reqwest_middleware::Error) -> reqwest_middleware::Error {
    match err {
        reqwest_middleware::Error::Reqwest(e) => reqwest_middleware::Error::Reqwest(e.without_url()),
        other => other,
    }
}

fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "REDACTED".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
