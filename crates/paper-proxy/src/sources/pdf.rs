//! PDF text extraction.

/// Extract embedded text from PDF bytes on the blocking pool.
///
/// `pdf-extract` may panic on malformed documents; a panic is reported as an
/// error rather than taking down the request task.
pub async fn extract_text(bytes: Vec<u8>) -> anyhow::Result<String> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| anyhow::anyhow!("PDF extraction aborted: {e}"))?
        .map_err(|e| anyhow::anyhow!("PDF extraction failed: {e}"))?;

    tracing::debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");
    Ok(text)
}
