//! Text extraction: PDF bytes to a single plain-text string.
//!
//! Pages are visited in document order and concatenated with whatever
//! separators extraction naturally yields; nothing is inserted or removed.
//! Extraction is deterministic, so its failures are never retried.
//!
//! Two distinct failure modes matter to callers: bytes that are not a PDF at
//! all ([`QuizError::Extraction`]) versus a well-formed PDF with no text
//! content, such as a scan ([`QuizError::EmptyContent`]). The second gets its
//! own error because the fix is different — re-export the document with a
//! text layer rather than re-upload it.

use crate::error::QuizError;
use tracing::debug;

/// Extract the full text of a PDF held in memory.
///
/// We validate the `%PDF` magic bytes before handing the buffer to the parser
/// so callers get a meaningful error rather than a deep parse failure on
/// arbitrary junk. Parsing itself runs under `spawn_blocking` — it is
/// CPU-bound and can take hundreds of milliseconds on large documents.
pub async fn extract_text(bytes: &[u8]) -> Result<String, QuizError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(QuizError::Extraction {
            detail: "missing %PDF header".into(),
        });
    }

    let owned = bytes.to_vec();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
        .await
        .map_err(|e| QuizError::Internal(format!("extraction task panicked: {e}")))?
        .map_err(|e| QuizError::Extraction {
            detail: e.to_string(),
        })?;

    if text.trim().is_empty() {
        return Err(QuizError::EmptyContent);
    }

    debug!(chars = text.len(), "extracted text from PDF");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_bytes_fail_as_extraction_error() {
        let err = extract_text(b"").await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
    }

    #[tokio::test]
    async fn non_pdf_bytes_fail_as_extraction_error() {
        let err = extract_text(b"GIF89a not a pdf at all").await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
    }

    #[tokio::test]
    async fn truncated_header_fails_as_extraction_error() {
        let err = extract_text(b"%PD").await.unwrap_err();
        assert!(matches!(err, QuizError::Extraction { .. }));
    }

    #[tokio::test]
    async fn corrupt_body_after_valid_magic_never_succeeds() {
        // The parser may report a structural error or recover an empty
        // document; either way this must not yield usable text.
        let result = extract_text(b"%PDF-1.4\nthis is not a real pdf body").await;
        assert!(result.is_err());
    }
}
