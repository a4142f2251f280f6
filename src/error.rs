use thiserror::Error;

/// Failures surfaced by metadata extraction.
///
/// Anything short of structurally invalid input is absorbed by leaving the
/// affected field at its zero value; extraction is best-effort by design.
#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes are not syntactically valid JSON.
    ///
    /// The partially filled record is discarded; its contents are undefined.
    #[error("malformed JSON input: {0}")]
    MalformedInput(#[source] serde_json::Error),

    /// `metadata.creationTimestamp` is present but not RFC 3339.
    ///
    /// Only raised by [`ParsedObject`](crate::ParsedObject), which needs a
    /// structured timestamp; the raw extractor keeps the verbatim string.
    #[error("malformed creation timestamp: {0}")]
    MalformedTimestamp(#[source] chrono::ParseError),
}
