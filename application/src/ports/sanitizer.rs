//! Output sanitizer port
//!
//! Applied to the consensus text before it leaves the pipeline.

pub trait OutputSanitizer: Send + Sync {
    fn sanitize(&self, text: &str) -> String;
}

/// Returns text unchanged
pub struct PassthroughSanitizer;

impl OutputSanitizer for PassthroughSanitizer {
    fn sanitize(&self, text: &str) -> String {
        text.to_string()
    }
}
