pub mod executor;
pub mod request;
pub mod result;

use std::fmt::Write;

/// Render an error with its full source chain, for log lines at the
/// embedding boundary.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}

pub mod prelude {
    pub use super::executor::{ProbeConfig, ProbeExecutor};
    pub use super::request::{ParamValue, ProbeRequest, RequestParams};
    pub use super::result::ProbeResult;
}

#[cfg(test)]
mod tests {
    use crate::error::SanitizeError;

    #[test]
    fn report_includes_source_chain() {
        let err = crate::error::ProbeError::Validation({
            let mut errors = crate::error::ValidationError::new();
            errors.add("url", "Invalid URL or Domain");
            errors
        });
        let rendered = super::report(&err);
        assert!(rendered.contains("Invalid URL or Domain"));
        assert!(rendered.contains("Caused by"));

        let leaf = SanitizeError::Empty;
        assert_eq!(super::report(&leaf), "URL cannot be empty");
    }
}
