//! Single-shot HTTP probe.
//!
//! Given a target URL and a request shape (method, headers, body, basic-auth
//! credentials), [`ProbeExecutor::execute`] issues exactly one outbound request
//! and assembles a [`ProbeResult`]: a normalized, persistable snapshot of both
//! the request and its response. A request that cannot be made — missing
//! fields, an unsafe or unreachable target — comes back as a field-keyed
//! [`ValidationError`], never a transport error chain.
//!
//! Persistence and assertion evaluation are collaborator concerns: the
//! executor only produces the record, and a [`ResultStore`](store::ResultStore)
//! accepts it.

pub mod error;
pub mod probe;
pub mod sanitize;
pub mod store;

pub use error::{ProbeError, SanitizeError, ValidationError};
pub use probe::executor::{ProbeConfig, ProbeExecutor};
pub use probe::request::{ParamValue, ProbeRequest, RequestParams};
pub use probe::result::ProbeResult;
pub use sanitize::{SanitizeOptions, sanitize_url};
