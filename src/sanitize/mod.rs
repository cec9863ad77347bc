//! URL sanitization for probe targets.
//!
//! Normalizes a candidate URL string before it is used as a network target
//! and rejects forms that are malformed or point at internal infrastructure.
//! The check is purely syntactic: no DNS lookup is performed, so the function
//! stays a pure function of its input.

use std::net::IpAddr;

use url::{Host, Url};

use crate::error::SanitizeError;

/// Scheme prepended to scheme-less input instead of letting it through bare.
const DEFAULT_SCHEME: &str = "https";

/// Knobs for [`sanitize_url`].
#[derive(Debug, Clone, Default)]
pub struct SanitizeOptions {
    /// Permit loopback, private-range and link-local targets. Off by default;
    /// probing internal addresses is an explicit opt-in.
    pub allow_private_targets: bool,
}

/// Normalize and validate a raw URL string for use as a probe target.
///
/// Trims whitespace, supplies a default scheme for scheme-less input, and
/// accepts only `http`/`https` URLs whose host is not a loopback, private or
/// link-local address (unless [`SanitizeOptions::allow_private_targets`]).
pub fn sanitize_url(raw: &str, opts: &SanitizeOptions) -> Result<Url, SanitizeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SanitizeError::Empty);
    }
    if raw.chars().any(|c| c.is_ascii_control()) {
        return Err(SanitizeError::ControlCharacters);
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("{DEFAULT_SCHEME}://{raw}")
    };

    let url = Url::parse(&candidate)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(SanitizeError::UnsupportedScheme(other.to_string())),
    }

    match url.host() {
        None => return Err(SanitizeError::MissingHost),
        Some(host) if !opts.allow_private_targets && is_private_host(&host) => {
            return Err(SanitizeError::PrivateTarget);
        }
        Some(_) => {}
    }

    Ok(url)
}

/// Literal addresses and names that point back at the local machine or into
/// private address space. Hostnames other than `localhost` are not resolved.
fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => name.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => {
            ip.is_loopback()
                || ip.is_private()
                || ip.is_link_local()
                || ip.is_unspecified()
                || ip.is_broadcast()
        }
        Host::Ipv6(ip) => {
            if ip.is_loopback() || ip.is_unspecified() {
                return true;
            }
            // Unique-local (fc00::/7) and link-local (fe80::/10) ranges.
            let segments = ip.segments();
            if segments[0] & 0xfe00 == 0xfc00 || segments[0] & 0xffc0 == 0xfe80 {
                return true;
            }
            // IPv4-mapped addresses inherit the IPv4 verdict.
            match ip.to_ipv4_mapped() {
                Some(v4) => is_private_host(&Host::Ipv4(v4)),
                None => false,
            }
        }
    }
}

/// Convenience check for a parsed IP address, used by embedders that resolve
/// hosts themselves before dispatch.
pub fn is_private_addr(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => is_private_host(&Host::Ipv4(v4)),
        IpAddr::V6(v6) => is_private_host(&Host::Ipv6(v6)),
    }
}
