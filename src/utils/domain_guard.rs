//! Denylist check for shortening targets.
//!
//! Keeps the service from shortening links into itself (a redirect loop
//! factory) or into explicitly denylisted hosts.

use url::Url;

/// Decides whether a target URL may be shortened.
#[derive(Debug, Clone)]
pub struct DomainGuard {
    denied_hosts: Vec<String>,
}

impl DomainGuard {
    /// Builds the guard from the service's own public domain and the
    /// configured denylist. The public domain may carry a scheme, port, or
    /// path; only its host is matched.
    pub fn new(public_domain: Option<&str>, denylist: &[String]) -> Self {
        let mut denied_hosts: Vec<String> = denylist
            .iter()
            .map(|h| host_of(h))
            .filter(|h| !h.is_empty())
            .collect();

        if let Some(own) = public_domain {
            let own = host_of(own);
            if !own.is_empty() && !denied_hosts.contains(&own) {
                denied_hosts.push(own);
            }
        }

        Self { denied_hosts }
    }

    /// Returns `false` when `target`'s host is denied.
    pub fn allows(&self, target: &Url) -> bool {
        let Some(host) = target.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        !self.denied_hosts.contains(&host)
    }
}

/// Reduces a configured domain entry to its bare host: scheme, port, and
/// path are stripped, and the rest lowercased.
fn host_of(entry: &str) -> String {
    let entry = entry.trim();
    let entry = entry
        .strip_prefix("https://")
        .or_else(|| entry.strip_prefix("http://"))
        .unwrap_or(entry);

    entry
        .split(['/', ':'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}
