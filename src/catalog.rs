use crate::types::MirrorCandidate;
use url::Url;

/// Environment toggle: cap the catalog size for fast runs in constrained
/// or test environments.
pub const LIMIT_ENV: &str = "MIRRORPICK_LIMIT";

/// Deduplicated collection of mirror candidates, at most one per host.
///
/// Insertion order is preserved, so callers put preferred (local-region)
/// candidates first and they survive `limit()` truncation.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<MirrorCandidate>,
}

fn domain_of(raw: &str) -> String {
    // Malformed URLs are accepted as opaque strings; they dedup against
    // themselves only.
    match Url::parse(raw) {
        Ok(url) => {
            let host = url.host_str().unwrap_or(raw).to_ascii_lowercase();
            match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host,
            }
        }
        Err(_) => raw.to_ascii_lowercase(),
    }
}

fn is_encrypted(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false)
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate, keeping at most one entry per domain. An encrypted
    /// URL upgrades an existing plain entry in place (country label kept);
    /// anything else arriving for a known domain is discarded.
    pub fn add_candidate(&mut self, candidate: MirrorCandidate) {
        let domain = domain_of(&candidate.url);

        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| domain_of(&e.url) == domain)
        {
            if !is_encrypted(&existing.url) && is_encrypted(&candidate.url) {
                existing.url = candidate.url;
            }
            return;
        }

        self.entries.push(candidate);
    }

    pub fn extend<I: IntoIterator<Item = MirrorCandidate>>(&mut self, candidates: I) {
        for candidate in candidates {
            self.add_candidate(candidate);
        }
    }

    /// Truncate to the first `n` entries.
    pub fn limit(&mut self, n: usize) {
        self.entries.truncate(n);
    }

    /// Honor the debug env toggle, if set to a parseable number.
    pub fn apply_env_limit(&mut self) {
        if let Ok(raw) = std::env::var(LIMIT_ENV) {
            if let Ok(n) = raw.trim().parse::<usize>() {
                self.limit(n);
            }
        }
    }

    pub fn candidates(&self) -> &[MirrorCandidate] {
        &self.entries
    }

    pub fn into_candidates(self) -> Vec<MirrorCandidate> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
