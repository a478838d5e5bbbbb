use crate::sources::MirrorSource;
use crate::types::{MirrorCandidate, SecondaryUrl};
use regex::Regex;
use std::sync::OnceLock;

/// Debian publishes its mirrors as an RFC-822-style masterlist of
/// stanzas:
///
/// ```text
/// Site: ftp.de.debian.org
/// Country: DE Germany
/// Archive-http: /debian/
/// ```
pub struct DebianSource;

fn site_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^Site:\s*(?P<site>\S+)").unwrap())
}

fn country_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "Country: DE Germany" -> keep the human-readable part
    RE.get_or_init(|| Regex::new(r"(?m)^Country:\s*(?:[A-Z]{2}\s+)?(?P<country>.+)$").unwrap())
}

fn archive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^Archive-http:\s*(?P<path>\S+)").unwrap())
}

impl MirrorSource for DebianSource {
    fn name(&self) -> &'static str {
        "debian"
    }

    fn catalog_url(&self) -> &'static str {
        "https://mirror-master.debian.org/status/Mirrors.masterlist"
    }

    fn parse_catalog(&self, document: &str) -> Vec<MirrorCandidate> {
        let mut candidates = Vec::new();

        // Stanzas are separated by blank lines. Only sites exporting the
        // archive over http are usable as package mirrors.
        for stanza in document.split("\n\n") {
            let Some(site) = site_re().captures(stanza).map(|c| c["site"].to_string()) else {
                continue;
            };
            let Some(path) = archive_re().captures(stanza).map(|c| c["path"].to_string()) else {
                continue;
            };
            let country = country_re()
                .captures(stanza)
                .map(|c| c["country"].trim().to_string())
                .unwrap_or_default();

            candidates.push(MirrorCandidate::new(
                &country,
                &format!("http://{}{}", site, path),
            ));
        }

        candidates
    }

    fn secondary_urls(&self, _url: &str) -> Vec<SecondaryUrl> {
        vec![SecondaryUrl {
            label: "security".to_string(),
            url: "https://security.debian.org/debian-security/".to_string(),
        }]
    }
}
