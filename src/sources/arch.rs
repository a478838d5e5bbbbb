use crate::sources::MirrorSource;
use crate::types::MirrorCandidate;
use regex::Regex;
use std::sync::OnceLock;

/// Arch publishes a pacman mirrorlist: `## Country` section headers
/// followed by (mostly commented-out) `Server = ...$repo/os/$arch` lines.
pub struct ArchSource;

fn server_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#?\s*Server\s*=\s*(?P<url>\S+)").unwrap())
}

impl MirrorSource for ArchSource {
    fn name(&self) -> &'static str {
        "arch"
    }

    fn catalog_url(&self) -> &'static str {
        "https://archlinux.org/mirrorlist/all/"
    }

    fn parse_catalog(&self, document: &str) -> Vec<MirrorCandidate> {
        let mut candidates = Vec::new();
        let mut country = String::new();

        for line in document.lines() {
            let line = line.trim();
            if let Some(header) = line.strip_prefix("## ") {
                country = header.trim().to_string();
                continue;
            }
            if let Some(caps) = server_re().captures(line) {
                // Keep the archive root; sample paths supply $repo/os/$arch.
                let url = caps["url"]
                    .trim_end_matches("$repo/os/$arch")
                    .trim_end_matches('/');
                candidates.push(MirrorCandidate::new(&country, &format!("{}/", url)));
            }
        }

        candidates
    }
}
