use crate::sources::MirrorSource;
use crate::types::{MirrorCandidate, SecondaryUrl};

/// Fedora's mirrorlist endpoint returns plain text: a `# repo = ...`
/// comment line followed by one repository base URL per line.
pub struct FedoraSource;

impl MirrorSource for FedoraSource {
    fn name(&self) -> &'static str {
        "fedora"
    }

    fn catalog_url(&self) -> &'static str {
        "https://mirrors.fedoraproject.org/mirrorlist?repo=fedora-42&arch=x86_64"
    }

    fn parse_catalog(&self, document: &str) -> Vec<MirrorCandidate> {
        document
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
            .map(|line| MirrorCandidate::new("", line))
            .collect()
    }

    fn secondary_urls(&self, url: &str) -> Vec<SecondaryUrl> {
        // releases/<ver>/Everything/<arch>/os/ pairs with updates/<ver>/...
        if !url.contains("/releases/") {
            return Vec::new();
        }
        let updates = url.replace("/releases/", "/updates/").replace("/os/", "/");
        vec![SecondaryUrl {
            label: "updates".to_string(),
            url: updates,
        }]
    }
}
