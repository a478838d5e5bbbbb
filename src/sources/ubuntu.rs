use crate::sources::MirrorSource;
use crate::types::{MirrorCandidate, SecondaryUrl};

/// Ubuntu's mirror service publishes a plain list of archive URLs, one
/// per line, already filtered to mirrors near the requesting host.
pub struct UbuntuSource;

impl MirrorSource for UbuntuSource {
    fn name(&self) -> &'static str {
        "ubuntu"
    }

    fn catalog_url(&self) -> &'static str {
        "http://mirrors.ubuntu.com/mirrors.txt"
    }

    fn parse_catalog(&self, document: &str) -> Vec<MirrorCandidate> {
        document
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
            // mirrors.txt carries no country labels
            .map(|line| MirrorCandidate::new("", line))
            .collect()
    }

    fn secondary_urls(&self, _url: &str) -> Vec<SecondaryUrl> {
        vec![SecondaryUrl {
            label: "security".to_string(),
            url: "http://security.ubuntu.com/ubuntu/".to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_lines_and_skips_noise() {
        let document = "\
https://mirror.aarnet.edu.au/pub/ubuntu/archive/
http://ubuntu.mirror.digitalpacific.com.au/archive/

not a url
";
        let candidates = UbuntuSource.parse_catalog(document);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].url,
            "https://mirror.aarnet.edu.au/pub/ubuntu/archive/"
        );
        assert!(candidates.iter().all(|c| c.country.is_empty()));
    }
}
