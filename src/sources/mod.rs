pub mod arch;
pub mod debian;
pub mod fedora;
pub mod ubuntu;

use crate::catalog::Catalog;
use crate::config;
use crate::error::{MirrorError, Result};
use crate::types::{MirrorCandidate, SecondaryUrl};
use async_trait::async_trait;
use reqwest::Client;

pub const SUPPORTED_FAMILIES: &[&str] = &["debian", "ubuntu", "arch", "fedora"];

/// MirrorSource: one distribution family's view of the mirror world.
///
/// Each family knows where its mirror list is published, how to turn that
/// document into `{country, url}` records, and which auxiliary endpoints
/// pair with a chosen mirror. Parsing is a pure function per family.
#[async_trait]
pub trait MirrorSource: Sync + Send {
    /// Family identifier (as accepted on the command line).
    fn name(&self) -> &'static str;

    /// The published mirror catalog for this family.
    fn catalog_url(&self) -> &'static str;

    /// Extract candidates from the catalog document. Unrecognized lines
    /// or stanzas are skipped, never an error.
    fn parse_catalog(&self, document: &str) -> Vec<MirrorCandidate>;

    /// Labeled companion endpoints ("security", "updates", ...) for a
    /// mirror URL of this family, if any.
    fn secondary_urls(&self, _url: &str) -> Vec<SecondaryUrl> {
        Vec::new()
    }

    /// Fetch and parse the remote catalog.
    async fn fetch_candidates(&self, client: &Client) -> Result<Vec<MirrorCandidate>> {
        let body = client
            .get(self.catalog_url())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(self.parse_catalog(&body))
    }
}

pub fn get_source(name: &str) -> Result<Box<dyn MirrorSource>> {
    match name.to_lowercase().as_str() {
        "debian" => Ok(Box::new(debian::DebianSource)),
        "ubuntu" => Ok(Box::new(ubuntu::UbuntuSource)),
        "arch" => Ok(Box::new(arch::ArchSource)),
        "fedora" => Ok(Box::new(fedora::FedoraSource)),
        _ => Err(MirrorError::UnknownFamily(format!(
            "Unsupported family: '{}'. Available: {}",
            name,
            SUPPORTED_FAMILIES.join(", ")
        ))),
    }
}

/// Merge the curated fallback list with freshly fetched candidates into a
/// deduplicated catalog. Fallback entries go in first so they survive any
/// truncation; a catalog-fetch failure degrades to the fallback list.
pub async fn build_catalog(
    source: &dyn MirrorSource,
    client: &Client,
    offline: bool,
) -> Catalog {
    let mut catalog = Catalog::new();

    if let Some(table) = config::family_table(source.name()) {
        catalog.extend(table.mirrors);
    }

    if !offline {
        match source.fetch_candidates(client).await {
            Ok(fetched) => catalog.extend(fetched),
            Err(e) => {
                eprintln!(
                    "Could not fetch {} mirror catalog ({}); using fallback list only.",
                    source.name(),
                    e
                );
            }
        }
    }

    catalog.apply_env_limit();
    catalog
}
