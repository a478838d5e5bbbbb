use crate::probe::{self, ProbeConfig};
use crate::runner::{self, RunOptions};
use crate::types::MirrorCandidate;
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

// Built-in fallback tables, compiled in.
const MIRRORS_JSON: &str = include_str!("../assets/mirrors.json");

/// Per-family data: curated fallback mirrors plus the ordered list of
/// sample objects every well-formed mirror of that family serves.
#[derive(Debug, Clone, Deserialize)]
pub struct FamilyTable {
    #[serde(default)]
    pub mirrors: Vec<MirrorCandidate>,
    #[serde(default)]
    pub sample_files: Vec<String>,
}

static TABLE_CACHE: OnceLock<HashMap<String, FamilyTable>> = OnceLock::new();

/// Look up the fallback table for a family.
/// Strategy:
/// 1. Try the user override (~/.config/mirrorpick/mirrors.json)
/// 2. Fall back to the built-in assets/mirrors.json
pub fn family_table(family: &str) -> Option<FamilyTable> {
    let tables = TABLE_CACHE.get_or_init(|| {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "mirrorpick") {
            let override_path = proj_dirs.config_dir().join("mirrors.json");
            if override_path.exists() {
                if let Ok(content) = fs::read_to_string(&override_path) {
                    if let Ok(parsed) = serde_json::from_str(&content) {
                        println!("Loaded mirror tables from {:?}", override_path);
                        return parsed;
                    }
                }
            }
        }

        serde_json::from_str(MIRRORS_JSON)
            .expect("Failed to parse assets/mirrors.json. This is a compile-time error.")
    });

    tables.get(family).cloned()
}

fn default_workers() -> usize {
    runner::DEFAULT_WORKERS
}
fn default_top_n() -> usize {
    runner::DEFAULT_TOP_N
}
fn default_timeout_secs() -> u64 {
    probe::DEFAULT_TIMEOUT_SECS
}
fn default_max_samples() -> usize {
    probe::DEFAULT_MAX_SAMPLES
}
fn default_sample_delay_ms() -> u64 {
    probe::DEFAULT_SAMPLE_DELAY_MS
}

/// User-tunable probe settings, read from config.toml if present.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    #[serde(default = "default_sample_delay_ms")]
    pub sample_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            top_n: default_top_n(),
            timeout_secs: default_timeout_secs(),
            max_samples: default_max_samples(),
            sample_delay_ms: default_sample_delay_ms(),
        }
    }
}

impl Settings {
    /// Load from the user config dir; a missing or unreadable file means
    /// defaults, a present-but-invalid file is reported and ignored.
    pub fn load() -> Self {
        let Some(proj_dirs) = ProjectDirs::from("", "", "mirrorpick") else {
            return Self::default();
        };
        Self::load_from(&proj_dirs.config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    eprintln!("Ignoring invalid {:?}: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            workers: self.workers,
            top_n: self.top_n,
            timeout: Duration::from_secs(self.timeout_secs),
            probe: ProbeConfig {
                max_samples: self.max_samples,
                sample_delay: Duration::from_millis(self.sample_delay_ms),
                ..ProbeConfig::default()
            },
            ..RunOptions::default()
        }
    }
}
