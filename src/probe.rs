use crate::session::ProbeSession;
use crate::types::{MirrorCandidate, MirrorResult};
use futures::StreamExt;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Connect/response timeout per attempt.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// Sampling passes per candidate.
pub const DEFAULT_MAX_SAMPLES: usize = 3;
/// Pause between sampling passes, to avoid bursting one mirror.
pub const DEFAULT_SAMPLE_DELAY_MS: u64 = 500;
/// Stop streaming a sample after this many bytes.
pub const STREAM_CAP_BYTES: u64 = 100 * 1024;

/// Tunables for one probe. Defaults match what the CLI ships with;
/// tests shrink the delays.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub max_samples: usize,
    pub sample_delay: Duration,
    pub stream_cap: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            sample_delay: Duration::from_millis(DEFAULT_SAMPLE_DELAY_MS),
            stream_cap: STREAM_CAP_BYTES,
        }
    }
}

/// Build the HTTP client shared by all probes of a run.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
}

fn sample_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// The early-abort cutoff. `threshold / max_samples` is deliberately
/// approximate: a mirror below it after an attempt is very unlikely to
/// average its way into the window, and giving up early is worth the
/// occasional false negative.
fn below_cutoff(max_speed: f64, threshold: f64, max_samples: usize) -> bool {
    max_speed < threshold / max_samples as f64
}

/// Speed-test one candidate: up to `max_samples` passes, each trying the
/// sample files in order until one downloads. Returns `None` when every
/// sample failed, when the session was cancelled, or when the shared
/// threshold shows this mirror cannot make the ranking window.
pub async fn probe(
    client: &Client,
    candidate: &MirrorCandidate,
    session: &ProbeSession,
    sample_files: &[String],
    config: &ProbeConfig,
) -> Option<MirrorResult> {
    let mut speeds: Vec<f64> = Vec::with_capacity(config.max_samples);
    let mut times: Vec<f64> = Vec::with_capacity(config.max_samples);
    let mut max_speed = 0.0f64;
    let mut last_error: Option<String> = None;

    for pass in 0..config.max_samples {
        let mut pass_ok = false;

        for path in sample_files {
            if session.is_cancelled() {
                return None;
            }

            let url = sample_url(&candidate.url, path);
            match fetch_sample(client, &url, session, config.stream_cap).await {
                Ok(Some(sample)) => {
                    if sample.speed_kbps > max_speed {
                        max_speed = sample.speed_kbps;
                    }
                    // Stale threshold reads are fine here; see ProbeSession.
                    if let Some(threshold) = session.threshold() {
                        if below_cutoff(max_speed, threshold, config.max_samples) {
                            return None;
                        }
                    }
                    speeds.push(sample.speed_kbps);
                    times.push(sample.elapsed_secs);
                    pass_ok = true;
                    break;
                }
                Ok(None) => return None, // cancelled mid-stream
                Err(msg) => {
                    last_error = Some(msg);
                }
            }
        }

        if pass_ok && pass + 1 < config.max_samples {
            tokio::time::sleep(config.sample_delay).await;
        }
    }

    if speeds.is_empty() {
        if let Some(msg) = last_error {
            eprintln!("probe failed for {}: {}", candidate.url, msg);
        }
        return None;
    }

    let mut result = MirrorResult::new(candidate);
    result.avg_speed = speeds.iter().sum::<f64>() / speeds.len() as f64;
    result.response_time = times.iter().sum::<f64>() / times.len() as f64;
    result.success_rate = speeds.len() as f64 / config.max_samples as f64;
    result.error_msg = last_error;
    Some(result)
}

struct Sample {
    speed_kbps: f64,
    elapsed_secs: f64,
}

/// One download attempt. `Ok(None)` means the session was cancelled while
/// streaming; transport problems come back as `Err(message)`.
async fn fetch_sample(
    client: &Client,
    url: &str,
    session: &ProbeSession,
    stream_cap: u64,
) -> Result<Option<Sample>, String> {
    let attempt_start = Instant::now();

    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("{} returned {}", url, response.status()));
    }

    // Time only the streaming phase so connection setup cost does not
    // dilute the throughput estimate.
    let mut stream = response.bytes_stream();
    let stream_start = Instant::now();
    let mut bytes: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| e.to_string())?;
        bytes += chunk.len() as u64;
        if session.is_cancelled() {
            return Ok(None);
        }
        if bytes >= stream_cap {
            break;
        }
    }

    let stream_secs = stream_start.elapsed().as_secs_f64();
    let speed_kbps = if stream_secs > 0.0 {
        bytes as f64 / stream_secs / 1024.0
    } else {
        0.0
    };

    Ok(Some(Sample {
        speed_kbps,
        elapsed_secs: attempt_start.elapsed().as_secs_f64(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_uses_threshold_over_sample_count() {
        // threshold 300, 3 samples -> cutoff is 100 KB/s
        assert!(below_cutoff(99.9, 300.0, 3));
        assert!(!below_cutoff(100.0, 300.0, 3));
        assert!(!below_cutoff(250.0, 300.0, 3));
    }

    #[test]
    fn sample_url_joins_without_double_slash() {
        assert_eq!(
            sample_url("http://mirror.example.com/debian/", "ls-lR.gz"),
            "http://mirror.example.com/debian/ls-lR.gz"
        );
        assert_eq!(
            sample_url("http://mirror.example.com/debian", "/ls-lR.gz"),
            "http://mirror.example.com/debian/ls-lR.gz"
        );
    }

    #[tokio::test]
    async fn cancelled_session_short_circuits_before_any_request() {
        let session = ProbeSession::new();
        session.cancel();

        let client = build_client(Duration::from_secs(1)).unwrap();
        // TEST-NET address; never contacted because the flag is checked first.
        let candidate = MirrorCandidate::new("XX", "http://192.0.2.1/debian/");
        let files = vec!["ls-lR.gz".to_string()];

        let start = Instant::now();
        let result = probe(&client, &candidate, &session, &files, &ProbeConfig::default()).await;
        assert!(result.is_none());
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn unreachable_mirror_yields_no_result() {
        let session = ProbeSession::new();
        let client = build_client(Duration::from_secs(1)).unwrap();
        // Port 1 on loopback: refused immediately on any sane host.
        let candidate = MirrorCandidate::new("XX", "http://127.0.0.1:1/debian/");
        let files = vec!["ls-lR.gz".to_string()];
        let config = ProbeConfig {
            max_samples: 2,
            sample_delay: Duration::from_millis(1),
            ..ProbeConfig::default()
        };

        let result = probe(&client, &candidate, &session, &files, &config).await;
        assert!(result.is_none());
    }
}
