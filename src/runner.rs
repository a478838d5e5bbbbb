use crate::catalog::Catalog;
use crate::error::Result;
use crate::probe::{self, ProbeConfig};
use crate::session::ProbeSession;
use crate::types::MirrorResult;
use crate::window::RankingWindow;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DEFAULT_WORKERS: usize = 20;
pub const DEFAULT_TOP_N: usize = 5;
/// Per-task wait while draining after an interrupt.
pub const DEFAULT_DRAIN_TIMEOUT_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub workers: usize,
    pub top_n: usize,
    pub timeout: Duration,
    pub probe: ProbeConfig,
    pub drain_timeout: Duration,
    /// Suppress the progress bar (tests, --json output).
    pub quiet: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            top_n: DEFAULT_TOP_N,
            timeout: Duration::from_secs(probe::DEFAULT_TIMEOUT_SECS),
            probe: ProbeConfig::default(),
            drain_timeout: Duration::from_secs(DEFAULT_DRAIN_TIMEOUT_SECS),
            quiet: false,
        }
    }
}

/// Drives one ranking run: fans the catalog out over a bounded worker
/// pool, funnels completed probes into the shared ranking window, and
/// owns the session whose cancellation flag an interrupt handler sets.
pub struct Runner {
    session: Arc<ProbeSession>,
    options: RunOptions,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Self {
            session: Arc::new(ProbeSession::new()),
            options,
        }
    }

    /// Handle for interrupt wiring: a Ctrl-C handler calls `cancel()` on
    /// this and the run winds down on its own.
    pub fn session(&self) -> Arc<ProbeSession> {
        self.session.clone()
    }

    /// Probe every catalog entry and return the surviving window,
    /// unranked. An empty catalog yields an empty list with no probes run.
    pub async fn run(&self, catalog: Catalog, sample_files: &[String]) -> Result<Vec<MirrorResult>> {
        let candidates = catalog.into_candidates();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let total = candidates.len() as u64;
        let client = probe::build_client(self.options.timeout)?;
        let window = Arc::new(Mutex::new(RankingWindow::new(self.options.top_n)));
        let sample_files: Arc<Vec<String>> = Arc::new(sample_files.to_vec());

        let pb = if self.options.quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("|| "),
            );
            pb.set_message("Probing mirrors...");
            pb
        };

        let probe_config = self.options.probe.clone();
        let tasks = candidates.into_iter().map(|candidate| {
            let client = client.clone();
            let session = self.session.clone();
            let window = window.clone();
            let sample_files = sample_files.clone();
            let config = probe_config.clone();
            let pb = pb.clone();
            async move {
                if !session.is_cancelled() {
                    if let Some(result) =
                        probe::probe(&client, &candidate, &session, &sample_files, &config).await
                    {
                        let mut window = window.lock().unwrap();
                        window.offer(result, &session);
                    }
                }
                // Progress counts every completion: success, rejection, error.
                let done = session.mark_completed();
                pb.set_position(done as u64);
            }
        });

        let mut in_flight = stream::iter(tasks).buffer_unordered(self.options.workers.max(1));

        loop {
            if self.session.is_cancelled() {
                // Lossy drain: give each remaining task a bounded wait, then
                // drop whatever is still stuck mid-request.
                match tokio::time::timeout(self.options.drain_timeout, in_flight.next()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => break,
                    Err(_) => break,
                }
            }
            match in_flight.next().await {
                Some(()) => continue,
                None => break,
            }
        }
        drop(in_flight);
        pb.finish_and_clear();

        let results = match Arc::try_unwrap(window) {
            Ok(mutex) => mutex.into_inner().unwrap().into_results(),
            // Abandoned tasks may still hold a handle; fall back to a copy.
            Err(shared) => shared.lock().unwrap().results().to_vec(),
        };

        // Backstop: offer never sees zero-speed results in practice, but the
        // final ranking must not either.
        Ok(results
            .into_iter()
            .filter(|r| r.success_rate > 0.0 && r.avg_speed > 0.0)
            .collect())
    }
}
