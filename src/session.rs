use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Shared state for one ranking run.
///
/// Probes only ever read from here; the controller sets the cancellation
/// flag and the ranking window publishes the early-abort threshold. Reads
/// are Relaxed on purpose: a probe acting on a slightly stale threshold is
/// part of the design (it may waste one attempt or abort one candidate too
/// eagerly, never corrupt state), and keeping the reads unsynchronized is
/// what lets probes run without contending on the window lock.
#[derive(Debug, Default)]
pub struct ProbeSession {
    cancelled: AtomicBool,
    /// Lowest surviving speed of a full ranking window, KB/s, as f64 bits.
    /// Zero means "window not full yet, no threshold".
    threshold_bits: AtomicU64,
    completed: AtomicUsize,
}

impl ProbeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write-once: once set, the flag is never cleared for this session.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Publish a new early-abort threshold. Called only from inside the
    /// window's critical section, so the whole f64 is replaced atomically.
    pub fn set_threshold(&self, kb_per_sec: f64) {
        self.threshold_bits
            .store(kb_per_sec.to_bits(), Ordering::Relaxed);
    }

    /// Current threshold, if the window has filled up. Possibly stale.
    pub fn threshold(&self) -> Option<f64> {
        let bits = self.threshold_bits.load(Ordering::Relaxed);
        let value = f64::from_bits(bits);
        if value > 0.0 {
            Some(value)
        } else {
            None
        }
    }

    /// Count one finished probe task and return the new total.
    pub fn mark_completed(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }
}
