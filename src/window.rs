use crate::session::ProbeSession;
use crate::types::MirrorResult;

/// Bounded top-N set of the best results seen so far, kept sorted
/// descending by `avg_speed`.
///
/// The controller owns one of these behind a mutex; every mutation happens
/// inside a single `offer` call. When the window is full, its lowest
/// surviving speed is published to the session as the early-abort
/// threshold for in-flight probes.
#[derive(Debug)]
pub struct RankingWindow {
    entries: Vec<MirrorResult>,
    capacity: usize,
}

impl RankingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.saturating_add(1)),
            capacity,
        }
    }

    /// Insert a completed probe result at its sorted position, evicting the
    /// slowest entry if the window overflows.
    pub fn offer(&mut self, result: MirrorResult, session: &ProbeSession) {
        let old_min = if self.entries.len() == self.capacity {
            self.entries.last().map(|e| e.avg_speed)
        } else {
            None
        };

        // Ties land after existing entries of equal speed.
        let idx = self
            .entries
            .partition_point(|e| e.avg_speed >= result.avg_speed);
        self.entries.insert(idx, result);

        if self.entries.len() > self.capacity {
            self.entries.pop();
        }

        if self.entries.len() == self.capacity {
            if let Some(new_min) = self.entries.last().map(|e| e.avg_speed) {
                // Skip the write when a full window's minimum is unchanged.
                if old_min != Some(new_min) {
                    session.set_threshold(new_min);
                }
            }
        }
    }

    pub fn results(&self) -> &[MirrorResult] {
        &self.entries
    }

    pub fn into_results(self) -> Vec<MirrorResult> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MirrorCandidate;

    fn result(speed: f64) -> MirrorResult {
        let mut r = MirrorResult::new(&MirrorCandidate::new(
            "XX",
            &format!("http://m{speed}.example.com/"),
        ));
        r.avg_speed = speed;
        r.response_time = 1.0;
        r.success_rate = 1.0;
        r
    }

    #[test]
    fn window_stays_bounded_and_sorted() {
        let session = ProbeSession::new();
        let mut window = RankingWindow::new(3);

        for speed in [50.0, 200.0, 10.0, 120.0, 80.0, 300.0] {
            window.offer(result(speed), &session);
            assert!(window.len() <= 3);
            let speeds: Vec<f64> = window.results().iter().map(|r| r.avg_speed).collect();
            let mut sorted = speeds.clone();
            sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
            assert_eq!(speeds, sorted);
        }

        let speeds: Vec<f64> = window.results().iter().map(|r| r.avg_speed).collect();
        assert_eq!(speeds, vec![300.0, 200.0, 120.0]);
    }

    #[test]
    fn threshold_tracks_minimum_once_full() {
        let session = ProbeSession::new();
        let mut window = RankingWindow::new(2);

        window.offer(result(100.0), &session);
        assert_eq!(session.threshold(), None);

        window.offer(result(40.0), &session);
        assert_eq!(session.threshold(), Some(40.0));

        // A slower result is evicted immediately, minimum is unchanged.
        window.offer(result(20.0), &session);
        assert_eq!(session.threshold(), Some(40.0));

        // A faster result pushes the minimum up.
        window.offer(result(70.0), &session);
        assert_eq!(session.threshold(), Some(70.0));
    }

    #[test]
    fn threshold_never_decreases() {
        let session = ProbeSession::new();
        let mut window = RankingWindow::new(3);
        let mut last = 0.0;

        for speed in [30.0, 90.0, 60.0, 10.0, 150.0, 45.0, 200.0] {
            window.offer(result(speed), &session);
            if let Some(t) = session.threshold() {
                assert!(t >= last);
                last = t;
            }
        }
    }

    #[test]
    fn ties_keep_both_entries_within_bound() {
        let session = ProbeSession::new();
        let mut window = RankingWindow::new(4);

        window.offer(result(80.0), &session);
        window.offer(result(80.0), &session);
        window.offer(result(80.0), &session);
        assert_eq!(window.len(), 3);
    }
}
