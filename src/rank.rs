use crate::types::MirrorResult;

/// Composite score for the final ordering. Throughput weighted by
/// reliability, discounted by how long the mirror takes to answer.
fn score_of(result: &MirrorResult) -> f64 {
    if result.response_time <= 0.0 || !result.response_time.is_finite() {
        return 0.0;
    }
    result.avg_speed * result.success_rate / result.response_time
}

/// Fill in each result's score and return the list sorted best-first.
/// Pure post-processing; ties keep their incoming order.
pub fn rank(mut results: Vec<MirrorResult>) -> Vec<MirrorResult> {
    for result in &mut results {
        result.score = score_of(result);
    }
    // sort_by is stable, so equal scores stay in arrival order.
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results
}
