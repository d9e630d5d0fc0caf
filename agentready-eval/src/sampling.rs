use crate::error::BenchmarkError;
use crate::runner::BenchmarkRunner;
use agentready_types::eval::DroppedSample;
use camino::Utf8Path;
use std::time::Duration;
use tracing::warn;

/// Scores kept and invocations dropped over one sampling round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    pub scores: Vec<f64>,
    pub dropped: Vec<DroppedSample>,
}

/// Runs the benchmark `iterations` times, sequentially, each bounded by
/// `timeout`. Timeouts and failed runs become dropped samples; only an
/// unavailable benchmark is an error.
pub async fn collect_samples(
    runner: &dyn BenchmarkRunner,
    workspace: &Utf8Path,
    iterations: u32,
    timeout: Duration,
) -> Result<Samples, BenchmarkError> {
    let mut out = Samples::default();
    for iteration in 0..iterations {
        let reason = match tokio::time::timeout(timeout, runner.run(workspace, iteration)).await {
            Ok(Ok(score)) if score.is_finite() => {
                out.scores.push(score);
                continue;
            }
            Ok(Ok(score)) => format!("non-finite score {score}"),
            Ok(Err(BenchmarkError::Failed(message))) => message,
            Ok(Err(e @ BenchmarkError::Unavailable(_))) => return Err(e),
            Err(_) => format!("timed out after {}s", timeout.as_secs_f64()),
        };
        warn!(
            benchmark = runner.name(),
            iteration,
            reason = %reason,
            "dropping benchmark sample"
        );
        out.dropped.push(DroppedSample { iteration, reason });
    }
    Ok(out)
}
