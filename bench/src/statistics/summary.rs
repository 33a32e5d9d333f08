use crate::benchmark::BenchmarkOutcome;
use human_repr::HumanDuration;
use std::fmt::{Display, Formatter};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSummary {
    pub calls: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub min_latency: Option<Duration>,
    pub max_latency: Option<Duration>,
    pub mean_latency: Option<Duration>,
    pub total_elapsed: Duration,
}

impl BenchmarkSummary {
    pub fn from_outcome(outcome: &BenchmarkOutcome) -> Self {
        let latencies: Vec<Duration> = outcome
            .table
            .records()
            .map(|record| record.elapsed)
            .collect();
        let mean_latency = match u32::try_from(latencies.len()) {
            Ok(0) | Err(_) => None,
            Ok(count) => Some(latencies.iter().sum::<Duration>() / count),
        };

        Self {
            calls: outcome.table.len(),
            succeeded: latencies.len(),
            failed: outcome.table.failed(),
            min_latency: latencies.iter().min().copied(),
            max_latency: latencies.iter().max().copied(),
            mean_latency,
            total_elapsed: outcome.total_elapsed,
        }
    }
}

fn human(latency: Option<Duration>) -> String {
    latency
        .map(|latency| latency.as_secs_f64().human_duration().to_string())
        .unwrap_or_else(|| "n/a".to_owned())
}

impl Display for BenchmarkSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {} for {} calls, succeeded: {}, failed: {}, latency min: {}, max: {}, mean: {}",
            self.total_elapsed.as_secs_f64().human_duration(),
            self.calls,
            self.succeeded,
            self.failed,
            human(self.min_latency),
            human(self.max_latency),
            human(self.mean_latency),
        )
    }
}
