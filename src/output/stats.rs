//! Run statistics
//!
//! The dispatch loop owns one [`CrawlStats`] per run and records every task
//! outcome into it as tasks are joined.

use crate::crawler::FetchStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Why the dispatch loop stopped launching tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Frontier empty and no tasks in flight
    Drained,
    /// Stop requested through the run's stop handle
    Stopped,
    /// Configured page limit reached
    MaxPages,
    /// Configured run duration elapsed
    MaxDuration,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drained => "drained",
            Self::Stopped => "stopped",
            Self::MaxPages => "max_pages",
            Self::MaxDuration => "max_duration",
        }
    }
}

/// Counters collected over one crawl run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlStats {
    /// URLs dispatched for fetch
    pub dispatched: u64,
    pub succeeded: u64,
    pub redirected: u64,
    pub disallowed: u64,
    pub skipped: u64,
    pub client_errors: u64,
    /// HTTP error responses keyed by status code
    pub http_errors: BTreeMap<u16, u64>,
    /// Tasks that panicked
    pub task_faults: u64,
    /// Tasks aborted after the drain timeout
    pub abandoned: u64,
    /// Sum of the found-links list lengths
    pub links_found: u64,
    /// Highest number of tasks in flight at once
    pub peak_in_flight: usize,
    /// Wall time of the run in milliseconds
    pub elapsed_ms: u64,
}

impl CrawlStats {
    /// Records the outcome of one completed task
    pub fn record(&mut self, status: FetchStatus) {
        match status {
            FetchStatus::Success => self.succeeded += 1,
            FetchStatus::Redirect => self.redirected += 1,
            FetchStatus::Disallowed => self.disallowed += 1,
            FetchStatus::Skipped => self.skipped += 1,
            FetchStatus::ClientError => self.client_errors += 1,
            FetchStatus::HttpError(code) => *self.http_errors.entry(code).or_default() += 1,
        }
    }

    pub fn observe_in_flight(&mut self, in_flight: usize) {
        self.peak_in_flight = self.peak_in_flight.max(in_flight);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis().try_into().unwrap_or(u64::MAX);
    }

    pub fn http_error_total(&self) -> u64 {
        self.http_errors.values().sum()
    }

    /// Tasks that finished, panicked, or were abandoned
    pub fn completed(&self) -> u64 {
        self.succeeded
            + self.redirected
            + self.disallowed
            + self.skipped
            + self.client_errors
            + self.http_error_total()
            + self.task_faults
            + self.abandoned
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages dispatched: {}", stats.dispatched);
    println!("  Links found: {}", stats.links_found);
    println!("  Peak in flight: {}", stats.peak_in_flight);
    println!("  Elapsed: {:.2}s", stats.elapsed().as_secs_f64());
    println!();

    println!("Outcomes:");
    let outcomes = [
        ("success", stats.succeeded),
        ("redirect", stats.redirected),
        ("disallowed", stats.disallowed),
        ("skipped", stats.skipped),
        ("client_error", stats.client_errors),
        ("http_error", stats.http_error_total()),
        ("task_fault", stats.task_faults),
        ("abandoned", stats.abandoned),
    ];
    for (label, count) in outcomes.iter().filter(|(_, count)| *count > 0) {
        let percentage = if stats.dispatched > 0 {
            (*count as f64 / stats.dispatched as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", label, count, percentage);
    }
    println!();

    if !stats.http_errors.is_empty() {
        println!("HTTP Errors:");
        let mut codes: Vec<_> = stats.http_errors.iter().collect();
        codes.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (code, count) in codes {
            println!("  {}: {}", code, count);
        }
        println!();
    }

    let rate = if stats.elapsed_ms > 0 {
        stats.dispatched as f64 / stats.elapsed().as_secs_f64()
    } else {
        0.0
    };
    println!("Throughput: {:.2} pages/sec", rate);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut stats = CrawlStats::default();
        stats.record(FetchStatus::Success);
        stats.record(FetchStatus::Success);
        stats.record(FetchStatus::Disallowed);
        stats.record(FetchStatus::HttpError(404));
        stats.record(FetchStatus::HttpError(404));
        stats.record(FetchStatus::HttpError(503));

        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.disallowed, 1);
        assert_eq!(stats.http_errors.get(&404), Some(&2));
        assert_eq!(stats.http_error_total(), 3);
        assert_eq!(stats.completed(), 6);
    }

    #[test]
    fn test_peak_in_flight_keeps_maximum() {
        let mut stats = CrawlStats::default();
        stats.observe_in_flight(3);
        stats.observe_in_flight(5);
        stats.observe_in_flight(2);
        assert_eq!(stats.peak_in_flight, 5);
    }

    #[test]
    fn test_elapsed_round_trip() {
        let mut stats = CrawlStats::default();
        stats.set_elapsed(Duration::from_millis(1500));
        assert_eq!(stats.elapsed_ms, 1500);
        assert_eq!(stats.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_stop_reason_serializes_snake_case() {
        let json = serde_json::to_string(&StopReason::MaxPages).unwrap();
        assert_eq!(json, "\"max_pages\"");
        assert_eq!(StopReason::MaxDuration.as_str(), "max_duration");
    }
}
