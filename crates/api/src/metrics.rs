use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    partial_results: AtomicUsize,
    cache_hits: AtomicUsize,

    // Timing (in microseconds)
    total_normalize_time_us: AtomicU64,

    // Counts
    total_nodes: AtomicUsize,
    total_edges: AtomicUsize,
    total_sources: AtomicUsize,
}

/// What one successful normalization produced.
pub struct NormalizeOutcome {
    pub nodes: usize,
    pub edges: usize,
    pub sources: usize,
    /// Graph dropped but citations kept
    pub partial: bool,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            partial_results: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            total_normalize_time_us: AtomicU64::new(0),
            total_nodes: AtomicUsize::new(0),
            total_edges: AtomicUsize::new(0),
            total_sources: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_normalize(&self, duration: std::time::Duration, outcome: &NormalizeOutcome) {
        self.total_normalize_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_nodes.fetch_add(outcome.nodes, Ordering::Relaxed);
        self.total_edges.fetch_add(outcome.edges, Ordering::Relaxed);
        self.total_sources.fetch_add(outcome.sources, Ordering::Relaxed);
        if outcome.partial {
            self.partial_results.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let total_us = self.total_normalize_time_us.load(Ordering::Relaxed) as f64;
        let normalized = successful.saturating_sub(cache_hits) as f64;

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: successful,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            partial_results: self.partial_results.load(Ordering::Relaxed),
            cache_hits,
            avg_normalize_time_ms: if normalized > 0.0 {
                total_us / normalized / 1000.0 // Convert to ms
            } else {
                0.0
            },
            total_nodes: self.total_nodes.load(Ordering::Relaxed),
            total_edges: self.total_edges.load(Ordering::Relaxed),
            total_sources: self.total_sources.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub partial_results: usize,
    pub cache_hits: usize,
    pub avg_normalize_time_ms: f64,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_sources: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}
