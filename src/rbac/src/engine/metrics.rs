//! Decision counters with Prometheus text export

use std::sync::atomic::{AtomicU64, Ordering};

use super::cache::CacheStats;

/// Engine metrics snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineMetrics {
    /// Total number of authorization decisions
    pub total_decisions: u64,

    /// Number of allowed decisions
    pub allowed_decisions: u64,

    /// Number of denied decisions
    pub denied_decisions: u64,

    /// Queries that referenced a role missing from the catalog
    pub unknown_role_errors: u64,
}

impl EngineMetrics {
    /// Calculate allow rate
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed_decisions + self.denied_decisions;
        if total == 0 {
            0.0
        } else {
            self.allowed_decisions as f64 / total as f64
        }
    }
}

/// Lock-free metrics collector
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total_decisions: AtomicU64,
    allowed_decisions: AtomicU64,
    denied_decisions: AtomicU64,
    unknown_role_errors: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an authorization decision
    pub fn record_decision(&self, allowed: bool) {
        self.total_decisions.fetch_add(1, Ordering::Relaxed);

        if allowed {
            self.allowed_decisions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.denied_decisions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_unknown_role(&self) {
        self.unknown_role_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> EngineMetrics {
        EngineMetrics {
            total_decisions: self.total_decisions.load(Ordering::Relaxed),
            allowed_decisions: self.allowed_decisions.load(Ordering::Relaxed),
            denied_decisions: self.denied_decisions.load(Ordering::Relaxed),
            unknown_role_errors: self.unknown_role_errors.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self, cache: &CacheStats) -> String {
        let metrics = self.snapshot();

        format!(
            r#"# HELP rbac_decisions_total Total number of authorization decisions
# TYPE rbac_decisions_total counter
rbac_decisions_total {}

# HELP rbac_allowed_total Number of allowed decisions
# TYPE rbac_allowed_total counter
rbac_allowed_total {}

# HELP rbac_denied_total Number of denied decisions
# TYPE rbac_denied_total counter
rbac_denied_total {}

# HELP rbac_unknown_role_total Queries referencing roles missing from the catalog
# TYPE rbac_unknown_role_total counter
rbac_unknown_role_total {}

# HELP rbac_cache_hits_total Effective permission cache hits
# TYPE rbac_cache_hits_total counter
rbac_cache_hits_total {}

# HELP rbac_cache_misses_total Effective permission cache misses
# TYPE rbac_cache_misses_total counter
rbac_cache_misses_total {}

# HELP rbac_cache_entries Cached role sets
# TYPE rbac_cache_entries gauge
rbac_cache_entries {}
"#,
            metrics.total_decisions,
            metrics.allowed_decisions,
            metrics.denied_decisions,
            metrics.unknown_role_errors,
            cache.hits,
            cache.misses,
            cache.entries,
        )
    }
}
