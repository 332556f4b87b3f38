//! Search counters. Observational only: nothing here influences the search.

use std::fmt;

use serde::Serialize;

use crate::store::StoreStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
/// Count / mean / min / max of a stream of samples.
pub struct RunningStats {
    pub count: u64,
    pub total: u64,
    pub min: u64,
    pub max: u64,
}

impl RunningStats {
    pub fn add(&mut self, value: u64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.total += value;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

impl fmt::Display for RunningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count={} mean={:.2} min={} max={}",
            self.count,
            self.mean(),
            self.min,
            self.max
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
/// Counters of one solve.
pub struct SearchStatistics {
    /// Non-terminal MID invocations.
    pub mid_calls: u64,
    pub terminal_nodes: u64,
    pub probe_checks: u64,
    pub unique_probes: u64,
    /// Stored parent differed from the live parent.
    pub transpositions: u64,
    pub bounds_corrections: u64,
    /// Corrections that stopped at the largest child phi instead of removing the full amount.
    pub clamped_corrections: u64,
    /// Path lengths of attached transposition records.
    pub transposition_lengths: RunningStats,
    /// Records consulted per aggregation.
    pub slots: RunningStats,
    pub elapsed_secs: f64,
}

impl SearchStatistics {
    pub fn mids_per_sec(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.mid_calls as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }

    /// Writes the statistics block to the log.
    pub fn log_summary(&self, bounds_correction: bool, unique_probes: bool, store: StoreStats) {
        log::info!("     MID calls: {}", self.mid_calls);
        log::info!("Terminal nodes: {}", self.terminal_nodes);
        if unique_probes {
            log::info!("  Probe checks: {}", self.probe_checks);
            let pct = if self.probe_checks > 0 {
                100 * self.unique_probes / self.probe_checks
            } else {
                0
            };
            log::info!(" Unique probes: {} ({pct}%)", self.unique_probes);
        }
        log::info!("Transpositions: {}", self.transpositions);
        if bounds_correction {
            log::info!("        Length: {}", self.transposition_lengths);
            log::info!("         Slots: {}", self.slots);
            log::info!(
                "   Corrections: {} ({} clamped)",
                self.bounds_corrections,
                self.clamped_corrections
            );
        }
        log::info!("  Elapsed time: {:.3}s", self.elapsed_secs);
        log::info!("      MIDs/sec: {:.0}", self.mids_per_sec());
        log::info!("{store}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_stats_track_extremes() {
        let mut s = RunningStats::default();
        s.add(4);
        s.add(2);
        s.add(6);
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 2);
        assert_eq!(s.max, 6);
        assert!((s.mean() - 4.0).abs() < 1e-9);
    }
}
