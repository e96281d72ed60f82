//! Performance summaries handed to reporting tools.

use rust_sdn_common::metrics::PerformanceMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ControllerType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub controller: String,
    pub controller_type: ControllerType,
    pub packets_processed: usize,
    pub avg_processing_time_ms: f64,
    /// Upper bound of the latency bucket holding the 99th percentile.
    pub p99_latency_us: Option<u64>,
    pub flow_table_hits: u64,
    pub flow_table_misses: u64,
    pub controller_requests: u64,
    pub rules_installed: u64,
    pub packets_dropped: u64,
    /// Hits as a percentage of hits plus misses.
    pub hit_ratio: f64,
}

impl PerformanceReport {
    pub fn from_metrics(
        controller: &str,
        controller_type: ControllerType,
        metrics: &PerformanceMetrics,
    ) -> Self {
        Self {
            controller: controller.to_string(),
            controller_type,
            packets_processed: metrics.samples(),
            avg_processing_time_ms: metrics.average_processing_time_ms(),
            p99_latency_us: metrics.processing_latency_us.quantile_upper_bound(0.99),
            flow_table_hits: metrics.flow_table_hits.value(),
            flow_table_misses: metrics.flow_table_misses.value(),
            controller_requests: metrics.controller_requests.value(),
            rules_installed: metrics.rules_installed.value(),
            packets_dropped: metrics.packets_dropped.value(),
            hit_ratio: metrics.hit_ratio(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.packets_processed > 0
    }
}

impl fmt::Display for PerformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_data() {
            return f.write_str("No performance data available yet");
        }

        let title = format!(
            "Performance Report for {} ({}):",
            self.controller, self.controller_type
        );
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        writeln!(f, "Packets processed: {}", self.packets_processed)?;
        writeln!(
            f,
            "Average packet processing time: {:.4} ms",
            self.avg_processing_time_ms
        )?;
        match self.p99_latency_us {
            Some(us) => writeln!(f, "p99 processing time: <= {} us", us)?,
            None => writeln!(f, "p99 processing time: > histogram range")?,
        }
        writeln!(f, "Flow table hits: {}", self.flow_table_hits)?;
        writeln!(f, "Flow table misses: {}", self.flow_table_misses)?;
        writeln!(f, "Controller requests: {}", self.controller_requests)?;
        writeln!(f, "Rules installed: {}", self.rules_installed)?;
        writeln!(f, "Packets dropped: {}", self.packets_dropped)?;
        write!(f, "Hit ratio: {:.2}%", self.hit_ratio)
    }
}
