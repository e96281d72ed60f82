//! Utility functions for the SDN CLI

use log::info;
use rust_sdn_controller::Controller;
use std::time::{Duration, Instant};

/// Format a duration as a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    if total_secs == 0 {
        format!("{:.3}ms", duration.as_secs_f64() * 1_000.0)
    } else if total_secs < 60 {
        format!("{}.{:03}s", total_secs, duration.subsec_millis())
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// Simple timer for measuring operations
pub struct Timer {
    start: Instant,
    operation: String,
}

impl Timer {
    /// Create a new timer for the specified operation
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            start: Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "Operation '{}' completed in {}",
            self.operation,
            format_duration(self.elapsed())
        );
    }
}

/// Print a section header in the CLI output
pub fn print_header(title: &str) {
    let separator = "-".repeat(title.len());
    println!("\n{}", title);
    println!("{}", separator);
}

/// Print the topology and every flow table of a controller
pub fn print_controller_state(controller: &Controller) {
    print_header(&format!(
        "Network Topology ({})",
        controller.name()
    ));
    print!("{}", controller.topology());

    print_header(&format!("Flow Tables ({})", controller.name()));
    for table in controller.flow_tables() {
        println!("{}", table);
    }
}
