//! Benchmarking command implementation for the SDN CLI

use anyhow::{Context, Result};
use futures::future::join_all;
use log::{debug, info, warn};
use rust_sdn_common::Packet;
use rust_sdn_controller::{PerformanceReport, SharedController};
use rust_sdn_flow::ActionOutcome;
use serde::Serialize;
use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::commands::demo::load_controllers;
use crate::traffic::TrafficGenerator;
use crate::utils::{format_duration, print_header, Timer};

/// Outcome tallies for one controller run
#[derive(Debug, Default, Clone, Serialize)]
struct BenchmarkResults {
    packets_sent: usize,
    forwarded: usize,
    dropped: usize,
    modified: usize,
    errors: usize,
    total_time_ms: u64,
}

impl BenchmarkResults {
    fn throughput_pps(&self) -> f64 {
        if self.total_time_ms == 0 {
            return 0.0;
        }
        self.packets_sent as f64 * 1000.0 / self.total_time_ms as f64
    }
}

/// Run the benchmark with the specified parameters
pub async fn run_benchmark(
    count: usize,
    concurrent: usize,
    switch: String,
    config: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    info!(
        "Running benchmark: count={}, concurrent={}, switch={}",
        count, concurrent, switch
    );

    let concurrent = concurrent.max(1);
    let controllers = load_controllers(config.as_deref())?;
    let traffic = Arc::new(TrafficGenerator::new(seed).benchmark_mix(count));

    if !json {
        print_header("SDN controller benchmark");
        println!("Parameters:");
        println!("  Packets: {}", traffic.len());
        println!("  Concurrent senders: {}", concurrent);
        println!("  Switch: {}", switch);
        println!("  Controllers: {}", controllers.len());
    }

    let shared: Vec<SharedController> = controllers
        .into_iter()
        .map(SharedController::new)
        .collect();
    let summaries = benchmark_controllers(&shared, &switch, traffic, concurrent, json).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    }

    Ok(())
}

/// Drive the same traffic through each controller in turn; returns one JSON
/// summary per controller and prints the text results unless `json` is set
pub async fn benchmark_controllers(
    controllers: &[SharedController],
    switch: &str,
    traffic: Arc<Vec<Packet>>,
    concurrent: usize,
    json: bool,
) -> Result<Vec<serde_json::Value>> {
    let mut summaries = Vec::with_capacity(controllers.len());
    for shared in controllers {
        let results = run_one(shared, switch, Arc::clone(&traffic), concurrent.max(1)).await?;
        let report = shared.performance_report().await;

        if !json {
            print_results(&report, &results);
        }
        summaries.push(serde_json::json!({
            "results": results,
            "throughput_pps": results.throughput_pps(),
            "report": report,
        }));
    }
    Ok(summaries)
}

async fn run_one(
    controller: &SharedController,
    switch: &str,
    traffic: Arc<Vec<Packet>>,
    concurrent: usize,
) -> Result<BenchmarkResults> {
    let name = controller.with(|c| c.name().to_string()).await;
    let _timer = Timer::new(&format!("benchmark {}", name));

    let count = traffic.len();
    let start_time = Instant::now();
    let results = Arc::new(Mutex::new(BenchmarkResults {
        packets_sent: count,
        ..Default::default()
    }));

    // Split the traffic into batches
    let batch_size = std::cmp::max(1, count / concurrent);
    let mut tasks = Vec::new();

    for batch_index in 0..concurrent {
        let start_index = batch_index * batch_size;
        let end_index = if batch_index == concurrent - 1 {
            count
        } else {
            start_index + batch_size
        };

        if start_index >= count {
            break;
        }

        let controller_clone = controller.clone();
        let traffic_clone = Arc::clone(&traffic);
        let results_clone = Arc::clone(&results);
        let switch_clone = switch.to_string();

        let task = tokio::spawn(async move {
            for packet in &traffic_clone[start_index..end_index] {
                let outcome = controller_clone
                    .process_packet(&switch_clone, packet.clone())
                    .await;

                let mut results = results_clone.lock().await;
                match outcome {
                    Ok(outcome) if outcome.is_dropped() => results.dropped += 1,
                    Ok(ActionOutcome::Modified { .. }) => results.modified += 1,
                    Ok(_) => results.forwarded += 1,
                    Err(e) => {
                        debug!("Packet {} failed: {}", packet, e);
                        results.errors += 1;
                    }
                }
            }
        });

        tasks.push(task);
    }

    for joined in join_all(tasks).await {
        joined.context("Benchmark task panicked")?;
    }

    let mut results = results.lock().await.clone();
    results.total_time_ms = start_time.elapsed().as_millis() as u64;

    if results.errors > 0 {
        warn!("{} of {} packets failed on {}", results.errors, count, name);
    }

    Ok(results)
}

fn print_results(report: &PerformanceReport, results: &BenchmarkResults) {
    print_header(&format!("Results for {}", report.controller));
    println!("  Forwarded: {}", results.forwarded);
    println!("  Modified: {}", results.modified);
    println!("  Dropped: {}", results.dropped);
    println!("  Errors: {}", results.errors);
    println!(
        "  Total time: {}",
        format_duration(Duration::from_millis(results.total_time_ms))
    );
    println!("  Throughput: {:.2} packets/s", results.throughput_pps());
    println!();
    println!("{}", report);
}
