//! Full run over the same controllers: demo, benchmark, then evaluation
//!
//! The controllers are shared across phases, so the evaluation starts from
//! the flow tables the benchmark grew.

use anyhow::Result;
use log::info;
use rust_sdn_controller::SharedController;
use std::{path::PathBuf, sync::Arc};

use crate::commands::benchmark::benchmark_controllers;
use crate::commands::demo::load_controllers;
use crate::commands::evaluate::{evaluate_patterns, evaluations_json, print_evaluations};
use crate::traffic::TrafficGenerator;
use crate::utils::{print_controller_state, print_header};

/// Phase outputs of one timeline run
pub struct Timeline {
    pub benchmark: Vec<serde_json::Value>,
    pub evaluation: serde_json::Value,
}

pub async fn run_phases(
    controllers: &[SharedController],
    count: usize,
    concurrent: usize,
    switch: &str,
    seed: Option<u64>,
    json: bool,
) -> Result<Timeline> {
    if !json {
        print_header("Phase 1: reference architectures");
        for shared in controllers {
            shared.with(|c| print_controller_state(c)).await;
        }
        print_header("Phase 2: benchmark");
    }

    let traffic = Arc::new(TrafficGenerator::new(seed).benchmark_mix(count));
    info!(
        "Benchmarking {} controllers with {} packets",
        controllers.len(),
        traffic.len()
    );
    let benchmark = benchmark_controllers(controllers, switch, traffic, concurrent, json).await?;

    let mut evaluations = Vec::with_capacity(controllers.len());
    for shared in controllers {
        evaluations.push(shared.with(|c| evaluate_patterns(c, switch, seed)).await?);
    }

    if !json {
        print_header("Phase 3: traffic pattern evaluation");
        print_evaluations(&evaluations);
    }

    Ok(Timeline {
        benchmark,
        evaluation: evaluations_json(&evaluations)?,
    })
}

pub async fn run_timeline(
    count: usize,
    concurrent: usize,
    switch: String,
    config: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let controllers: Vec<SharedController> = load_controllers(config.as_deref())?
        .into_iter()
        .map(SharedController::new)
        .collect();

    let timeline = run_phases(&controllers, count, concurrent, &switch, seed, json).await?;

    if json {
        let output = serde_json::json!({
            "benchmark": timeline.benchmark,
            "evaluation": timeline.evaluation,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
