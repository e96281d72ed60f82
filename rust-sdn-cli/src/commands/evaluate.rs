//! Traffic pattern evaluation command

use anyhow::{Context, Result};
use log::info;
use rust_sdn_controller::{Controller, PerformanceReport};
use std::path::PathBuf;

use crate::commands::demo::load_controllers;
use crate::traffic::{TrafficGenerator, TrafficPattern};
use crate::utils::{print_header, Timer};

/// Per-pattern reports of one controller
#[derive(Debug)]
pub struct Evaluation {
    pub controller: String,
    pub reports: Vec<(TrafficPattern, PerformanceReport)>,
}

/// Run every traffic pattern through one controller, resetting the metrics
/// between patterns
pub fn evaluate_patterns(
    controller: &mut Controller,
    switch: &str,
    seed: Option<u64>,
) -> Result<Evaluation> {
    info!("Evaluating {} on {}", controller.name(), switch);

    let mut generator = TrafficGenerator::new(seed);
    let mut reports = Vec::with_capacity(TrafficPattern::ALL.len());

    for pattern in TrafficPattern::ALL {
        let _timer = Timer::new(&format!("{} pattern {}", controller.name(), pattern.name()));
        controller.reset_metrics();

        for packet in generator.pattern(pattern) {
            controller
                .process_packet(switch, packet)
                .with_context(|| format!("Failed to process {} traffic", pattern.name()))?;
        }

        reports.push((pattern, controller.performance_report()));
    }

    Ok(Evaluation {
        controller: controller.name().to_string(),
        reports,
    })
}

/// `{ controller: { pattern: report } }`
pub fn evaluations_json(evaluations: &[Evaluation]) -> Result<serde_json::Value> {
    let mut output = serde_json::Map::new();
    for evaluation in evaluations {
        let mut patterns = serde_json::Map::new();
        for (pattern, report) in &evaluation.reports {
            patterns.insert(pattern.name().to_string(), serde_json::to_value(report)?);
        }
        output.insert(evaluation.controller.clone(), serde_json::Value::Object(patterns));
    }
    Ok(serde_json::Value::Object(output))
}

pub fn print_evaluations(evaluations: &[Evaluation]) {
    for evaluation in evaluations {
        for (pattern, report) in &evaluation.reports {
            print_header(&format!(
                "{}: pattern {}",
                evaluation.controller,
                pattern.name()
            ));
            println!("{}", report);
        }
    }
}

/// Evaluate every controller of the scenario, or both reference controllers
pub fn run_evaluation(
    config: Option<PathBuf>,
    switch: String,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut evaluations = Vec::new();
    for mut controller in load_controllers(config.as_deref())? {
        evaluations.push(evaluate_patterns(&mut controller, &switch, seed)?);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&evaluations_json(&evaluations)?)?
        );
    } else {
        print_evaluations(&evaluations);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::demo::{openflow_controller, p4_controller};
    use rust_sdn_controller::ControllerType;

    #[test]
    fn test_metrics_reset_between_patterns() {
        let mut controller = openflow_controller().unwrap();
        let evaluation = evaluate_patterns(&mut controller, "sw1", Some(11)).unwrap();

        assert_eq!(evaluation.controller, "OpenFlow-Controller");
        assert_eq!(evaluation.reports.len(), 3);
        for (_, report) in &evaluation.reports {
            assert_eq!(report.packets_processed, 1000);
            assert_eq!(report.flow_table_hits + report.flow_table_misses, 1000);
        }
    }

    #[test]
    fn test_backup_pattern_hits_backup_rule() {
        let mut controller = openflow_controller().unwrap();
        let evaluation = evaluate_patterns(&mut controller, "sw1", Some(2)).unwrap();

        let (pattern, backup) = &evaluation.reports[2];
        assert_eq!(*pattern, TrafficPattern::Backup);
        assert_eq!(backup.flow_table_hits, 1000);
        assert_eq!(backup.flow_table_misses, 0);
    }

    #[test]
    fn test_p4_reports_keyed_by_controller() {
        let mut openflow = openflow_controller().unwrap();
        let mut p4 = p4_controller().unwrap();
        let evaluations = vec![
            evaluate_patterns(&mut openflow, "sw1", Some(4)).unwrap(),
            evaluate_patterns(&mut p4, "sw1", Some(4)).unwrap(),
        ];

        let value = evaluations_json(&evaluations).unwrap();
        for pattern in ["web_heavy", "mixed", "backup"] {
            assert_eq!(value["P4-Controller"][pattern]["controller_type"], "P4");
            assert_eq!(value["P4-Controller"][pattern]["packets_processed"], 1000);
            assert_eq!(
                value["OpenFlow-Controller"][pattern]["controller_type"],
                "OpenFlow"
            );
        }
        assert_eq!(evaluations[1].reports[0].1.controller_type, ControllerType::P4);
    }
}
