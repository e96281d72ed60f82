//! Single packet processing command

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rust_sdn_common::{Packet, Protocol};

use crate::commands::demo::load_controllers;
use crate::utils::print_header;
use crate::ProcessArgs;

fn build_packet(args: &ProcessArgs) -> Result<Packet> {
    let protocol = args
        .protocol
        .as_deref()
        .map(str::parse::<Protocol>)
        .transpose()
        .context("Invalid --protocol")?;

    Ok(Packet {
        src_ip: args.src_ip,
        dst_ip: args.dst_ip,
        src_port: args.src_port,
        dst_port: args.dst_port,
        protocol,
        size: args.size,
        qos_priority: None,
    })
}

/// Send a packet through the first controller of the scenario
pub fn process_packet(args: ProcessArgs) -> Result<()> {
    let packet = build_packet(&args)?;
    let mut controller = load_controllers(args.config.as_deref())?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Scenario defines no controller"))?;

    info!(
        "Processing {} on {} via {} ({} times)",
        packet,
        args.switch,
        controller.name(),
        args.repeat
    );

    let mut outcomes = Vec::with_capacity(args.repeat);
    for i in 0..args.repeat {
        let outcome = controller
            .process_packet(&args.switch, packet.clone())
            .with_context(|| format!("Failed to process packet on {}", args.switch))?;
        debug!("Packet {}: {}", i + 1, outcome);
        outcomes.push(outcome);
    }

    let table = controller
        .flow_table(&args.switch)
        .ok_or_else(|| anyhow!("No flow table for {}", args.switch))?;

    if args.json {
        let output = serde_json::json!({
            "packet": packet,
            "outcomes": outcomes,
            "flow_table": table.dump(),
            "report": controller.performance_report(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_header(&format!("Packet {}", packet));
    for (i, outcome) in outcomes.iter().enumerate() {
        println!("  #{}: {}", i + 1, outcome);
    }

    print_header("Flow Table");
    print!("{}", table);

    println!();
    println!("{}", controller.performance_report());

    Ok(())
}
