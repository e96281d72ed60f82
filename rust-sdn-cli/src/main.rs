use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::{net::Ipv4Addr, path::PathBuf};

mod commands;
mod traffic;
mod utils;

/// SDN controller simulator
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the reference OpenFlow and P4 controllers and show their state
    Demo,

    /// Send a single packet through a switch
    Process(ProcessArgs),

    /// Drive generated traffic through one or more controllers
    Benchmark {
        /// Number of packets to generate
        #[clap(short, long, default_value = "1000")]
        count: usize,

        /// Number of concurrent senders per controller
        #[clap(short = 'j', long, default_value = "1")]
        concurrent: usize,

        /// Switch that receives the traffic
        #[clap(short, long, default_value = "sw1")]
        switch: String,

        /// Scenario file; the reference controllers are used when omitted
        #[clap(long)]
        config: Option<PathBuf>,

        /// Seed for the traffic generator
        #[clap(long)]
        seed: Option<u64>,

        /// Print reports as JSON
        #[clap(long)]
        json: bool,
    },

    /// Measure every controller against several traffic patterns
    Evaluate {
        /// Scenario file; the reference controllers are used when omitted
        #[clap(long)]
        config: Option<PathBuf>,

        /// Switch that receives the traffic
        #[clap(short, long, default_value = "sw1")]
        switch: String,

        /// Seed for the traffic generator
        #[clap(long)]
        seed: Option<u64>,

        /// Print reports as JSON
        #[clap(long)]
        json: bool,
    },

    /// Demo, benchmark and evaluation back to back on the same controllers
    Timeline {
        /// Number of packets for the benchmark phase
        #[clap(short, long, default_value = "1000")]
        count: usize,

        /// Number of concurrent senders per controller
        #[clap(short = 'j', long, default_value = "1")]
        concurrent: usize,

        /// Switch that receives the traffic
        #[clap(short, long, default_value = "sw1")]
        switch: String,

        /// Scenario file; the reference controllers are used when omitted
        #[clap(long)]
        config: Option<PathBuf>,

        /// Seed for the traffic generator
        #[clap(long)]
        seed: Option<u64>,

        /// Print all phases as one JSON document
        #[clap(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct ProcessArgs {
    /// Scenario file; the reference OpenFlow controller is used when omitted
    #[clap(long)]
    config: Option<PathBuf>,

    /// Switch that receives the packet
    #[clap(short, long, default_value = "sw1")]
    switch: String,

    #[clap(long)]
    src_ip: Option<Ipv4Addr>,

    #[clap(long)]
    dst_ip: Option<Ipv4Addr>,

    #[clap(long)]
    src_port: Option<u16>,

    #[clap(long)]
    dst_port: Option<u16>,

    /// TCP, UDP or ICMP
    #[clap(long)]
    protocol: Option<String>,

    /// Payload size in bytes
    #[clap(long)]
    size: Option<u32>,

    /// Number of times to send the packet
    #[clap(short, long, default_value = "1")]
    repeat: usize,

    /// Print the outcome as JSON
    #[clap(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "info" }
    )).init();

    match cli.command {
        Commands::Demo => {
            commands::demo::run_demo()?;
        }
        Commands::Process(args) => {
            commands::process::process_packet(args)?;
        }
        Commands::Benchmark { count, concurrent, switch, config, seed, json } => {
            commands::benchmark::run_benchmark(count, concurrent, switch, config, seed, json).await?;
        }
        Commands::Evaluate { config, switch, seed, json } => {
            commands::evaluate::run_evaluation(config, switch, seed, json)?;
        }
        Commands::Timeline { count, concurrent, switch, config, seed, json } => {
            commands::timeline::run_timeline(count, concurrent, switch, config, seed, json).await?;
        }
    }

    Ok(())
}
