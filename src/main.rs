use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use netgraph::{CaptureConfig, PacketStream, StreamDriver};

/// Convert a packet capture into a host/connection graph as JSON.
#[derive(Debug, Parser)]
#[command(name = "netgraph", version)]
#[command(group = clap::ArgGroup::new("source").required(true))]
struct Cli {
    /// Pcap file to read
    #[arg(group = "source")]
    file: Option<PathBuf>,

    /// Live device to capture from instead of a file
    #[arg(short, long, group = "source")]
    interface: Option<String>,

    /// Snapshot length for live capture
    #[arg(long, default_value_t = CaptureConfig::default().snaplen)]
    snaplen: i32,

    /// Put the live device into promiscuous mode
    #[arg(long)]
    promiscuous: bool,

    /// Read timeout for live capture, in milliseconds
    #[arg(long, default_value_t = CaptureConfig::default().timeout_ms)]
    timeout_ms: i32,

    /// Write the JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CaptureConfig {
        snaplen: cli.snaplen,
        promiscuous: cli.promiscuous,
        timeout_ms: cli.timeout_ms,
    };

    let stream = if let Some(path) = &cli.file {
        PacketStream::from_file(path)?
    } else {
        let name = cli
            .interface
            .as_deref()
            .context("no capture source given")?;
        PacketStream::from_device(name, &config)?
    };

    let graph = StreamDriver::new().run(stream);
    info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "capture processed"
    );

    // One-element outer array around the graph object.
    let json = serde_json::to_string(std::slice::from_ref(&graph))?;
    match &cli.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("cannot write output to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
