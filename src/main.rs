//! docnode CLI - Command-line tool for packed fragment node buffers.
//!
//! Decodes, summarises and verifies buffers produced by the `docnode` codec.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use docnode::{DecodeLimits, NodeList, NodeType, RawNodes, DEFAULT_MAX_DEPTH};

/// docnode - packed fragment tree inspection tool
#[derive(Parser)]
#[command(name = "docnode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum node nesting depth accepted when decoding
    #[arg(long, global = true, env = "DOCNODE_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log decode diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a packed buffer and print it as XML
    Dump {
        /// Packed node list file
        #[arg(short, long)]
        input: PathBuf,

        /// Output XML file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show node counts, depth and a per-type histogram
    Stats {
        /// Packed node list file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List top-level nodes without decoding their bodies
    List {
        /// Packed node list file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Fully decode one or more packed buffers
    Verify {
        /// Packed node list files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let limits = DecodeLimits::with_max_depth(cli.max_depth);

    match cli.command {
        Commands::Dump { input, output } => {
            cmd_dump(&input, output.as_deref(), &limits)?;
        }
        Commands::Stats { input } => {
            cmd_stats(&input, &limits)?;
        }
        Commands::List { input } => {
            cmd_list(&input)?;
        }
        Commands::Verify { files } => {
            cmd_verify(&files, &limits)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_dump(input: &Path, output: Option<&Path>, limits: &DecodeLimits) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let (list, consumed) =
        NodeList::unpack_with(&data, limits).context("Failed to unpack node list")?;
    debug!(consumed, file_len = data.len(), "decoded {}", input.display());

    let xml = list.to_xml_string().context("Failed to render XML")?;
    match output {
        Some(path) => {
            fs::write(path, xml).context("Failed to write output file")?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", xml),
    }

    Ok(())
}

fn cmd_stats(input: &Path, limits: &DecodeLimits) -> Result<()> {
    let start = Instant::now();
    let data = fs::read(input).context("Failed to read input file")?;
    let (list, consumed) =
        NodeList::unpack_with(&data, limits).context("Failed to unpack node list")?;

    println!("Decoded {} in {:?}", input.display(), start.elapsed());
    println!("  Bytes:     {} of {} consumed", consumed, data.len());
    println!("  Top-level: {}", list.len());
    println!("  Nodes:     {}", list.count());
    println!("  Depth:     {}", list.depth());

    let mut histogram: HashMap<NodeType, usize> = HashMap::new();
    let mut attributes = 0;
    let mut payload = 0;
    for node in list.walk() {
        *histogram.entry(node.node_type()).or_default() += 1;
        attributes += node.attributes().len();
        payload += node.data().len();
    }
    println!("  Attributes: {}", attributes);
    println!("  Data bytes: {}", payload);

    let mut types: Vec<_> = histogram.into_iter().collect();
    types.sort_by_key(|(node_type, _)| node_type.raw());
    println!("\nBy type:");
    for (node_type, count) in types {
        println!("  {:>4} {:<16} {}", node_type.raw(), node_type.to_string(), count);
    }

    Ok(())
}

fn cmd_list(input: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let mut nodes = RawNodes::new(&data).context("Failed to read node count")?;

    println!("{:>10} {:>10} {:>8} {}", "OFFSET", "LENGTH", "CHILDREN", "TYPE");

    let mut count = 0;
    loop {
        let offset = nodes.offset();
        let Some(raw) = nodes.next() else {
            break;
        };
        let raw = raw.with_context(|| format!("Invalid node at offset {}", offset))?;
        let children = raw
            .children()
            .with_context(|| format!("Invalid node body at offset {}", offset))?
            .remaining();

        println!("{:>10} {:>10} {:>8} {}", offset, raw.len(), children, raw.node_type());
        count += 1;
    }

    println!("\nTotal: {} nodes, {} bytes", count, nodes.offset());

    Ok(())
}

fn cmd_verify(files: &[PathBuf], limits: &DecodeLimits) -> Result<()> {
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let result = verify_file(path, limits);
            pb.inc(1);
            (path, result)
        })
        .collect();
    pb.finish_with_message("Done");

    let mut failed = 0;
    let mut nodes = 0;
    for (path, result) in &results {
        match result {
            Ok(count) => nodes += count,
            Err(e) => {
                failed += 1;
                println!("FAIL {}: {:#}", path.display(), e);
            }
        }
    }

    println!(
        "Verified {} files ({} nodes) in {:?}, {} failed",
        files.len(),
        nodes,
        start.elapsed(),
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} of {} files failed verification", failed, files.len());
    }

    Ok(())
}

/// Decode a whole file, returning the number of nodes in it.
fn verify_file(path: &Path, limits: &DecodeLimits) -> Result<usize> {
    let data = fs::read(path).context("Failed to read file")?;
    let (list, _) = NodeList::unpack_with(&data, limits)
        .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;
    Ok(list.count())
}
