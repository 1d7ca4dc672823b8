//! DCC bitstream decoder - edge capture file to annotation stream
//!
//! Reads `position,level` transition lines from a capture file, runs them
//! through a decoding session, and writes one JSON annotation record per
//! line to stdout.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dcc_decode::{Config, DccSession, EdgeEvent};

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: dcc-decode <edge-file>")?;

    let config = Config::from_env();
    info!("Configuration:");
    info!("  Sample rate: {} Hz", config.sample_rate);
    info!("  Phase: {:?}", config.phase);
    info!("  Tolerance: {}", config.tolerance);
    info!("  Timing profile: {:?}", config.profile);

    let mut session = DccSession::new(config).context("invalid decoder configuration")?;

    let file = File::open(&path).with_context(|| format!("failed to open {path}"))?;
    let (tx, rx) = bounded::<EdgeEvent>(1024);

    // Reader thread: parse edge lines and feed the decode loop.
    let reader_handle = thread::spawn(move || {
        let reader = BufReader::new(file);
        let mut malformed = 0u64;
        for line in reader.lines().map_while(std::io::Result::ok) {
            match parse_edge_line(&line) {
                Some(edge) => {
                    if tx.send(edge).is_err() {
                        warn!("channel closed, stopping reader");
                        break;
                    }
                }
                None => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        malformed += 1;
                        debug!("skipping malformed line: {line}");
                    }
                }
            }
        }
        malformed
    });

    let mut annotations = 0u64;
    for edge in rx {
        for annotation in session.process_edge(edge) {
            println!("{}", serde_json::to_string(&annotation)?);
            annotations += 1;
        }
    }

    let malformed = reader_handle.join().unwrap_or(0);
    if malformed > 0 {
        warn!("{} malformed lines skipped", malformed);
    }

    let stats = session.stats();
    info!(
        "Decoding finished. Edges: {}, bits: {} ({} ambiguous), annotations: {}",
        stats.edges_processed, stats.bits_classified, stats.ambiguous_bits, annotations
    );
    let assembler = session.assembler_stats();
    info!(
        "Packets: {} preambles, {} finalized, {} short dropped, {} resyncs",
        assembler.preambles_detected,
        assembler.packets_finalized,
        assembler.short_packets_dropped,
        assembler.resyncs
    );

    Ok(())
}

/// Parse an edge capture line: `<sample_position>,<level>`.
/// Returns None for comments, blank lines, and anything malformed.
fn parse_edge_line(line: &str) -> Option<EdgeEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (position, level) = line.split_once(',')?;
    let position = position.trim().parse::<u64>().ok()?;
    let level = match level.trim() {
        "0" => false,
        "1" => true,
        _ => return None,
    };

    Some(EdgeEvent { position, level })
}
