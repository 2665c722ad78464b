use std::str::FromStr;

use replay_core::{run_jobs, ExecMode, Protocol, StreamJob};

use super::config::{load_config, resolve_jobs};
use super::error::ReplayCliError;
use super::{ConfigArgs, StreamArgs};

// ═══════════════════════════════════════════════════════════════
//  Single stream
// ═══════════════════════════════════════════════════════════════

pub async fn run_stream(args: StreamArgs) -> Result<(), ReplayCliError> {
    let protocol = Protocol::from_str(&args.protocol)?;
    let job = StreamJob {
        name: args.file.clone(),
        file: args.file.into(),
        protocol,
        port: args.port,
        host: args.host,
        broadcast_addr: args.broadcast_addr,
        unicast_addr: args.unicast_addr,
        sensor_id: args.sensor_id,
        update_timestamp: !args.no_update_timestamp,
        raw_data_only: args.raw_data_only,
        interval: args.interval,
    };
    job.validate()?;

    println!("Streaming {} via {} on port {}", job.file.display(), job.protocol, job.port);
    match job.protocol {
        Protocol::Tcp => println!("  target  : {}", job.host.as_deref().unwrap_or_default()),
        Protocol::UdpBroadcast => {
            println!("  target  : {}", job.broadcast_addr.as_deref().unwrap_or_default())
        }
        Protocol::UdpUnicast => {
            println!("  target  : {}", job.unicast_addr.as_deref().unwrap_or_default())
        }
    }
    if let Some(ref id) = job.sensor_id {
        println!("  sensor  : {id}");
    }
    if !job.update_timestamp {
        println!("  ts      : original");
    }
    println!("  interval: {:.1}s", job.interval);
    println!();

    let count = tokio::task::spawn_blocking(move || replay_core::execute_job(&job))
        .await
        .map_err(|e| ReplayCliError::Config(format!("stream task panicked: {e}")))??;

    println!("Streamed {count} records");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════
//  Config file — multi-stream run
// ═══════════════════════════════════════════════════════════════

pub async fn run_config(args: ConfigArgs) -> Result<(), ReplayCliError> {
    let cfg = load_config(&args.file)?;
    let jobs = resolve_jobs(cfg)?;

    let mode = if args.sequential {
        ExecMode::Sequential
    } else {
        ExecMode::Parallel
    };
    tracing::info!(config = %args.file, streams = jobs.len(), ?mode, "starting streams");

    let results = run_jobs(jobs, mode).await;

    let mut total = 0u64;
    println!("Results by stream:");
    for r in &results {
        if r.success {
            println!("  {}: {} records", r.name, r.records_sent);
            total += r.records_sent;
        } else {
            println!(
                "  {}: FAILED ({})",
                r.name,
                r.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    println!("Total records streamed: {total}");

    Ok(())
}
