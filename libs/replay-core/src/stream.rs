use crate::clock::SystemClock;
use crate::error::ReplayError;
use crate::job::{StreamJob, StreamResult};
use crate::reader;
use crate::sender::{self, Protocol};
use crate::wire::CrlxEncoder;

// ═══════════════════════════════════════════════════════════════
//  Single job pipeline — validate → parse → send
// ═══════════════════════════════════════════════════════════════

/// Run one job's pipeline to completion: eager validation, then parse,
/// then paced emission. Blocking; call from a dedicated thread.
///
/// Returns the exact count of records sent, equal to the full sequence
/// length: any mid-stream error propagates instead of returning a
/// partial count.
pub fn execute_job(job: &StreamJob) -> Result<u64, ReplayError> {
    job.validate()?;
    let records = reader::read_records(&job.file)?;

    let sent = match job.protocol {
        Protocol::Tcp => {
            // validate() guarantees host is present
            let host = job.host.as_deref().unwrap_or_default();
            sender::send_tcp(host, job.port, &records, job.interval)?
        }
        Protocol::UdpBroadcast => {
            let addr = job.broadcast_addr.as_deref().unwrap_or_default();
            let encoder = CrlxEncoder::new(
                job.sensor_id.as_deref(),
                job.update_timestamp,
                job.raw_data_only,
                &SystemClock,
            );
            sender::send_udp(addr, job.port, true, &records, &encoder, job.interval)?
        }
        Protocol::UdpUnicast => {
            let addr = job.unicast_addr.as_deref().unwrap_or_default();
            let encoder = CrlxEncoder::new(
                job.sensor_id.as_deref(),
                job.update_timestamp,
                job.raw_data_only,
                &SystemClock,
            );
            sender::send_udp(addr, job.port, false, &records, &encoder, job.interval)?
        }
    };

    tracing::info!(stream = %job.name, protocol = %job.protocol, records = sent, "stream complete");
    Ok(sent)
}

// ═══════════════════════════════════════════════════════════════
//  Multi-stream orchestrator
// ═══════════════════════════════════════════════════════════════

/// Режим исполнения набора job'ов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Job'ы один за другим; суммарное время ≈ сумма длительностей.
    Sequential,
    /// Один blocking-поток на job, барьер wait-all в конце.
    Parallel,
}

/// Execute every job and aggregate one `StreamResult` per job.
///
/// A failed (or panicked) job is downgraded to a failed result in its own
/// slot and never aborts siblings. Output preserves the input job order
/// regardless of execution mode or completion order.
pub async fn run_jobs(jobs: Vec<StreamJob>, mode: ExecMode) -> Vec<StreamResult> {
    match mode {
        ExecMode::Sequential => {
            let mut results = Vec::with_capacity(jobs.len());
            for job in jobs {
                results.push(run_one(job).await);
            }
            results
        }
        ExecMode::Parallel => {
            let handles: Vec<_> = jobs
                .into_iter()
                .map(|job| {
                    let name = job.name.clone();
                    (name, tokio::task::spawn_blocking(move || run_blocking(job)))
                })
                .collect();

            // Await in spawn order; each job writes only its own slot
            let mut results = Vec::with_capacity(handles.len());
            for (name, handle) in handles {
                results.push(handle.await.unwrap_or_else(|e| {
                    StreamResult::failed(name, format!("stream task panicked: {e}"))
                }));
            }
            results
        }
    }
}

async fn run_one(job: StreamJob) -> StreamResult {
    let name = job.name.clone();
    tokio::task::spawn_blocking(move || run_blocking(job))
        .await
        .unwrap_or_else(|e| StreamResult::failed(name, format!("stream task panicked: {e}")))
}

/// Job boundary: the single place a propagated error is downgraded into
/// a recorded failure.
fn run_blocking(job: StreamJob) -> StreamResult {
    match execute_job(&job) {
        Ok(sent) => StreamResult::ok(job.name, sent),
        Err(e) => {
            tracing::warn!(stream = %job.name, error = %e, "stream failed");
            StreamResult::failed(job.name, e.to_string())
        }
    }
}
