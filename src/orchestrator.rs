//! Batch orchestration
//!
//! Drives the swap pipeline in fixed-size sequential batches: no concurrency
//! within or across batches, a fixed pause between iterations (skipped after
//! the last), and failure absorption — a failed swap is logged and the run
//! moves on. After every batch the cumulative latency percentiles are
//! recomputed over all samples observed so far.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::RunConfig;
use crate::errors::SwapError;
use crate::event_log::EventSink;
use crate::stats::{LatencyTracker, RunSummary};
use crate::types::{SubmissionResult, SwapRequest};

/// Executes one swap attempt end to end. The seam between the batch loop and
/// the pipeline, so the loop's failure-tolerance contract is testable without
/// remote services.
#[async_trait(?Send)]
pub trait SwapExecutor {
    async fn execute(&self, request: &SwapRequest) -> Result<SubmissionResult, SwapError>;
}

/// Run phases. A run moves strictly forward: `Idle` until `run` is called,
/// `IteratingBatches` for the whole loop, `Completed` at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    IteratingBatches,
    Completed,
}

/// Sequential batch runner over a swap executor
pub struct BatchOrchestrator<E: SwapExecutor> {
    executor: E,
    request: SwapRequest,
    run_config: RunConfig,
    sink: Arc<dyn EventSink>,
    tracker: LatencyTracker,
    phase: RunPhase,
}

impl<E: SwapExecutor> BatchOrchestrator<E> {
    pub fn new(
        executor: E,
        request: SwapRequest,
        run_config: RunConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            executor,
            request,
            run_config,
            sink,
            tracker: LatencyTracker::new(),
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn sample_count(&self) -> usize {
        self.tracker.count()
    }

    /// Run the full batch loop to completion and return the aggregate
    /// statistics. Individual swap failures never abort the run.
    pub async fn run(&mut self) -> RunSummary {
        let iterations = self.run_config.iterations;
        let batch_size = self.run_config.batch_size;

        self.phase = RunPhase::IteratingBatches;
        info!(
            iterations = iterations,
            batch_size = batch_size,
            delay_ms = self.run_config.delay_ms,
            "Starting batch run"
        );
        self.sink.record_event(
            "run_start",
            &format!("{iterations} iterations x {batch_size} swaps"),
        );

        for iteration in 1..=iterations {
            info!(iteration = iteration, total = iterations, "Batch iteration");
            self.sink
                .record_event("iteration", &format!("{iteration}/{iterations}"));

            self.run_batch(iteration).await;

            let percentiles = self.tracker.percentiles();
            info!(
                samples = self.tracker.count(),
                p50_ms = percentiles.p50,
                p90_ms = percentiles.p90,
                p99_ms = percentiles.p99,
                "Cumulative latency percentiles"
            );
            self.sink.record_event(
                "percentile_snapshot",
                &format!(
                    "{} swaps: p50={}ms, p90={}ms, p99={}ms",
                    self.tracker.count(),
                    percentiles.p50,
                    percentiles.p90,
                    percentiles.p99
                ),
            );

            if iteration < iterations {
                tokio::time::sleep(Duration::from_millis(self.run_config.delay_ms)).await;
            }
        }

        self.phase = RunPhase::Completed;
        let summary = self.tracker.summary();
        info!(
            count = summary.count,
            mean_ms = summary.mean_ms,
            p50_ms = summary.percentiles.p50,
            p90_ms = summary.percentiles.p90,
            p99_ms = summary.percentiles.p99,
            min_ms = summary.min_ms,
            max_ms = summary.max_ms,
            "Batch run completed"
        );
        self.sink.record_event(
            "run_complete",
            &format!(
                "count={}, mean={}ms, p50={}ms, p90={}ms, p99={}ms, min={}ms, max={}ms",
                summary.count,
                summary.mean_ms,
                summary.percentiles.p50,
                summary.percentiles.p90,
                summary.percentiles.p99,
                summary.min_ms,
                summary.max_ms
            ),
        );
        summary
    }

    async fn run_batch(&mut self, iteration: u32) {
        let batch_start = Instant::now();
        let mut batch_durations: Vec<u64> = Vec::new();

        for swap_index in 1..=self.run_config.batch_size {
            let context_id = Uuid::new_v4();
            self.sink.record_event(
                "swap_start",
                &format!("iteration {iteration}, swap {swap_index}, context {context_id}"),
            );
            let started = Instant::now();

            match self.executor.execute(&self.request).await {
                Ok(result) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    self.tracker.record(duration_ms);
                    batch_durations.push(duration_ms);
                    info!(
                        context_id = %context_id,
                        transaction_id = %result.transaction_id,
                        request_id = result.request_id_or_na(),
                        duration_ms = duration_ms,
                        "Swap completed"
                    );
                    self.sink.record_event(
                        "swap_complete",
                        &format!(
                            "tx-id: {}, x-request-id: {}, duration: {}ms",
                            result.transaction_id,
                            result.request_id_or_na(),
                            duration_ms
                        ),
                    );
                }
                Err(e) => {
                    error!(
                        context_id = %context_id,
                        iteration = iteration,
                        swap = swap_index,
                        category = e.category(),
                        error = %e,
                        "Swap failed"
                    );
                    self.sink.record_event(
                        "swap_failed",
                        &format!("iteration {iteration}, swap {swap_index}: {e}"),
                    );
                }
            }
        }

        let elapsed_ms = batch_start.elapsed().as_millis() as u64;
        let durations = batch_durations
            .iter()
            .map(|d| format!("{d}ms"))
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            iteration = iteration,
            elapsed_ms = elapsed_ms,
            durations = %durations,
            "Batch completed"
        );
        self.sink.record_event(
            "batch_complete",
            &format!("completed in {elapsed_ms}ms (individual durations: {durations})"),
        );
    }
}
