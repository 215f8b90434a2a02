//! Full-run orchestrator properties: a mid-run swap failure is absorbed, all
//! iterations complete, and the sample sequence reflects only completed
//! swaps.

use std::cell::Cell;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use swapbot::config::RunConfig;
use swapbot::errors::SwapError;
use swapbot::event_log::EventSink;
use swapbot::orchestrator::{BatchOrchestrator, RunPhase, SwapExecutor};
use swapbot::types::{BroadcastMode, SubmissionResult, SwapRequest};

/// Executor that fails on exactly one global attempt number
struct FailOnceExecutor {
    attempts: Cell<u32>,
    fail_on_attempt: u32,
}

#[async_trait(?Send)]
impl SwapExecutor for FailOnceExecutor {
    async fn execute(&self, _request: &SwapRequest) -> Result<SubmissionResult, SwapError> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt == self.fail_on_attempt {
            return Err(SwapError::HttpStatus {
                status: 503,
                body: r#"{"error":"service unavailable"}"#.to_string(),
            });
        }
        Ok(SubmissionResult {
            transaction_id: format!("tx-{attempt}"),
            request_id: Some(format!("req-{attempt}")),
        })
    }
}

/// Sink capturing every event for assertions
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(String, String)>>,
}

impl EventSink for RecordingSink {
    fn record_event(&self, kind: &str, detail: &str) {
        self.events
            .lock()
            .unwrap()
            .push((kind.to_string(), detail.to_string()));
    }
}

fn test_request() -> SwapRequest {
    SwapRequest {
        pool: Pubkey::new_unique(),
        input_mint: Pubkey::new_unique(),
        amount_in: 1_000,
        fee_payer: Pubkey::new_unique(),
        slippage_bps: 100,
        broadcast_mode: BroadcastMode::Direct,
    }
}

#[tokio::test(start_paused = true)]
async fn test_mid_run_failure_does_not_abort_the_run() {
    // 10 iterations x 3 swaps; attempt 11 is iteration 4's second swap
    let executor = FailOnceExecutor {
        attempts: Cell::new(0),
        fail_on_attempt: 11,
    };
    let sink = Arc::new(RecordingSink::default());
    let run_config = RunConfig {
        iterations: 10,
        batch_size: 3,
        delay_ms: 1_000,
        log_path: "unused.log".to_string(),
    };

    let sink_dyn: Arc<dyn EventSink> = sink.clone();
    let mut orchestrator =
        BatchOrchestrator::new(executor, test_request(), run_config, sink_dyn);
    let summary = orchestrator.run().await;

    assert_eq!(orchestrator.phase(), RunPhase::Completed);
    // 30 attempts, 1 failure: only completed swaps contribute samples
    assert_eq!(summary.count, 29);

    let events = sink.events.lock().unwrap();
    let failures: Vec<_> = events.iter().filter(|(kind, _)| kind == "swap_failed").collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].1.contains("iteration 4, swap 2"));
    assert!(failures[0].1.contains("503"));

    // Iterations 5..10 still ran after the failure
    let iteration_events: Vec<_> = events
        .iter()
        .filter(|(kind, _)| kind == "iteration")
        .map(|(_, detail)| detail.clone())
        .collect();
    assert_eq!(iteration_events.len(), 10);
    assert_eq!(iteration_events.last().unwrap(), "10/10");

    // One percentile snapshot per batch, plus the final aggregate record
    let snapshots = events
        .iter()
        .filter(|(kind, _)| kind == "percentile_snapshot")
        .count();
    assert_eq!(snapshots, 10);
    let run_complete: Vec<_> = events
        .iter()
        .filter(|(kind, _)| kind == "run_complete")
        .collect();
    assert_eq!(run_complete.len(), 1);
    assert!(run_complete[0].1.contains("count=29"));
}

#[tokio::test(start_paused = true)]
async fn test_clean_run_records_every_swap() {
    let executor = FailOnceExecutor {
        attempts: Cell::new(0),
        fail_on_attempt: u32::MAX,
    };
    let sink = Arc::new(RecordingSink::default());
    let run_config = RunConfig {
        iterations: 10,
        batch_size: 3,
        delay_ms: 1_000,
        log_path: "unused.log".to_string(),
    };

    let sink_dyn: Arc<dyn EventSink> = sink.clone();
    let mut orchestrator =
        BatchOrchestrator::new(executor, test_request(), run_config, sink_dyn);
    let summary = orchestrator.run().await;

    assert_eq!(summary.count, 30);

    let events = sink.events.lock().unwrap();
    let completes = events
        .iter()
        .filter(|(kind, _)| kind == "swap_complete")
        .count();
    assert_eq!(completes, 30);
    // Correlation ids ride along in the completion records
    assert!(events
        .iter()
        .any(|(kind, detail)| kind == "swap_complete" && detail.contains("x-request-id: req-1")));
}
