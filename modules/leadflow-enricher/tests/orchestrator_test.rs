use std::sync::Arc;
use std::time::Duration;

use leadflow_common::{EnrichmentOptions, EnrichmentStatus};
use leadflow_enricher::testing::{contacts, MockEnricher, Step};
use leadflow_enricher::{
    BatchEnrichmentError, MemoryObserver, OrchestrationError, Orchestrator, PauseSignal,
    RunConfig, RunError, RunEvent, RunState, ValidationError,
};

fn config(batch_size: usize) -> RunConfig {
    RunConfig {
        batch_size,
        options: EnrichmentOptions::default(),
        inter_batch_delay: Duration::ZERO,
        call_timeout: Duration::from_secs(5),
    }
}

fn orchestrator(
    enricher: &Arc<MockEnricher>,
    batch_size: usize,
) -> (Orchestrator<Arc<MockEnricher>>, Arc<MemoryObserver>) {
    let observer = Arc::new(MemoryObserver::new());
    let orch = Orchestrator::new(enricher.clone(), config(batch_size)).with_observer(observer.clone());
    (orch, observer)
}

#[tokio::test]
async fn failed_middle_batch_is_absorbed() {
    let enricher = Arc::new(MockEnricher::scripted([
        Step::Succeed,
        Step::FailWith(BatchEnrichmentError::RateLimited("slow down".into())),
        Step::Succeed,
    ]));
    let (orch, _) = orchestrator(&enricher, 10);

    let report = orch
        .run(contacts(23), "key", &PauseSignal::new())
        .await
        .unwrap();

    let sizes: Vec<usize> = enricher.calls().iter().map(|c| c.contacts.len()).collect();
    assert_eq!(sizes, vec![10, 10, 3]);

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.stats.processed, 23);
    assert_eq!(report.stats.failed, 10);
    assert_eq!(report.stats.successful, 13);
    assert_eq!(report.stats.api_calls, 3);
    assert_eq!(report.stats.credits_used, 13);
    assert!(report.finished_at.is_some());

    let failed: Vec<_> = report.results[10..20].iter().collect();
    assert!(failed
        .iter()
        .all(|r| r.enrichment_status == EnrichmentStatus::Failed
            && r.error.as_deref() == Some("rate limited: slow down")));
    assert!(report.results[..10].iter().all(|r| r.is_success()));
    assert!(report.results[20..].iter().all(|r| r.is_success()));
}

#[tokio::test]
async fn output_order_matches_input_order() {
    let enricher = Arc::new(MockEnricher::scripted([Step::NoMatchFor(vec![1, 3])]));
    let (orch, _) = orchestrator(&enricher, 5);
    let input = contacts(17);

    let report = orch
        .run(input.clone(), "key", &PauseSignal::new())
        .await
        .unwrap();

    let output: Vec<_> = report.results.iter().map(|r| r.contact.clone()).collect();
    assert_eq!(output, input);
    assert_eq!(report.stats.failed, 2);
    assert_eq!(report.stats.successful, 15);
}

#[tokio::test]
async fn processed_grows_by_batch_length_each_batch() {
    let enricher = Arc::new(MockEnricher::scripted([
        Step::Succeed,
        Step::FailWith(BatchEnrichmentError::Failed("boom".into())),
    ]));
    let (orch, observer) = orchestrator(&enricher, 5);

    let report = orch
        .run(contacts(12), "key", &PauseSignal::new())
        .await
        .unwrap();

    let percents: Vec<u8> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RunEvent::Progress { percent, .. } => Some(percent),
            _ => None,
        })
        .collect();
    assert_eq!(percents, vec![42, 83, 100]);
    assert_eq!(report.stats.processed, 12);
}

#[tokio::test]
async fn event_stream_follows_batch_lifecycle() {
    let enricher = Arc::new(MockEnricher::scripted([
        Step::Succeed,
        Step::FailWith(BatchEnrichmentError::Authentication("bad key".into())),
    ]));
    let (orch, observer) = orchestrator(&enricher, 5);

    orch.run(contacts(10), "key", &PauseSignal::new())
        .await
        .unwrap();

    assert_eq!(
        observer.event_types(),
        vec![
            "run_started",
            "batch_started",
            "batch_completed",
            "progress",
            "batch_started",
            "batch_failed",
            "batch_completed",
            "progress",
            "run_completed",
        ]
    );
    let events = observer.events();
    assert_eq!(
        events[0],
        RunEvent::RunStarted {
            total_contacts: 10,
            total_batches: 2,
            remaining: 10,
            resumed: false
        }
    );
    assert_eq!(
        events[6],
        RunEvent::BatchCompleted {
            index: 2,
            success_count: 0,
            fail_count: 5
        }
    );
}

#[tokio::test]
async fn pause_before_batch_stops_remaining_batches() {
    let pause = PauseSignal::new();
    let enricher = Arc::new(MockEnricher::scripted([
        Step::Succeed,
        Step::PauseDuring(pause.clone()),
        Step::Succeed,
    ]));
    let (orch, observer) = orchestrator(&enricher, 10);

    let report = orch.run(contacts(35), "key", &pause).await.unwrap();

    // Batch 2 was in flight when the pause arrived, so it still merged.
    assert_eq!(enricher.call_count(), 2);
    assert_eq!(report.state, RunState::Paused);
    assert_eq!(report.results.len(), 20);
    assert_eq!(report.stats.processed, 20);
    assert_eq!(report.remaining().len(), 15);
    assert!(report.finished_at.is_none());
    assert_eq!(
        observer.events().last(),
        Some(&RunEvent::RunPaused {
            stats: report.stats,
            remaining: 15
        })
    );
}

#[tokio::test]
async fn pause_raised_before_start_runs_nothing() {
    let enricher = Arc::new(MockEnricher::new());
    let (orch, _) = orchestrator(&enricher, 5);
    let pause = PauseSignal::new();
    pause.raise();

    let report = orch.run(contacts(8), "key", &pause).await.unwrap();

    assert_eq!(enricher.call_count(), 0);
    assert_eq!(report.state, RunState::Paused);
    assert_eq!(report.stats.processed, 0);
    assert_eq!(report.stats.quality_score, 0);
}

#[tokio::test]
async fn resume_processes_exactly_the_unprocessed_suffix() {
    let pause = PauseSignal::new();
    let enricher = Arc::new(MockEnricher::scripted([Step::PauseDuring(pause.clone())]));
    let (orch, observer) = orchestrator(&enricher, 10);
    let input = contacts(23);

    let paused = orch.run(input.clone(), "key", &pause).await.unwrap();
    assert_eq!(paused.state, RunState::Paused);
    assert_eq!(paused.results.len(), 10);

    pause.reset();
    let report = orch.resume(paused, "key", &pause).await.unwrap();

    let calls = enricher.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].contacts, input[10..20].to_vec());
    assert_eq!(calls[2].contacts, input[20..].to_vec());

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.stats.processed, 23);
    assert_eq!(report.stats.successful, 23);
    assert_eq!(report.stats.api_calls, 3);
    assert_eq!(report.batches_completed, 3);

    let resumed_start = observer
        .events()
        .into_iter()
        .filter(|e| matches!(e, RunEvent::RunStarted { resumed: true, .. }))
        .count();
    assert_eq!(resumed_start, 1);
    assert!(observer.events().contains(&RunEvent::BatchStarted {
        index: 2,
        total: 3,
        size: 10
    }));
}

#[tokio::test]
async fn resume_requires_a_paused_run() {
    let enricher = Arc::new(MockEnricher::new());
    let (orch, _) = orchestrator(&enricher, 10);
    let pause = PauseSignal::new();

    let done = orch.run(contacts(3), "key", &pause).await.unwrap();
    let err = orch.resume(done, "key", &pause).await.unwrap_err();

    assert!(matches!(
        err,
        RunError::Validation(ValidationError::NotResumable(RunState::Completed))
    ));
}

#[tokio::test]
async fn timeout_is_a_batch_failure() {
    let enricher = Arc::new(MockEnricher::scripted([Step::Hang, Step::Succeed]));
    let observer = Arc::new(MemoryObserver::new());
    let orch = Orchestrator::new(
        enricher.clone(),
        RunConfig {
            call_timeout: Duration::from_millis(50),
            ..config(5)
        },
    )
    .with_observer(observer.clone());

    let report = orch
        .run(contacts(10), "key", &PauseSignal::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(report.stats.failed, 5);
    assert_eq!(report.stats.successful, 5);
    assert!(report.results[0]
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("timed out")));
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, RunEvent::BatchFailed { index: 1, .. })));
}

#[tokio::test]
async fn result_count_mismatch_aborts_and_keeps_partial_results() {
    let enricher = Arc::new(MockEnricher::scripted([
        Step::Succeed,
        Step::ShortResults,
        Step::Succeed,
    ]));
    let (orch, observer) = orchestrator(&enricher, 5);

    let err = orch
        .run(contacts(15), "key", &PauseSignal::new())
        .await
        .unwrap_err();

    let RunError::Orchestration { error, context } = err else {
        panic!("expected orchestration error");
    };
    assert_eq!(
        error,
        OrchestrationError::ResultCountMismatch {
            batch: 2,
            expected: 5,
            actual: 4
        }
    );
    assert_eq!(context.state, RunState::Failed);
    assert_eq!(context.results.len(), 5);
    assert_eq!(context.stats.processed, 5);
    assert_eq!(enricher.call_count(), 2);
    assert_eq!(observer.event_types().last(), Some(&"run_failed"));
}

#[tokio::test]
async fn validation_rejects_bad_input_before_any_call() {
    let enricher = Arc::new(MockEnricher::new());
    let (orch, observer) = orchestrator(&enricher, 10);
    let pause = PauseSignal::new();

    let err = orch.run(Vec::new(), "key", &pause).await.unwrap_err();
    assert!(matches!(err, RunError::Validation(ValidationError::NoContacts)));

    let err = orch.run(contacts(3), "  ", &pause).await.unwrap_err();
    assert!(matches!(err, RunError::Validation(ValidationError::MissingCredential)));

    let (zero, _) = orchestrator(&enricher, 0);
    let err = zero.run(contacts(3), "key", &pause).await.unwrap_err();
    assert!(matches!(err, RunError::Validation(ValidationError::InvalidBatchSize)));

    assert_eq!(enricher.call_count(), 0);
    assert!(observer.events().is_empty());
}

#[tokio::test]
async fn quality_score_is_zero_without_successes() {
    let enricher = Arc::new(MockEnricher::scripted([
        Step::FailWith(BatchEnrichmentError::Failed("down".into())),
        Step::FailWith(BatchEnrichmentError::Failed("down".into())),
    ]));
    let (orch, _) = orchestrator(&enricher, 5);

    let report = orch
        .run(contacts(7), "key", &PauseSignal::new())
        .await
        .unwrap();

    assert_eq!(report.stats.successful, 0);
    assert_eq!(report.stats.quality_score, 0);
}

#[tokio::test]
async fn quality_score_is_mean_of_successes() {
    let enricher = Arc::new(MockEnricher::scripted([Step::NoMatchFor(vec![0])]));
    let (orch, _) = orchestrator(&enricher, 5);

    let report = orch
        .run(contacts(5), "key", &PauseSignal::new())
        .await
        .unwrap();

    // Mock matches fill title and company only.
    assert_eq!(report.stats.quality_score, 30);
}

#[tokio::test]
async fn options_and_credential_are_forwarded() {
    let enricher = Arc::new(MockEnricher::new());
    let options = EnrichmentOptions {
        reveal_phone_numbers: true,
        ..Default::default()
    };
    let orch = Orchestrator::new(
        enricher.clone(),
        RunConfig {
            options,
            ..config(10)
        },
    );

    orch.run(contacts(3), "secret", &PauseSignal::new())
        .await
        .unwrap();

    let call = &enricher.calls()[0];
    assert_eq!(call.credential, "secret");
    assert_eq!(call.options, options);
}

#[tokio::test]
async fn pause_cuts_inter_batch_delay_short() {
    let enricher = Arc::new(MockEnricher::new());
    let orch = Orchestrator::new(
        enricher.clone(),
        RunConfig {
            inter_batch_delay: Duration::from_secs(60),
            ..config(5)
        },
    );
    let pause = PauseSignal::new();
    let trigger = pause.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.raise();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), orch.run(contacts(10), "key", &pause))
        .await
        .expect("pause should interrupt the delay")
        .unwrap();

    assert_eq!(report.state, RunState::Paused);
    assert_eq!(enricher.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn delay_runs_between_batches_only() {
    let enricher = Arc::new(MockEnricher::new());
    let orch = Orchestrator::new(
        enricher.clone(),
        RunConfig {
            inter_batch_delay: Duration::from_secs(1),
            ..config(5)
        },
    );

    let started = tokio::time::Instant::now();
    let report = orch
        .run(contacts(10), "key", &PauseSignal::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(enricher.call_count(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn single_batch_run_never_sleeps() {
    let enricher = Arc::new(MockEnricher::new());
    let orch = Orchestrator::new(
        enricher.clone(),
        RunConfig {
            inter_batch_delay: Duration::from_secs(1),
            ..config(5)
        },
    );

    let started = tokio::time::Instant::now();
    let report = orch
        .run(contacts(5), "key", &PauseSignal::new())
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(started.elapsed(), Duration::ZERO);
}
