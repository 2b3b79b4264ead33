use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use jobgate::{
    Admission, ChannelSource, ChannelSourceHandle, Config, Event, EventKind, Gate, GateError,
    JobDescription, JobId, JobObject, LaunchError, SchedulerFn, SchedulerRef, Subscribe,
    TAG_LABEL,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn recording_scheduler() -> (SchedulerRef, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    let sched: SchedulerRef = SchedulerFn::arc("recording", move |_ctx: CancellationToken, job: JobDescription| {
        let seen = Arc::clone(&seen);
        async move {
            seen.lock().unwrap().push(job.id.to_string());
            Ok::<_, LaunchError>(())
        }
    });
    (sched, calls)
}

fn config(limit: usize) -> Config {
    let mut cfg = Config::default();
    cfg.max_in_flight = limit;
    cfg.sync_timeout_secs = 5;
    cfg.selector.tags = vec!["queue=default".to_string()];
    cfg
}

fn object(id: &str) -> JobObject {
    JobObject::new(format!("job-{id}"))
        .with_job_id(id)
        .with_label(TAG_LABEL, "queue_default")
}

fn complete(id: &str) -> JobObject {
    object(id).with_condition("Complete")
}

async fn wait_until_in_flight(gate: &Gate, expected: &[&str]) {
    let expected: Vec<JobId> = expected.iter().map(|s| JobId::from(*s)).collect();
    tokio::time::timeout(Duration::from_secs(2), async {
        while gate.in_flight().await != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("in-flight set did not converge");
}

async fn started(
    limit: usize,
    existing: Vec<JobObject>,
) -> (
    Arc<Gate>,
    ChannelSourceHandle<JobObject>,
    Arc<Mutex<Vec<String>>>,
    CancellationToken,
) {
    init_tracing();
    let (sched, calls) = recording_scheduler();
    let gate = Arc::new(Gate::builder(config(limit), sched).build());
    let (source, feed) = ChannelSource::new(existing, 64);
    let token = CancellationToken::new();
    gate.register_source(source, token.clone()).await.unwrap();
    (gate, feed, calls, token)
}

#[tokio::test]
async fn blocked_admission_proceeds_after_completion() {
    let (gate, feed, calls, token) = started(2, Vec::new()).await;

    for id in ["A", "B"] {
        let outcome = gate
            .admit_and_create(&token, &JobDescription::new(id))
            .await
            .unwrap();
        assert_eq!(outcome, Admission::Launched);
    }

    let mut third = {
        let gate = Arc::clone(&gate);
        let token = token.clone();
        tokio::spawn(async move {
            gate.admit_and_create(&token, &JobDescription::new("C"))
                .await
        })
    };
    assert!(
        tokio::time::timeout(Duration::from_millis(50), &mut third)
            .await
            .is_err()
    );
    assert_eq!(*calls.lock().unwrap(), vec!["A", "B"]);

    feed.update(object("A"), complete("A")).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(2), third)
        .await
        .expect("C should be admitted")
        .unwrap()
        .unwrap();
    assert_eq!(outcome, Admission::Launched);
    assert_eq!(*calls.lock().unwrap(), vec!["A", "B", "C"]);
    wait_until_in_flight(&gate, &["B", "C"]).await;
}

#[tokio::test]
async fn replayed_jobs_count_toward_capacity_and_dedup() {
    let existing = vec![object("X"), object("Y"), complete("Z")];
    let (gate, feed, calls, token) = started(2, existing).await;

    assert_eq!(gate.in_flight_count().await, 2);

    // at capacity: the redelivered request waits for a completion before the duplicate check
    let redelivered = {
        let gate = Arc::clone(&gate);
        let token = token.clone();
        tokio::spawn(async move {
            gate.admit_and_create(&token, &JobDescription::new("X"))
                .await
        })
    };

    feed.delete(object("Y")).await.unwrap();
    let outcome = tokio::time::timeout(Duration::from_secs(2), redelivered)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(outcome, Admission::Duplicate);
    wait_until_in_flight(&gate, &["X"]).await;

    let outcome = gate
        .admit_and_create(&token, &JobDescription::new("W"))
        .await
        .unwrap();
    assert_eq!(outcome, Admission::Launched);
    assert_eq!(*calls.lock().unwrap(), vec!["W"]);
    wait_until_in_flight(&gate, &["W", "X"]).await;
}

#[tokio::test]
async fn cancelled_waiter_leaves_no_trace() {
    let (gate, _feed, calls, _token) = started(1, vec![object("busy")]).await;

    let waiter_token = CancellationToken::new();
    let waiter = {
        let gate = Arc::clone(&gate);
        let waiter_token = waiter_token.clone();
        tokio::spawn(async move {
            gate.admit_and_create(&waiter_token, &JobDescription::new("late"))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    waiter_token.cancel();

    assert_eq!(waiter.await.unwrap().unwrap(), Admission::Cancelled);
    assert!(calls.lock().unwrap().is_empty());
    assert!(!gate.is_in_flight("late").await);
}

#[tokio::test]
async fn unselected_objects_are_ignored() {
    let foreign = JobObject::new("other-queue")
        .with_job_id("F")
        .with_label(TAG_LABEL, "queue_gpu");
    let (gate, feed, _calls, _token) = started(0, vec![foreign.clone()]).await;

    feed.add(foreign).await.unwrap();
    feed.add(object("mine")).await.unwrap();

    wait_until_in_flight(&gate, &["mine"]).await;
}

#[tokio::test]
async fn launch_failure_is_returned_and_retryable() {
    init_tracing();
    let attempts = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&attempts);
    let sched = SchedulerFn::arc("flaky", move |_ctx: CancellationToken, _job: JobDescription| {
        let counter = Arc::clone(&counter);
        async move {
            let attempt = {
                let mut n = counter.lock().unwrap();
                *n += 1;
                *n
            };
            if attempt == 1 {
                Err(LaunchError::Unavailable {
                    error: "connection refused".into(),
                })
            } else {
                Ok(())
            }
        }
    });
    let gate = Gate::builder(config(1), sched).build();
    let token = CancellationToken::new();
    let job = JobDescription::new("J");

    let err = gate.admit_and_create(&token, &job).await.unwrap_err();
    assert!(matches!(err, GateError::Launch { .. }));
    assert_eq!(err.as_label(), "gate_launch_failed");
    assert_eq!(gate.in_flight_count().await, 0);

    assert_eq!(
        gate.admit_and_create(&token, &job).await.unwrap(),
        Admission::Launched
    );
    assert_eq!(*attempts.lock().unwrap(), 2);
}

#[derive(Default)]
struct Kinds(tokio::sync::Mutex<Vec<EventKind>>);

#[async_trait::async_trait]
impl Subscribe for Kinds {
    async fn on_event(&self, event: &Event) {
        self.0.lock().await.push(event.kind);
    }

    fn name(&self) -> &'static str {
        "kinds"
    }
}

#[tokio::test]
async fn shutdown_delivers_pending_events_to_subscribers() {
    init_tracing();
    let kinds = Arc::new(Kinds::default());
    let (sched, _calls) = recording_scheduler();
    let gate = Gate::builder(config(0), sched)
        .with_subscribers(vec![kinds.clone() as Arc<dyn Subscribe>])
        .build();
    let token = CancellationToken::new();

    gate.admit_and_create(&token, &JobDescription::new("a"))
        .await
        .unwrap();
    gate.admit_and_create(&token, &JobDescription::new("a"))
        .await
        .unwrap();

    gate.shutdown().await;

    assert_eq!(
        *kinds.0.lock().await,
        vec![EventKind::JobLaunched, EventKind::JobDuplicate]
    );
}

#[tokio::test]
async fn relabelled_job_frees_its_slot() {
    let (gate, feed, calls, token) = started(1, vec![object("A")]).await;

    let moved = JobObject::new("job-A")
        .with_job_id("A")
        .with_label(TAG_LABEL, "queue_gpu");
    feed.update(object("A"), moved.clone()).await.unwrap();
    // no longer selected: later events for A never arrive
    feed.delete(moved).await.unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        gate.admit_and_create(&token, &JobDescription::new("B")),
    )
    .await
    .expect("slot held by A should have been released")
    .unwrap();
    assert_eq!(outcome, Admission::Launched);
    assert_eq!(*calls.lock().unwrap(), vec!["B"]);
    wait_until_in_flight(&gate, &["B"]).await;
}
