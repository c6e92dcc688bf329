//! End-to-end event-flow tests: start, settlement order, timeout, completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

use preloader::{
    Config, Event, EventKind, Preloader, ProgressTracker, Queue, Subscribe, TaskError, TaskStatus,
};

/// Reads events from a bus receiver until the terminal `Completed` event,
/// inclusive. Panics if the run takes longer than five seconds.
async fn collect_until_complete(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        let ev = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("run did not complete within 5s")
            .expect("bus closed before Completed");
        let done = ev.kind == EventKind::Completed;
        events.push(ev);
        if done {
            return events;
        }
    }
}

fn kinds(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|ev| ev.kind).collect()
}

fn count_kind(events: &[Event], kind: EventKind) -> usize {
    events.iter().filter(|ev| ev.kind == kind).count()
}

#[tokio::test]
async fn all_success_run_emits_each_phase() {
    let mut queue = Queue::new();
    queue.insert_fn("a", || async {
        sleep(Duration::from_millis(10)).await;
        Ok(())
    });
    queue.insert_fn("b", || async {
        sleep(Duration::from_millis(30)).await;
        Ok(())
    });
    queue.insert_fn("c", || async {
        sleep(Duration::from_millis(60)).await;
        Ok(())
    });

    let pre = Preloader::new(Config::default(), Vec::new());
    let mut rx = pre.bus.subscribe();
    assert!(pre.start(queue));

    let events = collect_until_complete(&mut rx).await;

    // Started opens the stream with zero progress; Completed closes it.
    let first = &events[0];
    assert_eq!(first.kind, EventKind::Started);
    assert_eq!(first.settled, Some(0));
    assert_eq!(first.total, Some(3));

    let last = events.last().expect("nonempty");
    assert_eq!(last.kind, EventKind::Completed);
    assert_eq!(last.forced, Some(false));
    assert_eq!(last.settled, Some(3));

    assert_eq!(count_kind(&events, EventKind::TaskLoading), 3);
    assert_eq!(count_kind(&events, EventKind::Loaded), 3);
    assert_eq!(count_kind(&events, EventKind::TaskLoaded), 3);
    assert_eq!(count_kind(&events, EventKind::Failed), 0);
    assert_eq!(count_kind(&events, EventKind::TimedOut), 0);
    assert_eq!(count_kind(&events, EventKind::Completed), 1);

    // Each aggregate Loaded is immediately followed by the per-key event for
    // the same task; settlements never interleave.
    for (i, ev) in events.iter().enumerate() {
        if ev.kind == EventKind::Loaded {
            let next = &events[i + 1];
            assert_eq!(next.kind, EventKind::TaskLoaded);
            assert_eq!(next.task, ev.task);
        }
    }

    // Progress counters step one settlement at a time.
    let mut counts: Vec<u32> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::Loaded)
        .filter_map(|ev| ev.settled)
        .collect();
    counts.sort_unstable();
    assert_eq!(counts, [1, 2, 3]);

    let report = pre.completed().await;
    assert!(report.is_clean());
    assert_eq!(report.loaded(), 3);
}

#[tokio::test]
async fn failures_settle_and_never_block_completion() {
    let mut queue = Queue::new();
    queue.insert_fn("ok-1", || async { Ok(()) });
    queue.insert_fn("bad-1", || async {
        Err(TaskError::Fail {
            error: "boom".into(),
        })
    });
    queue.insert_fn("ok-2", || async {
        sleep(Duration::from_millis(20)).await;
        Ok(())
    });
    queue.insert_fn("bad-2", || async {
        sleep(Duration::from_millis(40)).await;
        Err(TaskError::Fail {
            error: "bang".into(),
        })
    });

    let pre = Preloader::new(Config::default(), Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(queue);

    let events = collect_until_complete(&mut rx).await;

    assert_eq!(count_kind(&events, EventKind::Loaded), 2);
    assert_eq!(count_kind(&events, EventKind::Failed), 2);
    assert_eq!(count_kind(&events, EventKind::TaskFailed), 2);
    assert_eq!(count_kind(&events, EventKind::TimedOut), 0);
    assert_eq!(count_kind(&events, EventKind::Completed), 1);

    // Failed events carry the failure message and count toward progress.
    let failed: Vec<&Event> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::Failed)
        .collect();
    for ev in &failed {
        assert!(ev.reason.is_some());
        assert!(ev.settled.is_some());
    }

    let report = pre.completed().await;
    assert!(!report.forced);
    assert_eq!(report.settled, 4);
    assert_eq!(report.failed, 2);
    assert_eq!(report.loaded(), 2);
    assert!(!report.is_clean());
    assert!(report.pending().is_empty());
}

#[tokio::test]
async fn empty_queue_completes_immediately() {
    let pre = Preloader::new(Config::default(), Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(Queue::new());

    // Completion must not wait on the 10s default timeout.
    let report = timeout(Duration::from_secs(1), pre.completed())
        .await
        .expect("empty run must complete at once");

    assert!(!report.forced);
    assert_eq!(report.total, 0);
    assert_eq!(report.settled, 0);
    assert!(report.is_clean());

    let events = collect_until_complete(&mut rx).await;
    assert_eq!(kinds(&events), [EventKind::Started, EventKind::Completed]);
}

#[tokio::test]
async fn timeout_forces_completion_and_reports_pending() {
    let mut cfg = Config::default();
    cfg.timeout = Duration::from_millis(50);

    let mut queue = Queue::new();
    queue.insert_fn("slow", || std::future::pending());

    let pre = Preloader::new(cfg, Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(queue);

    let events = collect_until_complete(&mut rx).await;
    assert_eq!(
        kinds(&events),
        [
            EventKind::Started,
            EventKind::TaskLoading,
            EventKind::TimedOut,
            EventKind::Completed,
        ]
    );

    let timed_out = &events[2];
    assert_eq!(timed_out.settled, Some(0));
    assert_eq!(timed_out.total, Some(1));

    let completed = &events[3];
    assert_eq!(completed.forced, Some(true));

    let report = pre.completed().await;
    assert!(report.forced);
    assert_eq!(report.settled, 0);
    let pending = report.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].as_ref(), "slow");
}

#[tokio::test]
async fn settlements_are_serialized_in_event_order() {
    // "a" settles well before "b" fails, so the full stream is deterministic.
    let mut queue = Queue::new();
    queue.insert_fn("a", || async {
        sleep(Duration::from_millis(10)).await;
        Ok(())
    });
    queue.insert_fn("b", || async {
        sleep(Duration::from_millis(150)).await;
        Err(TaskError::Fail {
            error: "no backend".into(),
        })
    });

    let pre = Preloader::new(Config::default(), Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(queue);

    let events = collect_until_complete(&mut rx).await;
    assert_eq!(
        kinds(&events),
        [
            EventKind::Started,
            EventKind::TaskLoading,
            EventKind::TaskLoading,
            EventKind::Loaded,
            EventKind::TaskLoaded,
            EventKind::Failed,
            EventKind::TaskFailed,
            EventKind::Completed,
        ]
    );

    // Queue order drives the sweep; settlement order is by completion time.
    assert_eq!(events[1].task.as_deref(), Some("a"));
    assert_eq!(events[2].task.as_deref(), Some("b"));
    assert_eq!(events[3].task.as_deref(), Some("a"));
    assert_eq!(events[5].task.as_deref(), Some("b"));
    assert_eq!(events[5].reason.as_deref(), Some("load failed: no backend"));

    // Sequence numbers are strictly increasing along the stream.
    for pair in events.windows(2) {
        assert!(pair[0].seq < pair[1].seq);
    }

    // Per-key statuses ride on the per-key events.
    assert_eq!(events[4].status, Some(TaskStatus::Loaded));
    assert_eq!(events[6].status, Some(TaskStatus::Failed));
}

#[tokio::test]
async fn start_is_idempotent() {
    let mut first = Queue::new();
    first.insert_fn("a", || async { Ok(()) });
    first.insert_fn("b", || async { Ok(()) });

    let mut second = Queue::new();
    second.insert_fn("x", || async { Ok(()) });

    let pre = Preloader::new(Config::default(), Vec::new());
    assert!(!pre.is_started());

    let mut rx = pre.bus.subscribe();
    assert!(pre.start(first));
    assert!(pre.is_started());
    // The repeat call is ignored; its queue never becomes part of the run.
    assert!(!pre.start(second));

    let events = collect_until_complete(&mut rx).await;
    assert_eq!(count_kind(&events, EventKind::Started), 1);
    assert_eq!(count_kind(&events, EventKind::Completed), 1);

    let report = pre.completed().await;
    assert_eq!(report.total, 2);
    assert!(report.statuses.iter().all(|(key, _)| key.as_ref() != "x"));
}

#[tokio::test]
async fn late_settlement_after_forced_completion_is_silent() {
    let mut cfg = Config::default();
    cfg.timeout = Duration::from_millis(50);

    let mut queue = Queue::new();
    queue.insert_fn("late", || async {
        sleep(Duration::from_millis(300)).await;
        Ok(())
    });

    let pre = Preloader::new(cfg, Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(queue);

    let events = collect_until_complete(&mut rx).await;
    assert_eq!(count_kind(&events, EventKind::TimedOut), 1);
    assert_eq!(events.last().map(|ev| ev.kind), Some(EventKind::Completed));

    // The operation settles long after the forced completion; nothing more
    // may reach the bus.
    sleep(Duration::from_millis(400)).await;
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn panicking_task_settles_as_failure() {
    let mut queue = Queue::new();
    queue.insert_fn("fragile", || async {
        panic!("kaboom");
    });
    queue.insert_fn("steady", || async {
        sleep(Duration::from_millis(20)).await;
        Ok(())
    });

    let pre = Preloader::new(Config::default(), Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(queue);

    let events = collect_until_complete(&mut rx).await;

    let failed: Vec<&Event> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::Failed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].task.as_deref(), Some("fragile"));
    let reason = failed[0].reason.as_deref().expect("panic reason");
    assert!(reason.contains("kaboom"), "reason was: {reason}");

    // A panic is just a failed settlement; the run still completes clean.
    let report = pre.completed().await;
    assert!(!report.forced);
    assert_eq!(report.settled, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.statuses[0].1, TaskStatus::Failed);
    assert_eq!(report.statuses[1].1, TaskStatus::Loaded);
}

#[tokio::test]
async fn completed_resolves_for_every_waiter() {
    let mut queue = Queue::new();
    queue.insert_fn("a", || async {
        sleep(Duration::from_millis(30)).await;
        Ok(())
    });

    let pre = Arc::new(Preloader::new(Config::default(), Vec::new()));

    // Waiters registered before start must resolve too.
    let early = {
        let pre = Arc::clone(&pre);
        tokio::spawn(async move { pre.completed().await })
    };
    let other = {
        let pre = Arc::clone(&pre);
        tokio::spawn(async move { pre.completed().await })
    };

    sleep(Duration::from_millis(20)).await;
    pre.start(queue);

    let a = early.await.expect("waiter");
    let b = other.await.expect("waiter");
    assert_eq!(a.settled, 1);
    assert_eq!(b.settled, 1);

    // After completion the latch answers immediately with the same report.
    let again = timeout(Duration::from_millis(10), pre.completed())
        .await
        .expect("must resolve at once");
    assert_eq!(again.settled, 1);
    assert!(!again.forced);
}

struct Recorder {
    events: tokio::sync::Mutex<Vec<Event>>,
}

#[async_trait::async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().await.push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test]
async fn subscribers_receive_the_full_run_then_release() {
    let recorder = Arc::new(Recorder {
        events: tokio::sync::Mutex::new(Vec::new()),
    });
    let subs: Vec<Arc<dyn Subscribe>> = vec![recorder.clone()];
    let pre = Preloader::new(Config::default(), subs);

    let mut queue = Queue::new();
    queue.insert_fn("a", || async { Ok(()) });
    queue.insert_fn("b", || async {
        Err(TaskError::Fail {
            error: "boom".into(),
        })
    });

    let report = pre.run(queue).await;
    assert_eq!(report.settled, 2);

    // Fan-out is asynchronous; wait for the worker to drain its queue.
    sleep(Duration::from_millis(100)).await;

    let seen = recorder.events.lock().await.clone();
    assert_eq!(seen.first().map(|ev| ev.kind), Some(EventKind::Started));
    assert_eq!(seen.last().map(|ev| ev.kind), Some(EventKind::Completed));
    assert_eq!(count_kind(&seen, EventKind::Completed), 1);
    // Started + 2×(loading, aggregate, per-key) + Completed.
    assert_eq!(seen.len(), 8);

    // Workers exited with the terminal event; later emissions go nowhere.
    pre.subs.emit(&Event::new(EventKind::Started));
    sleep(Duration::from_millis(50)).await;
    assert_eq!(recorder.events.lock().await.len(), 8);
}

#[tokio::test]
async fn progress_tracker_mirrors_the_run() {
    let progress = Arc::new(ProgressTracker::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![progress.clone()];
    let pre = Preloader::new(Config::default(), subs);

    let mut queue = Queue::new();
    queue.insert_fn("ok", || async { Ok(()) });
    queue.insert_fn("bad", || async {
        Err(TaskError::Fail {
            error: "nope".into(),
        })
    });

    pre.run(queue).await;
    sleep(Duration::from_millis(100)).await;

    assert_eq!(progress.status("ok").await, Some(TaskStatus::Loaded));
    assert_eq!(progress.status("bad").await, Some(TaskStatus::Failed));
    assert!(progress.is_settled("ok").await);
    assert!(progress.is_settled("bad").await);
    assert!(progress.pending().await.is_empty());
    assert_eq!(progress.snapshot().await.len(), 2);
}

#[tokio::test]
async fn zero_timeout_waits_for_slow_tasks() {
    let mut cfg = Config::default();
    cfg.timeout = Duration::ZERO;

    let mut queue = Queue::new();
    queue.insert_fn("slow", || async {
        sleep(Duration::from_millis(200)).await;
        Ok(())
    });

    let pre = Preloader::new(cfg, Vec::new());
    let mut rx = pre.bus.subscribe();
    pre.start(queue);

    let events = collect_until_complete(&mut rx).await;
    assert_eq!(count_kind(&events, EventKind::TimedOut), 0);

    let report = pre.completed().await;
    assert!(!report.forced);
    assert!(report.is_clean());
}
