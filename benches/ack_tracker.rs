use ack_tracker::{AckOutcome, AckTracker, AckTrackerConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

fn ack_ids() -> Vec<String> {
    (0..100).map(|i| format!("msg-{}", i)).collect()
}

fn create_and_trigger(tracker: &AckTracker, ids: &[String]) {
    for id in ids {
        let handle = tracker.create_ack(id);
        assert!(tracker.trigger_ack(id));
        assert_eq!(handle.outcome(), Some(AckOutcome::Acknowledged));
    }
}

fn criterion_create_trigger(c: &mut Criterion) {
    let tracker = AckTracker::new(AckTrackerConfig::default().enable_timeout_sweep(false))
        .expect("valid configuration");
    let ids = ack_ids();

    c.bench_function("create and trigger acks", |b| {
        b.iter(|| create_and_trigger(black_box(&tracker), black_box(&ids)))
    });
}

fn criterion_await_acks(c: &mut Criterion) {
    let runtime = Runtime::new().expect("Failed to create tokio runtime");
    let tracker = runtime
        .block_on(async { AckTracker::with_defaults() })
        .expect("valid configuration");
    let ids = ack_ids();

    c.bench_function("await triggered acks", |b| {
        b.to_async(&runtime).iter(|| async {
            let handles: Vec<_> = ids.iter().map(|id| tracker.create_ack(id)).collect();
            for id in &ids {
                tracker.trigger_ack(id);
            }
            for handle in handles {
                black_box(handle.await);
            }
        })
    });
}

fn criterion_check_expired(c: &mut Criterion) {
    let tracker = AckTracker::new(AckTrackerConfig::default().enable_timeout_sweep(false))
        .expect("valid configuration");
    for id in ack_ids() {
        tracker.create_ack(&id);
    }

    c.bench_function("sweep without expired acks", |b| {
        b.iter(|| black_box(tracker.check_expired()))
    });
}

criterion_group!(
    benches,
    criterion_create_trigger,
    criterion_await_acks,
    criterion_check_expired
);
criterion_main!(benches);
