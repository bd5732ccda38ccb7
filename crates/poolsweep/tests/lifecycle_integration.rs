//! Scenario tests for the sweeper and monitor loops.
//!
//! These run against fake collaborators with a paused clock, so the timing
//! assertions are exact.

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use poolsweep::cleanup::AttemptOptions;
use poolsweep::orchestrator::{Monitor, Sweeper};
use poolsweep::pool::PoolError;
use poolsweep_common::resource::state;

use test_utils::{resource, BrokerCall, FakeBroker, FakeCleaner};

const INTERVAL: Duration = Duration::from_secs(60);
const PERIOD: Duration = Duration::from_secs(3600);

fn sweeper(
    broker: &Arc<FakeBroker>,
    cleaner: &Arc<FakeCleaner>,
    kinds: &[&str],
) -> Sweeper<Arc<FakeBroker>, Arc<FakeCleaner>> {
    Sweeper::new(
        Arc::clone(broker),
        Arc::clone(cleaner),
        kinds.iter().map(|k| k.to_string()).collect(),
        INTERVAL,
        AttemptOptions::default(),
    )
}

fn monitor(
    broker: &Arc<FakeBroker>,
    cleaner: &Arc<FakeCleaner>,
    kinds: &[&str],
) -> Monitor<Arc<FakeBroker>, Arc<FakeCleaner>> {
    Monitor::new(
        Arc::clone(broker),
        Arc::clone(cleaner),
        kinds.iter().map(|k| k.to_string()).collect(),
        PERIOD,
    )
}

#[tokio::test(start_paused = true)]
async fn an_empty_kind_sleeps_without_blocking_the_others() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "vpc-sandbox",
        state::DIRTY,
        Ok(resource("pool-07", "vpc-sandbox", state::DIRTY, &[])),
    );
    let cleaner = Arc::new(FakeCleaner::default());
    let sweeper = sweeper(&broker, &cleaner, &["metal-sandbox", "vpc-sandbox"]);

    let started = tokio::time::Instant::now();
    sweeper.pass().await.expect("an empty kind is not an error");

    assert!(
        started.elapsed() >= INTERVAL,
        "an empty kind must wait out the sweep interval"
    );
    assert_eq!(cleaner.cleaned(), vec!["pool-07"]);
    assert_eq!(
        broker.released(),
        vec![("pool-07".to_string(), state::FREE.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn a_cleaned_resource_is_updated_then_released_free() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "vpc-sandbox",
        state::DIRTY,
        Ok(resource("pool-07", "vpc-sandbox", state::DIRTY, &[])),
    );
    let cleaner = Arc::new(FakeCleaner {
        inject_attr: Some(("api-key".to_string(), "fresh-secret".to_string())),
        ..Default::default()
    });
    let sweeper = sweeper(&broker, &cleaner, &["vpc-sandbox"]);

    sweeper.pass().await.unwrap();

    let calls = broker.calls();
    let update_at = calls
        .iter()
        .position(|call| matches!(call, BrokerCall::Update { .. }))
        .expect("attributes must be persisted");
    let release_at = calls
        .iter()
        .position(|call| matches!(call, BrokerCall::Release { .. }))
        .expect("the resource must be released");
    assert!(update_at < release_at, "update must land before release");

    match &calls[update_at] {
        BrokerCall::Update {
            name,
            state: update_state,
            user_data,
        } => {
            assert_eq!(name, "pool-07");
            assert_eq!(update_state, state::CLEANING);
            assert_eq!(user_data.get("api-key").map(String::as_str), Some("fresh-secret"));
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(
        broker.released(),
        vec![("pool-07".to_string(), state::FREE.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn a_tagged_resource_is_released_parked() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "metal-sandbox",
        state::DIRTY,
        Ok(resource("pool-03", "metal-sandbox", state::DIRTY, &[])),
    );
    let cleaner = Arc::new(FakeCleaner {
        parked: vec!["pool-03".to_string()],
        ..Default::default()
    });
    let sweeper = sweeper(&broker, &cleaner, &["metal-sandbox"]);

    sweeper.pass().await.unwrap();

    assert_eq!(
        broker.released(),
        vec![("pool-03".to_string(), state::NO_SCHEDULE.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn an_acquire_failure_aborts_the_pass() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "vpc-sandbox",
        state::DIRTY,
        Err(PoolError::Api {
            status: 500,
            message: "broker tipped over".to_string(),
        }),
    );
    let cleaner = Arc::new(FakeCleaner::default());
    let sweeper = sweeper(&broker, &cleaner, &["vpc-sandbox", "metal-sandbox"]);

    let err = sweeper.pass().await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to acquire a dirty vpc-sandbox resource"));
    // The pass stopped before the second kind.
    assert_eq!(broker.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn a_cleanup_failure_leaves_the_resource_checked_out() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "vpc-sandbox",
        state::DIRTY,
        Ok(resource("pool-07", "vpc-sandbox", state::DIRTY, &[])),
    );
    let cleaner = Arc::new(FakeCleaner {
        fail_clean: vec!["pool-07".to_string()],
        ..Default::default()
    });
    let sweeper = sweeper(&broker, &cleaner, &["vpc-sandbox"]);

    let err = sweeper.pass().await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to clean resource \"pool-07\""));
    assert!(broker.updated().is_empty());
    assert!(broker.released().is_empty());
}

#[tokio::test(start_paused = true)]
async fn an_eligibility_failure_is_fatal_to_the_sweeper() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "metal-sandbox",
        state::DIRTY,
        Ok(resource("pool-03", "metal-sandbox", state::DIRTY, &[])),
    );
    let cleaner = Arc::new(FakeCleaner {
        fail_eligibility: vec!["pool-03".to_string()],
        ..Default::default()
    });
    let sweeper = sweeper(&broker, &cleaner, &["metal-sandbox"]);

    let err = sweeper.pass().await.unwrap_err();
    assert!(format!("{err:#}").contains("schedule eligibility"));
    // Cleaned and updated, but never released.
    assert_eq!(broker.updated().len(), 1);
    assert!(broker.released().is_empty());
}

#[tokio::test(start_paused = true)]
async fn the_monitor_returns_untagged_resources_to_the_rotation() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "metal-sandbox",
        state::NO_SCHEDULE,
        Ok(resource("pool-03", "metal-sandbox", state::NO_SCHEDULE, &[])),
    );
    let cleaner = Arc::new(FakeCleaner::default());
    let monitor = monitor(&broker, &cleaner, &["metal-sandbox"]);

    monitor.tick().await;

    assert_eq!(
        broker.released(),
        vec![("pool-03".to_string(), state::DIRTY.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn the_monitor_reparks_resources_that_stay_tagged() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "metal-sandbox",
        state::NO_SCHEDULE,
        Ok(resource("pool-03", "metal-sandbox", state::NO_SCHEDULE, &[])),
    );
    let cleaner = Arc::new(FakeCleaner {
        parked: vec!["pool-03".to_string()],
        ..Default::default()
    });
    let monitor = monitor(&broker, &cleaner, &["metal-sandbox"]);

    monitor.tick().await;

    assert_eq!(
        broker.released(),
        vec![("pool-03".to_string(), state::NO_SCHEDULE.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn the_monitor_outlives_per_kind_failures() {
    let broker = Arc::new(FakeBroker::new());
    broker.push_acquire(
        "metal-sandbox",
        state::NO_SCHEDULE,
        Err(PoolError::Api {
            status: 502,
            message: "broker tipped over".to_string(),
        }),
    );
    broker.push_acquire(
        "vpc-sandbox",
        state::NO_SCHEDULE,
        Ok(resource("pool-09", "vpc-sandbox", state::NO_SCHEDULE, &[])),
    );
    let cleaner = Arc::new(FakeCleaner::default());
    let monitor = monitor(&broker, &cleaner, &["metal-sandbox", "vpc-sandbox"]);

    monitor.tick().await;

    // The first kind failed; the second was still re-checked and returned.
    assert_eq!(
        broker.released(),
        vec![("pool-09".to_string(), state::DIRTY.to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn the_monitor_leaves_empty_kinds_alone() {
    let broker = Arc::new(FakeBroker::new());
    let cleaner = Arc::new(FakeCleaner::default());
    let monitor = monitor(&broker, &cleaner, &["metal-sandbox"]);

    let started = tokio::time::Instant::now();
    monitor.tick().await;

    // No parked resource: a single acquire, no waiting, nothing released.
    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(broker.calls().len(), 1);
    assert!(broker.released().is_empty());
}
