//! Live broker tests.
//!
//! These need a reachable pool broker and are skipped by default; run them
//! with `cargo test -- --ignored` and the environment below set.

use poolsweep::pool::{Broker, PoolClient};
use poolsweep_common::resource::state;

fn live_client() -> PoolClient {
    let url = std::env::var("POOLSWEEP_TEST_POOL_URL")
        .expect("POOLSWEEP_TEST_POOL_URL must point at a broker");
    let password = std::env::var("POOLSWEEP_TEST_POOL_PASSWORD")
        .expect("POOLSWEEP_TEST_POOL_PASSWORD must be set");
    PoolClient::new(&url, "poolsweep-tests", &password).expect("client construction")
}

#[tokio::test]
#[ignore = "requires a running pool broker"]
async fn acquiring_an_unknown_kind_reports_no_resource() {
    let err = live_client()
        .acquire("definitely-not-a-kind", state::DIRTY, state::CLEANING)
        .await
        .expect_err("no broker hands out this kind");
    assert!(err.is_no_resource());
}
