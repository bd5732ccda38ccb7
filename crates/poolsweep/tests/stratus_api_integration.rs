//! Live Stratus API tests.
//!
//! These need real credentials and are skipped by default; run them with
//! `cargo test -- --ignored` and `STRATUS_TEST_API_KEY` set.

use poolsweep::stratus::{IdentityClient, StratusContext};

fn live_context() -> StratusContext {
    let api_key =
        std::env::var("STRATUS_TEST_API_KEY").expect("STRATUS_TEST_API_KEY must be set");
    StratusContext::new(api_key, true).expect("client construction")
}

#[tokio::test]
#[ignore = "requires Stratus credentials"]
async fn the_configured_key_resolves_to_an_account() {
    let identity = IdentityClient::new(&live_context());
    let account = identity.account_id().await.expect("account lookup");
    assert!(!account.is_empty());
}
