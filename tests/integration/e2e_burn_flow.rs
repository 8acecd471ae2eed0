//! End-to-end burn flow against the dev ledger.
//!
//! Covers the burn popup pipeline:
//! 1. Validate the typed amount against decimals and balance
//! 2. Take the guard and send the burn
//! 3. Notify once and refresh the details

use std::time::Duration;

use jetton_console::domain::{
    flow::{ActionRequest, FlowOutcome},
    notification::Severity,
};
use jetton_console::infra::devnet::DEV_WALLET;

use super::TestEnv;

const ONE_DEV: u128 = 1_000_000_000;

fn burn(amount: &str) -> ActionRequest {
    ActionRequest::burn(Some(amount.to_string()))
}

#[tokio::test]
async fn test_burn_updates_balance_and_supply() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;
    let connection = TestEnv::dev_connection();

    let outcome = env.flow.run(&details, Some(&connection), burn("50.5")).await;

    let FlowOutcome::Completed {
        refreshed: Some(fresh),
    } = outcome
    else {
        panic!("burn did not complete: {outcome:?}");
    };
    assert_eq!(fresh.balance.as_deref(), Some("949.5"));
    assert_eq!(fresh.total_supply, 949 * ONE_DEV + ONE_DEV / 2);
    assert_eq!(env.dev_balance(), 949 * ONE_DEV + ONE_DEV / 2);
    assert_eq!(env.messages(), vec!["Successfully burned 50.5 DEV"]);
    assert!(!env.flow.guard().in_progress());
}

#[tokio::test]
async fn test_burn_over_balance_is_rejected() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;
    let connection = TestEnv::dev_connection();

    let outcome = env.flow.run(&details, Some(&connection), burn("1000.000000001")).await;

    assert_eq!(outcome, FlowOutcome::Rejected);
    let shown = env.notifier.take();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].message, "Maximum amount to burn is 1,000");
    assert_eq!(shown[0].auto_dismiss, Some(Duration::from_millis(3000)));
    assert_eq!(env.dev_balance(), 1000 * ONE_DEV);
}

#[tokio::test]
async fn test_burn_exact_balance() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;

    let outcome = env
        .flow
        .run(&details, Some(&TestEnv::dev_connection()), burn("1000"))
        .await;

    assert!(matches!(outcome, FlowOutcome::Completed { .. }));
    assert_eq!(env.dev_balance(), 0);
    assert_eq!(env.messages(), vec!["Successfully burned 1,000 DEV"]);
}

#[tokio::test]
async fn test_burn_input_errors() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;
    let connection = TestEnv::dev_connection();

    for amount in ["", "0", "0.000"] {
        let outcome = env.flow.run(&details, Some(&connection), burn(amount)).await;
        assert_eq!(outcome, FlowOutcome::Rejected);
        assert_eq!(env.messages(), vec!["Minimum amount to burn is 1 DEV"]);
    }

    // Ten fraction digits on a nine-decimal jetton.
    let outcome = env
        .flow
        .run(&details, Some(&connection), burn("0.0000000001"))
        .await;
    assert_eq!(outcome, FlowOutcome::Rejected);
    let shown = env.notifier.take();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Warning);
    assert!(shown[0].message.contains("decimal places"));

    assert_eq!(env.dev_balance(), 1000 * ONE_DEV);
    assert!(!env.flow.guard().in_progress());
}

#[tokio::test]
async fn test_concurrent_burns_run_once() {
    let env = TestEnv::with_latency(Duration::from_millis(50));
    let details = env.details(DEV_WALLET).await;
    let connection = TestEnv::dev_connection();

    let (first, second) = tokio::join!(
        env.flow.run(&details, Some(&connection), burn("1")),
        env.flow.run(&details, Some(&connection), burn("1")),
    );

    let outcomes = [first, second];
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, FlowOutcome::Completed { .. }))
            .count(),
        1
    );
    assert!(outcomes.contains(&FlowOutcome::Denied));
    assert_eq!(env.dev_balance(), 999 * ONE_DEV);
    assert_eq!(env.messages(), vec!["Successfully burned 1 DEV"]);
}

#[tokio::test]
async fn test_chain_failure_releases_guard() {
    let env = TestEnv::new();
    // Stale details claim more than the ledger holds.
    let mut details = env.details(DEV_WALLET).await;
    details.balance = Some("5000".to_string());

    let outcome = env
        .flow
        .run(&details, Some(&TestEnv::dev_connection()), burn("2000"))
        .await;

    assert_eq!(outcome, FlowOutcome::Failed);
    let shown = env.notifier.take();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Error);
    assert_eq!(shown[0].message, "Insufficient jetton balance");
    assert!(!env.flow.guard().in_progress());

    // The screen is usable again.
    let outcome = env
        .flow
        .run(&details, Some(&TestEnv::dev_connection()), burn("1"))
        .await;
    assert!(matches!(outcome, FlowOutcome::Completed { .. }));
}

#[tokio::test]
async fn test_burn_unavailable_without_holding() {
    let env = TestEnv::new();
    let details = env.details(super::OTHER_WALLET).await;

    let outcome = env
        .flow
        .run(
            &details,
            Some(&jetton_console::domain::services::Connection::new(super::OTHER_WALLET)),
            burn("1"),
        )
        .await;
    assert_eq!(outcome, FlowOutcome::Unavailable);

    let outcome = env.flow.run(&details, None, burn("1")).await;
    assert_eq!(outcome, FlowOutcome::Unavailable);
    assert!(env.messages().is_empty());
}
