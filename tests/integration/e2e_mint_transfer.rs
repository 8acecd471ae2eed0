//! End-to-end mint and transfer flows driven through their forms.

use jetton_console::domain::{
    flow::{AMOUNT_FIELD, ActionRequest, FlowOutcome, RECIPIENT_FIELD, mint_fields, transfer_fields},
    form::FormEngine,
    jetton::JettonOp,
    services::Connection,
};
use jetton_console::infra::devnet::{DEV_JETTON, DEV_WALLET};

use super::{OTHER_WALLET, TestEnv};

const ONE_DEV: u128 = 1_000_000_000;

#[tokio::test]
async fn test_admin_mints_through_form() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;

    let mut form = FormEngine::register(mint_fields(&details)).unwrap();
    assert!(form.has_example(RECIPIENT_FIELD));
    form.apply_example(RECIPIENT_FIELD).unwrap();
    form.set_value(AMOUNT_FIELD, "1000").unwrap();
    let values = form.submit().unwrap();
    assert_eq!(values.get(RECIPIENT_FIELD), Some(DEV_WALLET));

    let outcome = env
        .flow
        .run(
            &details,
            Some(&TestEnv::dev_connection()),
            ActionRequest::from_form(JettonOp::Mint, &values),
        )
        .await;

    let FlowOutcome::Completed {
        refreshed: Some(fresh),
    } = outcome
    else {
        panic!("mint did not complete: {outcome:?}");
    };
    assert_eq!(fresh.formatted_balance().as_deref(), Some("2,000"));
    assert_eq!(env.messages(), vec!["Successfully minted 1,000 DEV"]);
}

#[tokio::test]
async fn test_mint_is_admin_only() {
    let env = TestEnv::new();
    let details = env.details(OTHER_WALLET).await;
    let request = ActionRequest {
        op: JettonOp::Mint,
        amount: Some("5".to_string()),
        recipient: Some(OTHER_WALLET.to_string()),
    };

    let outcome = env
        .flow
        .run(&details, Some(&Connection::new(OTHER_WALLET)), request)
        .await;

    assert_eq!(outcome, FlowOutcome::Unavailable);
    assert!(env.messages().is_empty());
    assert!(env.ledger.balance_of(DEV_JETTON, OTHER_WALLET).unwrap() == 0);
}

#[tokio::test]
async fn test_mint_is_not_bounded_by_balance() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;
    let request = ActionRequest {
        op: JettonOp::Mint,
        amount: Some("1000000".to_string()),
        recipient: Some(OTHER_WALLET.to_string()),
    };

    let outcome = env
        .flow
        .run(&details, Some(&TestEnv::dev_connection()), request)
        .await;

    assert!(matches!(outcome, FlowOutcome::Completed { .. }));
    assert_eq!(
        env.ledger.balance_of(DEV_JETTON, OTHER_WALLET).unwrap(),
        1_000_000 * ONE_DEV
    );
    assert_eq!(env.messages(), vec!["Successfully minted 1,000,000 DEV"]);
}

#[tokio::test]
async fn test_transfer_through_form() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;

    let mut form = FormEngine::register(transfer_fields(&details)).unwrap();
    form.set_value(RECIPIENT_FIELD, OTHER_WALLET).unwrap();
    // The live filter refuses a tenth fraction digit.
    assert!(!form.set_value(AMOUNT_FIELD, "12.5000000001").unwrap());
    assert!(form.set_value(AMOUNT_FIELD, "12.5").unwrap());
    let values = form.submit().unwrap();

    let outcome = env
        .flow
        .run(
            &details,
            Some(&TestEnv::dev_connection()),
            ActionRequest::from_form(JettonOp::Transfer, &values),
        )
        .await;

    assert!(matches!(outcome, FlowOutcome::Completed { .. }));
    assert_eq!(env.messages(), vec!["Successfully transferred 12.5 DEV"]);
    assert_eq!(
        env.ledger.balance_of(DEV_JETTON, OTHER_WALLET).unwrap(),
        12 * ONE_DEV + ONE_DEV / 2
    );

    let receiver = env.details(OTHER_WALLET).await;
    assert!(receiver.is_my_wallet);
    assert!(receiver.allows(JettonOp::Transfer, Some(OTHER_WALLET)));
}

#[tokio::test]
async fn test_transfer_checks() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;
    let connection = TestEnv::dev_connection();
    let transfer = |amount: &str, recipient: &str| ActionRequest {
        op: JettonOp::Transfer,
        amount: Some(amount.to_string()),
        recipient: Some(recipient.to_string()),
    };

    let outcome = env
        .flow
        .run(&details, Some(&connection), transfer("1", "not-an-address"))
        .await;
    assert_eq!(outcome, FlowOutcome::Rejected);
    assert_eq!(env.messages(), vec!["Invalid recipient address"]);

    let outcome = env
        .flow
        .run(&details, Some(&connection), transfer("1001", OTHER_WALLET))
        .await;
    assert_eq!(outcome, FlowOutcome::Rejected);
    assert_eq!(env.messages(), vec!["Maximum amount to transfer is 1,000"]);

    let outcome = env
        .flow
        .run(&details, Some(&connection), transfer("0", OTHER_WALLET))
        .await;
    assert_eq!(outcome, FlowOutcome::Rejected);
    assert_eq!(env.messages(), vec!["Minimum amount to transfer is 1 DEV"]);

    assert_eq!(env.dev_balance(), 1000 * ONE_DEV);
}
