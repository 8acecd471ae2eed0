//! Form submission wired into the action flow.

use std::time::Duration;

use jetton_console::domain::{
    flow::{AMOUNT_FIELD, ActionRequest, FlowOutcome, RECIPIENT_FIELD, transfer_fields},
    form::{FormEngine, SubmitOutcome},
    jetton::JettonOp,
    notification::{Notification, Severity},
    services::WalletConnection,
};
use jetton_console::infra::{
    devnet::DEV_WALLET,
    wallet::{ADDRESS_FIELD, WalletSession, connect_fields},
};

use super::{OTHER_WALLET, TestEnv};

#[tokio::test]
async fn test_submit_gates_then_runs_flow() {
    let env = TestEnv::new();
    let details = env.details(DEV_WALLET).await;
    let connection = TestEnv::dev_connection();
    let mut form = FormEngine::register(transfer_fields(&details)).unwrap();

    let outcome = form.handle_submit(false, |_| async { FlowOutcome::Denied }).await;
    assert_eq!(outcome, SubmitOutcome::NotConnected);
    assert!(form.errors().next().is_none());

    let outcome = form.handle_submit(true, |_| async { FlowOutcome::Denied }).await;
    let SubmitOutcome::Invalid(error) = outcome else {
        panic!("empty form submitted");
    };
    assert_eq!(error.field_name, RECIPIENT_FIELD);
    let notification = Notification::from(&error);
    assert_eq!(notification.severity, Severity::Warning);
    assert_eq!(notification.auto_dismiss, Some(Duration::from_millis(3000)));
    // Both fields failed, only the first is reported.
    assert_eq!(form.errors().count(), 2);

    // Typing after a failed submit re-validates the field.
    form.set_value(RECIPIENT_FIELD, OTHER_WALLET).unwrap();
    assert!(form.error(RECIPIENT_FIELD).is_none());
    assert!(form.error(AMOUNT_FIELD).is_some());
    form.set_value(AMOUNT_FIELD, "3").unwrap();
    assert!(form.error(AMOUNT_FIELD).is_none());

    let flow = &env.flow;
    let details = &details;
    let connection = &connection;
    let outcome = form
        .handle_submit(true, |values| async move {
            flow.run(
                details,
                Some(connection),
                ActionRequest::from_form(JettonOp::Transfer, &values),
            )
            .await
        })
        .await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Submitted(FlowOutcome::Completed { .. })
    ));
    assert_eq!(env.messages(), vec!["Successfully transferred 3 DEV"]);
}

#[test]
fn test_connect_form_connects_wallet() {
    let mut form = FormEngine::register(connect_fields()).unwrap();
    let mut wallet = WalletSession::new();

    form.set_value(ADDRESS_FIELD, format!(" {} ", DEV_WALLET)).unwrap();
    let values = form.submit().unwrap();
    wallet.connect(values.get(ADDRESS_FIELD).unwrap()).unwrap();

    assert_eq!(wallet.address(), Some(DEV_WALLET));
    assert!(wallet.connect("0:xyz").is_err());
    assert_eq!(wallet.address(), Some(DEV_WALLET));
}
