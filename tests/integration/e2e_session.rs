//! Session persistence and jetton loading.

use tempfile::TempDir;

use jetton_console::domain::{
    jetton::{JettonStore, fetch_details},
    services::Connection,
};
use jetton_console::infra::{
    devnet::{DEV_JETTON, DEV_WALLET, DevLedger},
    store::{Session, Store},
};

use super::OTHER_WALLET;

#[test]
fn test_session_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("devnet").join("session.mdb");

    {
        let store = Store::with_path(path.clone()).unwrap();
        store
            .save_session(&Session {
                wallet_address: Some(DEV_WALLET.to_string()),
                jetton_master: Some(DEV_JETTON.to_string()),
            })
            .unwrap();
    }

    let store = Store::with_path(path).unwrap();
    let session = store.load_session().unwrap();
    assert_eq!(session.wallet_address.as_deref(), Some(DEV_WALLET));
    assert_eq!(session.jetton_master.as_deref(), Some(DEV_JETTON));
}

#[tokio::test]
async fn test_fetched_details_apply_to_store() {
    let ledger = DevLedger::new();
    let mut jettons = JettonStore::new(Some(DEV_JETTON.to_string()));

    let details = fetch_details(&ledger, DEV_JETTON, Some(&Connection::new(DEV_WALLET)))
        .await
        .unwrap();
    assert_eq!(details.symbol, "DEV");
    assert_eq!(details.formatted_balance().as_deref(), Some("1,000"));
    assert!(details.is_my_wallet);
    assert!(jettons.apply(details.clone()));
    assert_eq!(jettons.details(), Some(&details));

    // Without a wallet only the jetton itself is known.
    let anonymous = fetch_details(&ledger, DEV_JETTON, None).await.unwrap();
    assert!(!anonymous.is_my_wallet);
    assert!(anonymous.balance.is_none());

    // Details for another jetton are ignored.
    let mut foreign = details.clone();
    foreign.master_address = OTHER_WALLET.to_string();
    assert!(!jettons.apply(foreign));

    // Switching jetton drops stale details.
    jettons.set_master_address(Some(OTHER_WALLET.to_string()));
    assert!(jettons.details().is_none());
    assert!(fetch_details(&ledger, OTHER_WALLET, None).await.is_err());
}
