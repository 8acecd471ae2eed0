use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;

use crate::domain::{
    flow::{ActionRequest, FlowOutcome},
    jetton::{JettonDetails, JettonOp},
    notification::{Notification, Notifier},
};

/// Actions that can be triggered by user input or internal events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Tick,
    Resize(u16, u16),
    Suspend,
    Quit,

    // Wallet
    ShowConnect,
    ConnectWallet(String),
    DisconnectWallet,

    // Jetton
    OpenJetton(String),
    RefreshDetails,
    DetailsLoaded(JettonDetails),

    // Burn, mint and transfer
    Submit(ActionRequest),
    ActionFinished(JettonOp, FlowOutcome),

    Notify(Notification),
    DismissNotifications,
}

/// Notifications raised off the UI task come back as actions.
#[derive(Debug, Clone)]
pub struct ActionNotifier(pub UnboundedSender<Action>);

impl Notifier for ActionNotifier {
    fn notify(&self, notification: Notification) {
        // The receiver only goes away on shutdown.
        let _ = self.0.send(Action::Notify(notification));
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn test_notifier_queues_notify_action() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = ActionNotifier(tx);
        notifier.notify(Notification::success("Successfully burned 1 DEV"));
        assert_eq!(
            rx.try_recv().unwrap(),
            Action::Notify(Notification::success("Successfully burned 1 DEV"))
        );

        drop(rx);
        // A closed channel is ignored.
        notifier.notify(Notification::info("late"));
    }
}
