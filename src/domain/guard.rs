//! Single-flight guard for chain-mutating actions.
//!
//! One guard is shared by every action control of a screen. At most one
//! action holds it; the holder's [`ActionPermit`] releases it on drop, so a
//! failed or panicking action never leaves the screen locked.
//!
//! Each acquisition takes a fresh ticket and the permit only releases the
//! guard while its own ticket is still the holder. A permit outliving an
//! explicit [`ActionGuard::finish`] can therefore never free a later holder.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

const FREE: u64 = 0;

#[derive(Debug, Default)]
struct GuardState {
    holder: AtomicU64,
    tickets: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct ActionGuard {
    state: Arc<GuardState>,
}

impl ActionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to begin an action. `None` means another action is running and
    /// the caller must do nothing.
    pub fn start(&self) -> Option<ActionPermit> {
        let ticket = self.state.tickets.fetch_add(1, Ordering::Relaxed).wrapping_add(1).max(1);
        self.state
            .holder
            .compare_exchange(FREE, ticket, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                debug!("action guard acquired (ticket {})", ticket);
                ActionPermit {
                    guard: self.clone(),
                    ticket,
                }
            })
    }

    /// Release unconditionally, whoever holds the guard.
    pub fn finish(&self) {
        if self.state.holder.swap(FREE, Ordering::AcqRel) != FREE {
            debug!("action guard released");
        }
    }

    pub fn in_progress(&self) -> bool {
        self.state.holder.load(Ordering::Acquire) != FREE
    }
}

/// Proof that the holder owns the guard; releases it when dropped.
#[derive(Debug)]
#[must_use = "dropping the permit releases the guard immediately"]
pub struct ActionPermit {
    guard: ActionGuard,
    ticket: u64,
}

impl ActionPermit {
    /// Release explicitly.
    pub fn finish(self) {}
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        let released = self
            .guard
            .state
            .holder
            .compare_exchange(self.ticket, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if released {
            debug!("action guard released (ticket {})", self.ticket);
        }
    }
}
