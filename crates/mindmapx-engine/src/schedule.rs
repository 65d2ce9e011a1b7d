//! Scheduling primitives behind the sync loop: a leading-edge debouncer for
//! change notifications and a gate that keeps at most one pass in flight.

use std::time::{Duration, Instant};

/// Leading-edge debouncer with a capacity-one pending flag.
///
/// The first notification fires immediately and opens a cooldown window.
/// Notifications inside the window are suppressed; with `trailing` enabled
/// they leave a pending flag behind, which fires once when the window closes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    trailing: bool,
    cooldown_until: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    pub fn new(window: Duration, trailing: bool) -> Self {
        Self {
            window,
            trailing,
            cooldown_until: None,
            pending: false,
        }
    }

    /// Record a notification. Returns true when it should fire now.
    pub fn notify(&mut self, now: Instant) -> bool {
        if self.in_cooldown(now) {
            self.pending |= self.trailing;
            return false;
        }
        self.cooldown_until = Some(now + self.window);
        self.pending = false;
        true
    }

    /// Returns true once when the cooldown has expired with a notification pending.
    ///
    /// Firing the pending notification opens a fresh cooldown window.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.in_cooldown(now) {
            return false;
        }
        self.cooldown_until = None;
        if std::mem::take(&mut self.pending) {
            self.cooldown_until = Some(now + self.window);
            return true;
        }
        false
    }

    /// When the host should next call [`Debouncer::poll`]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.cooldown_until.filter(|_| self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Forget the window and any pending notification
    pub fn reset(&mut self) {
        self.cooldown_until = None;
        self.pending = false;
    }

    fn in_cooldown(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Two-state gate: at most one pass runs, and triggers that arrive while it
/// runs collapse into a single pending rerun.
#[derive(Debug, Clone)]
pub struct SyncGate {
    state: SyncState,
    pending: bool,
}

impl Default for SyncGate {
    fn default() -> Self {
        Self {
            state: SyncState::Idle,
            pending: false,
        }
    }
}

impl SyncGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Syncing, consuming any pending rerun. While Syncing, records a
    /// pending rerun and returns false.
    pub fn try_begin(&mut self) -> bool {
        match self.state {
            SyncState::Idle => {
                self.state = SyncState::Syncing;
                self.pending = false;
                true
            }
            SyncState::Syncing => {
                self.pending = true;
                false
            }
        }
    }

    /// Syncing -> Idle. Returns whether a rerun is owed.
    pub fn finish(&mut self) -> bool {
        self.state = SyncState::Idle;
        self.pending
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
