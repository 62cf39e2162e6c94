//! The per-client entry point tying storage, clock and policies together.

use crate::clock::{Clock, SystemClock};
use crate::kv::KeyValueStore;
use crate::rate_limit::{self, RateDecision, COMMENT_POLICY, FLAG_POLICY};
use crate::{identity, ledger};

/// Session identity, rate limits and flag ledger over one client-local store.
///
/// All methods are synchronous and never fail: storage problems degrade to
/// permissive answers and are logged.
#[derive(Debug)]
pub struct SessionGuard<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> SessionGuard<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> SessionGuard<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// This client's session identifier, created on first use.
    pub fn session_id(&self) -> String {
        identity::session_id(&self.store, &self.clock)
    }

    pub fn can_submit_comment(&self) -> RateDecision {
        rate_limit::check(&self.store, &COMMENT_POLICY, &self.session_id(), self.clock.now_millis())
    }

    pub fn record_comment_submission(&self) {
        rate_limit::record(&self.store, &COMMENT_POLICY, &self.session_id(), self.clock.now_millis())
    }

    pub fn can_flag_comment(&self) -> RateDecision {
        rate_limit::check(&self.store, &FLAG_POLICY, &self.session_id(), self.clock.now_millis())
    }

    pub fn record_flag_submission(&self) {
        rate_limit::record(&self.store, &FLAG_POLICY, &self.session_id(), self.clock.now_millis())
    }

    pub fn has_flagged_comment(&self, comment_id: &str) -> bool {
        ledger::has_flagged(&self.store, &self.session_id(), comment_id)
    }

    pub fn record_comment_flag(&self, comment_id: &str) {
        ledger::record_flag(&self.store, &self.session_id(), comment_id)
    }
}
