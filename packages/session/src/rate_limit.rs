//! Sliding-window rate limits kept in client-local storage.
//!
//! Each limited action has a log under its own key: a JSON object mapping
//! session id to the unix-millisecond timestamps of accepted actions.
//!
//! ```json
//! { "session_1739880000000_k3j9x0q2a": [1739880001000, 1739880011000] }
//! ```
//!
//! Every check and every record first drops entries at least one window
//! old and writes the pruned log back. An action is allowed while the
//! pruned log holds fewer entries than the quota.
//!
//! These limits are a courtesy to honest readers, not a security boundary:
//! clearing storage resets them.

use std::collections::BTreeMap;

use crate::kv::{KeyValueStore, KvError};

/// One rate-limited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Client-local key holding the timestamp log.
    pub key: &'static str,
    pub window_ms: i64,
    pub quota: usize,
    /// Shown to the reader on denial.
    pub message: &'static str,
}

/// At most 3 comments per rolling minute.
pub const COMMENT_POLICY: RatePolicy = RatePolicy {
    key: "tk_commentSubmissions",
    window_ms: 60_000,
    quota: 3,
    message: "You can submit at most 3 comments per minute. Please wait before posting again.",
};

/// At most 10 flags per rolling day.
pub const FLAG_POLICY: RatePolicy = RatePolicy {
    key: "tk_commentFlags",
    window_ms: 86_400_000,
    quota: 10,
    message: "You have reached your daily flag limit. Please try again tomorrow.",
};

/// Outcome of a rate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Denied {
        message: String,
        /// Whole seconds until the oldest logged action leaves the window.
        retry_after_secs: u64,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

type TimestampLog = BTreeMap<String, Vec<i64>>;

/// Decide whether `session` may perform the action governed by `policy`.
///
/// A store that cannot be read allows the action.
pub fn check<S>(store: &S, policy: &RatePolicy, session: &str, now: i64) -> RateDecision
where
    S: KeyValueStore + ?Sized,
{
    let mut log = match load(store, policy.key) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!(key = policy.key, "rate log unreadable, allowing: {e}");
            return RateDecision::Allowed;
        }
    };

    let pruned = prune(&mut log, session, policy.window_ms, now);
    if pruned {
        persist(store, policy.key, &log);
    }

    let entries = log.get(session).map(Vec::as_slice).unwrap_or_default();
    if entries.len() < policy.quota {
        return RateDecision::Allowed;
    }

    let oldest = entries.iter().copied().min().unwrap_or(now);
    let remaining = policy.window_ms - (now - oldest);
    RateDecision::Denied {
        message: policy.message.to_string(),
        retry_after_secs: (remaining.max(0) as u64).div_ceil(1000),
    }
}

/// Log an accepted action for `session` at `now`.
///
/// Failures are logged and otherwise ignored.
pub fn record<S>(store: &S, policy: &RatePolicy, session: &str, now: i64)
where
    S: KeyValueStore + ?Sized,
{
    let mut log = match load(store, policy.key) {
        Ok(log) => log,
        Err(e) => {
            tracing::warn!(key = policy.key, "rate log unreadable, not recording: {e}");
            return;
        }
    };
    prune(&mut log, session, policy.window_ms, now);
    log.entry(session.to_string()).or_default().push(now);
    persist(store, policy.key, &log);
}

/// Missing or unparsable logs read as empty.
fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<TimestampLog, KvError> {
    Ok(store
        .get(key)?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default())
}

fn persist<S: KeyValueStore + ?Sized>(store: &S, key: &str, log: &TimestampLog) {
    let raw = match serde_json::to_string(log) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, "could not encode rate log: {e}");
            return;
        }
    };
    if let Err(e) = store.set(key, &raw) {
        tracing::warn!(key, "could not persist rate log: {e}");
    }
}

/// Drop this session's entries with `now - t >= window`. Returns whether
/// anything changed.
fn prune(log: &mut TimestampLog, session: &str, window_ms: i64, now: i64) -> bool {
    let Some(entries) = log.get_mut(session) else {
        return false;
    };
    let before = entries.len();
    entries.retain(|t| now - t < window_ms);
    let changed = entries.len() != before;
    if entries.is_empty() {
        log.remove(session);
    }
    changed
}
