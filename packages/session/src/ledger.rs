//! Comments this session has already flagged.
//!
//! Stored as a JSON array of comment ids under `tk_flagged_<session>`.
//! The server keeps no per-session record of flags, so this list is the
//! only thing stopping a reader from flagging the same comment twice.

use crate::kv::KeyValueStore;

/// Client-local key of the flagged-comment list for `session`.
pub fn flagged_key(session: &str) -> String {
    format!("tk_flagged_{session}")
}

/// `true` if `session` has already flagged `comment_id`.
///
/// An unreadable store reads as "not flagged".
pub fn has_flagged<S>(store: &S, session: &str, comment_id: &str) -> bool
where
    S: KeyValueStore + ?Sized,
{
    load(store, session).iter().any(|id| id == comment_id)
}

/// Add `comment_id` to the session's list. Idempotent.
pub fn record_flag<S>(store: &S, session: &str, comment_id: &str)
where
    S: KeyValueStore + ?Sized,
{
    let mut ids = load(store, session);
    if ids.iter().any(|id| id == comment_id) {
        return;
    }
    ids.push(comment_id.to_string());

    let key = flagged_key(session);
    match serde_json::to_string(&ids) {
        Ok(raw) => {
            if let Err(e) = store.set(&key, &raw) {
                tracing::warn!(key, "could not persist flag ledger: {e}");
            }
        }
        Err(e) => tracing::warn!(key, "could not encode flag ledger: {e}"),
    }
}

fn load<S: KeyValueStore + ?Sized>(store: &S, session: &str) -> Vec<String> {
    match store.get(&flagged_key(session)) {
        Ok(raw) => raw
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!("flag ledger unreadable: {e}");
            Vec::new()
        }
    }
}
