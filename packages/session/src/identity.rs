//! Anonymous session identity.
//!
//! Readers never sign in. Each browser (or CLI state file) gets one opaque
//! identifier the first time it is needed, and every comment, flag and vote
//! it writes carries that identifier.
//!
//! ```text
//! session_1739880000000_k3j9x0q2a
//!         └ unix millis ┘ └ 9 × base36 ┘
//! ```

use rand::Rng;

use crate::clock::Clock;
use crate::kv::KeyValueStore;

/// Client-local key holding the session identifier.
pub const SESSION_KEY: &str = "tk_sessionId";

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Build a new identifier for a session created at `now_millis`.
pub fn generate_session_id(now_millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{now_millis}_{suffix}")
}

/// Return this client's session identifier, creating and persisting it on
/// first use.
///
/// Never fails. When the store cannot be read or written a fresh identifier
/// is returned, so an unusable store yields a new identity on every call.
pub fn session_id<S, C>(store: &S, clock: &C) -> String
where
    S: KeyValueStore + ?Sized,
    C: Clock + ?Sized,
{
    match store.get(SESSION_KEY) {
        Ok(Some(id)) if !id.is_empty() => return id,
        Ok(_) => {}
        Err(e) => {
            tracing::warn!("session store unreadable, using ephemeral session: {e}");
            return generate_session_id(clock.now_millis());
        }
    }

    let id = generate_session_id(clock.now_millis());
    if let Err(e) = store.set(SESSION_KEY, &id) {
        tracing::warn!("could not persist session id: {e}");
    } else {
        tracing::debug!(session = %id, "created session");
    }
    id
}
