//! WebAssembly bindings for the Advocacy Commons session layer.
//!
//! Exposes the anonymous session, the comment and flag rate limits, and the
//! flagged-comment ledger to JavaScript via `wasm-bindgen`. State lives in
//! `window.localStorage` under the same keys the site has always used
//! (`tk_sessionId`, `tk_commentSubmissions`, `tk_commentFlags`,
//! `tk_flagged_<session>`), so existing visitors keep their session.
//!
//! ```js
//! import init, { getSessionId, canSubmitComment, recordCommentSubmission } from './advocacy_commons_wasm.js';
//! await init();
//!
//! const check = JSON.parse(canSubmitComment());
//! if (!check.allowed) {
//!   showError(`${check.message} (${check.remaining}s)`);
//! } else {
//!   await client.create({ _type: 'comment', sessionId: getSessionId(), ... });
//!   recordCommentSubmission();
//! }
//! ```
//!
//! A few pure helpers ([`validate_comment`], [`validate_inline_comment`],
//! [`validate_suggestion`], [`relative_time`], [`flag_transition`]) let the
//! page apply the same rules as the CLI before it talks to the content store.

mod storage;

use advocacy_commons::{apply_flag, ModerationState};
use advocacy_commons_session::{RateDecision, SessionGuard};
use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

pub use storage::BrowserStorage;
use storage::LocalStore;

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn guard() -> SessionGuard<LocalStore> {
    setup();
    SessionGuard::new(LocalStore::detect())
}

fn to_js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// `{ "allowed": true }` or `{ "allowed": false, "message": ..., "remaining": secs }`.
fn decision_json(decision: RateDecision) -> String {
    let obj = match decision {
        RateDecision::Allowed => serde_json::json!({ "allowed": true }),
        RateDecision::Denied { message, retry_after_secs } => serde_json::json!({
            "allowed":   false,
            "message":   message,
            "remaining": retry_after_secs,
        }),
    };
    obj.to_string()
}

// ── Session ───────────────────────────────────────────────────────────────────

/// This browser's anonymous session id, created on first call.
#[wasm_bindgen(js_name = getSessionId)]
pub fn get_session_id() -> String {
    guard().session_id()
}

/// Whether another comment may be posted now. Returns a JSON string.
#[wasm_bindgen(js_name = canSubmitComment)]
pub fn can_submit_comment() -> String {
    decision_json(guard().can_submit_comment())
}

#[wasm_bindgen(js_name = recordCommentSubmission)]
pub fn record_comment_submission() {
    guard().record_comment_submission()
}

/// Whether another flag may be raised today. Returns a JSON string.
#[wasm_bindgen(js_name = canFlagComment)]
pub fn can_flag_comment() -> String {
    decision_json(guard().can_flag_comment())
}

#[wasm_bindgen(js_name = recordFlagSubmission)]
pub fn record_flag_submission() {
    guard().record_flag_submission()
}

#[wasm_bindgen(js_name = hasUserFlaggedComment)]
pub fn has_user_flagged_comment(comment_id: &str) -> bool {
    guard().has_flagged_comment(comment_id)
}

#[wasm_bindgen(js_name = recordCommentFlag)]
pub fn record_comment_flag(comment_id: &str) {
    guard().record_comment_flag(comment_id)
}

// ── Pure helpers ──────────────────────────────────────────────────────────────

/// Trim and check a comment body. Returns the text to store or throws the
/// message to show.
#[wasm_bindgen(js_name = validateComment)]
pub fn validate_comment(text: &str) -> Result<String, JsValue> {
    setup();
    advocacy_commons::validate_comment_text(text).map_err(to_js_err)
}

/// [`validate_comment`] for comments anchored to a passage, which have a
/// 500-character limit.
#[wasm_bindgen(js_name = validateInlineComment)]
pub fn validate_inline_comment(text: &str) -> Result<String, JsValue> {
    setup();
    advocacy_commons::validate_inline_comment_text(text).map_err(to_js_err)
}

/// Check the suggestion sent with a vote. Returns the trimmed suggestion to
/// store (`undefined` for helpful votes) or throws.
#[wasm_bindgen(js_name = validateSuggestion)]
pub fn validate_suggestion(helpful: bool, suggestion: Option<String>) -> Result<Option<String>, JsValue> {
    setup();
    advocacy_commons::validate_suggestion(helpful, suggestion.as_deref()).map_err(to_js_err)
}

/// "just now", "5m ago", ... for an RFC 3339 timestamp such as `_createdAt`.
///
/// `now` defaults to the current time.
#[wasm_bindgen(js_name = relativeTime)]
pub fn relative_time(created_at: &str, now: Option<String>) -> Result<String, JsValue> {
    setup();
    let created = parse_ts(created_at)?;
    let now = match now {
        Some(n) => parse_ts(&n)?,
        None => Utc::now(),
    };
    Ok(advocacy_commons::render::relative_time(created, now))
}

/// The state after one more flag, as a JSON string:
///
/// ```json
/// { "flagCount": 5, "isFlagged": true, "newlyHidden": true }
/// ```
#[wasm_bindgen(js_name = flagTransition)]
pub fn flag_transition(flag_count: u32, is_flagged: bool) -> String {
    setup();
    let t = apply_flag(flag_count, ModerationState::from_hidden(is_flagged));
    serde_json::json!({
        "flagCount":   t.flag_count,
        "isFlagged":   t.is_flagged(),
        "newlyHidden": t.newly_hidden,
    })
    .to_string()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_ts(s: &str) -> Result<DateTime<Utc>, JsValue> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| JsValue::from_str(&format!("invalid timestamp {s:?}: {e}")))
}
