//! Parser warnings with colored terminal output.
//!
//! Provides deduplication so a document that repeats the same mistake a
//! thousand times produces one line on stderr. Every warning is also
//! forwarded to the [`log`] facade at `warn` level.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn once per unique `(component, message)` pair.
///
/// Returns `true` when this call actually printed the warning.
///
/// # Example
/// ```
/// use koala_common::warning::{clear_warnings, warn_once};
///
/// clear_warnings();
/// assert!(warn_once("HTML Parser", "Obsolete doctype."));
/// assert!(!warn_once("HTML Parser", "Obsolete doctype."));
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        log::warn!(target: "koala", "[{component}] {message}");
        eprintln!("{}", format!("[Koala {component}] ⚠ {message}").yellow());
    }
    should_print
}

/// Clear all recorded warnings (call before parsing a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
