//! Extraction of exclusion-rejected hosts from free-text scan notes.
//!
//! The service reports a host it refused to scan with a note such as
//! `Rejected attempt to scan 10.0.0.5, as it violates user-defined rules`.
//! A change in that wording only needs to be handled here.

use once_cell::sync::Lazy;
use regex::Regex;
use rollover_core::Target;

static REJECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Rejected attempt to scan ([0-9.:]+), as it violates user-defined rules")
        .expect("rejected-host pattern compiles")
});

/// Every rejected address in `message`, in order of appearance.
pub fn rejected_hosts(message: &str) -> Vec<Target> {
    REJECTED
        .captures_iter(message)
        .filter_map(|c| c.get(1))
        .map(|m| Target(m.as_str().to_string()))
        .collect()
}
