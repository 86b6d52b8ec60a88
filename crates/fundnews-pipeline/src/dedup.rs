//! Run-scoped duplicate suppression.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};

const ITEM_ID_LEN: usize = 16;

/// First 16 hex characters of `sha256(key + salt)`.
///
/// Feed items pass `(url, headline)`; timestamp-keyed sources pass
/// `(url, published)`.
#[must_use]
pub fn item_id(key: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(ITEM_ID_LEN);
    for byte in digest.iter().take(ITEM_ID_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Thread-safe set of item ids already claimed during this run.
#[derive(Debug, Default)]
pub struct DedupGate {
    seen: Mutex<HashSet<String>>,
}

impl DedupGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seen(&self, id: &str) -> bool {
        self.lock().contains(id)
    }

    pub fn mark_seen(&self, id: &str) {
        self.lock().insert(id.to_owned());
    }

    /// Claim `id`. Returns `true` only for the first caller.
    pub fn check_and_mark(&self, id: &str) -> bool {
        self.lock().insert(id.to_owned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned set is still a valid set of strings.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn item_id_is_sixteen_lowercase_hex_chars() {
        let id = item_id("https://news.example/a", "Headline");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn item_id_matches_sha256_prefix() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(item_id("ab", "c"), "ba7816bf8f01cfea");
    }

    #[test]
    fn item_id_depends_on_both_parts() {
        let a = item_id("https://news.example/a", "One");
        let b = item_id("https://news.example/a", "Two");
        assert_ne!(a, b);
        assert_eq!(a, item_id("https://news.example/a", "One"));
    }

    #[test]
    fn mark_then_seen() {
        let gate = DedupGate::new();
        assert!(!gate.seen("x"));
        gate.mark_seen("x");
        assert!(gate.seen("x"));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn check_and_mark_claims_once() {
        let gate = DedupGate::new();
        assert!(gate.check_and_mark("x"));
        assert!(!gate.check_and_mark("x"));
        assert!(gate.check_and_mark("y"));
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        let gate = Arc::new(DedupGate::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.check_and_mark("same"))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }
}
