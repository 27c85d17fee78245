//! Call session store.
//!
//! One session per active call, keyed by call id. Webhook deliveries for the
//! same call can arrive concurrently, out of order, or duplicated, so the
//! merge + dispatched-flag check + claim happens under one lock. The lock is
//! never held across I/O; the gate performs the collaborator call after the
//! claim succeeds.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Result of an atomic merge-and-claim attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// Required fields still missing; they are expected in a later event.
    Incomplete { missing: Vec<String> },
    /// This call already fired its one dispatch.
    AlreadyDispatched,
    /// Fields complete; the caller now owns the single dispatch for this
    /// call. The claim is never rolled back, even if the dispatch fails.
    Claimed(BTreeMap<String, String>),
}

#[derive(Debug)]
struct CallSession {
    variables: BTreeMap<String, String>,
    dispatched: bool,
    last_seen: Instant,
}

impl CallSession {
    fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
            dispatched: false,
            last_seen: Instant::now(),
        }
    }
}

/// Thread-safe map of call id to session state.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, CallSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge variables into the session without attempting a claim.
    /// Union semantics: new keys overwrite, absent keys never erase.
    pub fn merge(&self, call_id: &str, variables: &BTreeMap<String, String>) {
        let mut sessions = self.inner.lock().unwrap();
        let session = sessions
            .entry(call_id.to_owned())
            .or_insert_with(CallSession::new);
        session.last_seen = Instant::now();
        session
            .variables
            .extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Merge variables, then atomically check completeness and claim the
    /// dispatch. Exactly one caller per call id can ever get `Claimed`.
    pub fn merge_and_claim(
        &self,
        call_id: &str,
        variables: &BTreeMap<String, String>,
        required: &[&str],
    ) -> ClaimOutcome {
        let mut sessions = self.inner.lock().unwrap();
        let session = sessions
            .entry(call_id.to_owned())
            .or_insert_with(CallSession::new);
        session.last_seen = Instant::now();
        session
            .variables
            .extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));

        if session.dispatched {
            return ClaimOutcome::AlreadyDispatched;
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|field| {
                session
                    .variables
                    .get(**field)
                    .is_none_or(|value| value.trim().is_empty())
            })
            .map(|field| (*field).to_owned())
            .collect();

        if !missing.is_empty() {
            return ClaimOutcome::Incomplete { missing };
        }

        session.dispatched = true;
        ClaimOutcome::Claimed(session.variables.clone())
    }

    /// Drop the session for a call that has ended. Returns whether an
    /// entry existed.
    pub fn end_session(&self, call_id: &str) -> bool {
        self.inner.lock().unwrap().remove(call_id).is_some()
    }

    /// Drop sessions idle longer than `ttl`. Returns how many were evicted.
    pub fn evict_stale(&self, ttl: Duration) -> usize {
        let mut sessions = self.inner.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen.elapsed() < ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
