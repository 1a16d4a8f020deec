//! Process-wide mutable state shared by the pipeline and the coordinator.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

use avanza::CourtageClass;

/// Cache of the account's last confirmed courtage class.
#[derive(Debug, Default)]
struct TierState {
    /// Last class confirmed by a successful read or switch.
    last_known: Option<CourtageClass>,
    /// Time of the last successful read (engine-relative ms).
    last_checked_ms: Option<u64>,
}

/// Shared session state: captured credentials, tier cache, switch guard.
///
/// Constructed once per engine (or per test) and passed by `Arc`. All
/// mutation happens behind short-lived locks on the event-processing task,
/// plus the spawned reset task.
#[derive(Debug, Default)]
pub struct SessionContext {
    credentials: Mutex<HashMap<String, String>>,
    tier: Mutex<TierState>,
    /// True while a switch call is in flight.
    pub(crate) switch_in_flight: AtomicBool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge observed headers into the captured credential set, overwriting
    /// on name collision. The set is never cleared during a session.
    pub fn merge_credentials<I>(&self, headers: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut creds = self.credentials.lock().unwrap();
        for (name, value) in headers {
            creds.insert(name, value);
        }
    }

    /// Snapshot of the captured credential headers.
    pub fn credential_headers(&self) -> HashMap<String, String> {
        self.credentials.lock().unwrap().clone()
    }

    pub fn last_known(&self) -> Option<CourtageClass> {
        self.tier.lock().unwrap().last_known.clone()
    }

    pub fn last_checked_ms(&self) -> Option<u64> {
        self.tier.lock().unwrap().last_checked_ms
    }

    /// Record a successful class read at `now_ms`.
    pub fn record_read(&self, class: CourtageClass, now_ms: u64) {
        let mut tier = self.tier.lock().unwrap();
        tier.last_known = Some(class);
        tier.last_checked_ms = Some(now_ms);
    }

    /// Record a confirmed switch. The read timestamp is left alone: it
    /// gates reads, not switches.
    pub fn record_switch(&self, class: CourtageClass) {
        self.tier.lock().unwrap().last_known = Some(class);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_merge_with_overwrite() {
        let session = SessionContext::new();
        session.merge_credentials([
            ("x-securitytoken".to_string(), "a".to_string()),
            ("cookie".to_string(), "s=1".to_string()),
        ]);
        session.merge_credentials([("x-securitytoken".to_string(), "b".to_string())]);

        let headers = session.credential_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-securitytoken"], "b");
        assert_eq!(headers["cookie"], "s=1");
    }

    #[test]
    fn test_record_read_sets_class_and_timestamp() {
        let session = SessionContext::new();
        assert!(session.last_known().is_none());

        session.record_read(CourtageClass::Small, 1_500);
        assert_eq!(session.last_known(), Some(CourtageClass::Small));
        assert_eq!(session.last_checked_ms(), Some(1_500));
    }

    #[test]
    fn test_record_switch_keeps_read_timestamp() {
        let session = SessionContext::new();
        session.record_read(CourtageClass::Mini, 1_000);
        session.record_switch(CourtageClass::Medium);

        assert_eq!(session.last_known(), Some(CourtageClass::Medium));
        assert_eq!(session.last_checked_ms(), Some(1_000));
    }
}
