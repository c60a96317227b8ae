//! Moderation gate contract for incoming queries.
//!
//! The classifier itself lives outside this service; this module defines
//! the predicate the front end consults before a fetch, a permissive
//! default implementation, and the timed-suspension bookkeeping gate
//! implementations share.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;

/// Outcome of a moderation check
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    pub allowed: bool,
    pub user_message: Option<String>,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            ..Default::default()
        }
    }

    pub fn deny(user_message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            user_message: Some(user_message.into()),
            reason: Some(reason.into()),
        }
    }
}

/// Predicate consulted before any fetch is attempted. A denied query must
/// not reach the scraper at all.
#[async_trait]
pub trait ModerationGate: Send + Sync {
    async fn allowed(&self, query: &str, caller_id: u64) -> Verdict;
}

/// Gate that allows everything; the default wiring when no external
/// classifier is configured.
pub struct AllowAll;

#[async_trait]
impl ModerationGate for AllowAll {
    async fn allowed(&self, _query: &str, _caller_id: u64) -> Verdict {
        Verdict::allow()
    }
}

/// Gate that rejects suspended callers before delegating to an inner gate.
/// An external classifier slots in as the inner gate and records
/// suspensions on the ledger.
pub struct SuspensionGate<G> {
    ledger: SuspensionLedger,
    inner: G,
}

impl<G: ModerationGate> SuspensionGate<G> {
    pub fn new(inner: G) -> Self {
        Self {
            ledger: SuspensionLedger::new(),
            inner,
        }
    }
}

#[async_trait]
impl<G: ModerationGate> ModerationGate for SuspensionGate<G> {
    async fn allowed(&self, query: &str, caller_id: u64) -> Verdict {
        if let Some((minutes, reason)) = self.ledger.check(caller_id).await {
            return Verdict::deny(
                format!("You are suspended for {} more minutes.", minutes),
                reason,
            );
        }
        self.inner.allowed(query, caller_id).await
    }
}

#[derive(Debug, Clone)]
struct Suspension {
    expiry: DateTime<Utc>,
    reason: String,
}

/// In-memory register of temporarily suspended callers
pub struct SuspensionLedger {
    suspended: Mutex<HashMap<u64, Suspension>>,
}

impl SuspensionLedger {
    pub fn new() -> Self {
        Self {
            suspended: Mutex::new(HashMap::new()),
        }
    }

    /// Suspend a caller for the given duration
    #[allow(dead_code)]
    pub async fn suspend(&self, caller_id: u64, reason: impl Into<String>, duration: Duration) {
        let reason = reason.into();
        let expiry = Utc::now() + duration;
        info!(
            "Caller {} suspended until {} for reason: {}",
            caller_id, expiry, reason
        );
        self.suspended
            .lock()
            .await
            .insert(caller_id, Suspension { expiry, reason });
    }

    /// Active suspension for a caller, if any; expired entries are removed.
    /// Returns whole minutes remaining (floor 1) and the recorded reason.
    pub async fn check(&self, caller_id: u64) -> Option<(i64, String)> {
        let mut suspended = self.suspended.lock().await;
        let suspension = suspended.get(&caller_id)?;

        let remaining = suspension.expiry - Utc::now();
        if remaining <= Duration::zero() {
            suspended.remove(&caller_id);
            return None;
        }

        Some((remaining.num_minutes().max(1), suspension.reason.clone()))
    }
}

impl Default for SuspensionLedger {
    fn default() -> Self {
        Self::new()
    }
}
