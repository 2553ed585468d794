//! # Result Cache
//! Process-scoped memoization of remote calls (news searches, completions).
//!
//! Entries are keyed by `(operation, args)` where `args` is serialized with
//! `serde_json` and hashed, and expire after a fixed TTL measured on an
//! injected [`Clock`] (absolute TTL, no sliding refresh). Calls sharing a key
//! are single-flight: the first caller computes while the others wait on the
//! key's slot and then read the stored value.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Source of "now" for TTL checks and day windows.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used by tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut g = self.now.lock().expect("manual clock mutex poisoned");
        *g += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("manual clock mutex poisoned")
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<Entry<V>>>>;

pub struct ResultCache<V> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, Slot<V>>>,
}

impl<V: Clone> ResultCache<V> {
    /// `name` labels the hit/miss counters (e.g. "news", "completions").
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the live value for `(operation, args)` or compute and store it.
    pub async fn memoize<A, F, Fut>(&self, operation: &str, args: &A, compute: F) -> V
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let res = self
            .try_memoize(operation, args, move || async move {
                Ok::<V, std::convert::Infallible>(compute().await)
            })
            .await;
        match res {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Fallible variant: only `Ok` values are stored, so a failed call is
    /// attempted again by the next caller.
    pub async fn try_memoize<A, F, Fut, E>(
        &self,
        operation: &str,
        args: &A,
        compute: F,
    ) -> Result<V, E>
    where
        A: Serialize + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let key = match cache_key(operation, args) {
            Ok(k) => k,
            Err(e) => {
                warn!(target: "cache", cache = self.name, operation, error = %e, "cache args not serializable; computing uncached");
                return compute().await;
            }
        };

        let slot = self.slot(&key);
        // Held across `compute` so identical keys never compute concurrently.
        let mut guard = slot.lock().await;

        if let Some(entry) = guard.as_ref() {
            if self.is_live(entry, self.clock.now()) {
                counter!("cache_hits_total", "cache" => self.name).increment(1);
                debug!(target: "cache", cache = self.name, %key, "hit");
                return Ok(entry.value.clone());
            }
        }

        counter!("cache_misses_total", "cache" => self.name).increment(1);
        debug!(target: "cache", cache = self.name, %key, "miss");

        let value = compute().await?;
        *guard = Some(Entry {
            value: value.clone(),
            inserted_at: self.clock.now(),
        });
        Ok(value)
    }

    /// Number of stored entries that are still live. Slots with a call in
    /// flight are not counted.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let slots = self.slots.lock().expect("cache mutex poisoned");
        slots
            .values()
            .filter(|slot| match slot.try_lock() {
                Ok(g) => g.as_ref().is_some_and(|e| self.is_live(e, now)),
                Err(_) => false,
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired and empty slots. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.lock().expect("cache mutex poisoned");
        let before = slots.len();
        slots.retain(|_, slot| match slot.try_lock() {
            // a caller holds the slot and has yet to lock it
            Ok(_) if Arc::strong_count(slot) > 1 => true,
            Ok(g) => g.as_ref().is_some_and(|e| self.is_live(e, now)),
            // in flight
            Err(_) => true,
        });
        before - slots.len()
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.lock().expect("cache mutex poisoned").len()
    }

    fn slot(&self, key: &str) -> Slot<V> {
        let mut slots = self.slots.lock().expect("cache mutex poisoned");
        slots.entry(key.to_string()).or_default().clone()
    }

    fn is_live(&self, entry: &Entry<V>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) < self.ttl
    }
}

/// Deterministic key: operation name plus a SHA-256 prefix of the JSON args.
pub fn cache_key<A: Serialize + ?Sized>(
    operation: &str,
    args: &A,
) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string(args)?;
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update([0u8]);
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(operation.len() + 33);
    out.push_str(operation);
    out.push(':');
    for b in digest.iter().take(16) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    Ok(out)
}
