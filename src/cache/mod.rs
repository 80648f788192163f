//! Rendered page cache
//!
//! Pages are kept for a fixed revalidation window. A request for a page older
//! than the window regenerates it once; concurrent requests for the same route
//! wait for that regeneration instead of fetching again. If regeneration fails
//! the stale page keeps being served.
//!
//! The number of routes is capped. A new route first sweeps idle slots that
//! are empty or stale, then evicts the oldest idle page if still at capacity.

use anyhow::Result;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tokio::time::Instant;

/// A rendered page and when it was generated
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub status: StatusCode,
    pub html: String,
    generated_at: Instant,
}

impl CachedPage {
    pub fn new(status: StatusCode, html: String) -> Self {
        Self {
            status,
            html,
            generated_at: Instant::now(),
        }
    }

    /// A `200 OK` page
    pub fn ok(html: String) -> Self {
        Self::new(StatusCode::OK, html)
    }

    /// Time since generation
    pub fn age(&self) -> Duration {
        self.generated_at.elapsed()
    }
}

type Slot = Arc<tokio::sync::Mutex<Option<CachedPage>>>;

/// Route-keyed cache of rendered pages
pub struct PageCache {
    window: Duration,
    capacity: usize,
    slots: Mutex<HashMap<String, Slot>>,
}

impl PageCache {
    /// Create a cache whose pages go stale after `window`, holding at most
    /// `capacity` routes
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(key) {
            return slot.clone();
        }

        if slots.len() >= self.capacity {
            self.evict(&mut slots);
        }
        let slot = Slot::default();
        slots.insert(key.to_string(), slot.clone());
        slot
    }

    /// Make room for one more route. Slots being rendered are never touched.
    fn evict(&self, slots: &mut HashMap<String, Slot>) {
        let before = slots.len();
        let mut oldest: Option<(String, Instant)> = None;

        slots.retain(|key, slot| {
            let Ok(entry) = slot.try_lock() else {
                return true;
            };
            let keep = match entry.as_ref() {
                None => false,
                Some(page) if page.age() >= self.window => false,
                Some(page) => {
                    if oldest.as_ref().map_or(true, |(_, at)| page.generated_at < *at) {
                        oldest = Some((key.clone(), page.generated_at));
                    }
                    true
                }
            };
            keep
        });

        if slots.len() >= self.capacity {
            if let Some((key, _)) = oldest {
                slots.remove(&key);
            }
        }
        tracing::debug!("Evicted {} cached pages", before - slots.len());
    }

    /// Drop the slot for `key` if it holds no page and nobody is using it
    pub fn remove_if_empty(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let idle_and_empty = slots
            .get(key)
            .and_then(|slot| slot.try_lock().ok().map(|entry| entry.is_none()))
            .unwrap_or(false);
        if idle_and_empty {
            slots.remove(key);
        }
    }

    /// Claim an empty, idle slot for a render running elsewhere.
    ///
    /// Returns `None` when `key` already has a page or is being rendered.
    /// Requests for `key` wait until the claim is filled or dropped.
    pub fn try_claim(&self, key: &str) -> Option<Claim> {
        let guard = self.slot(key).try_lock_owned().ok()?;
        if guard.is_some() {
            return None;
        }
        Some(Claim(guard))
    }

    /// Serve a fresh page for `key`, calling `render` when it is missing or stale
    pub async fn get_or_render<F, Fut>(&self, key: &str, render: F) -> Result<CachedPage>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedPage>>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(page) = entry.as_ref() {
            if page.age() < self.window {
                tracing::debug!("Cache hit: {}", key);
                return Ok(page.clone());
            }
            tracing::info!("Revalidating {} ({}s old)", key, page.age().as_secs());
        } else {
            tracing::info!("Rendering {}", key);
        }

        match render().await {
            Ok(page) => {
                *entry = Some(page.clone());
                Ok(page)
            }
            Err(e) => match entry.as_ref() {
                Some(stale) => {
                    tracing::warn!("Regenerating {} failed, serving stale page: {:#}", key, e);
                    Ok(stale.clone())
                }
                None => {
                    drop(entry);
                    self.remove_if_empty(key);
                    Err(e)
                }
            },
        }
    }

    /// Store a page rendered elsewhere (static generation)
    pub async fn insert(&self, key: &str, page: CachedPage) {
        let slot = self.slot(key);
        *slot.lock().await = Some(page);
    }

    /// Number of routes with a slot
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive hold on an empty cache slot
pub struct Claim(OwnedMutexGuard<Option<CachedPage>>);

impl Claim {
    /// Store the rendered page and release the slot
    pub fn fill(mut self, page: CachedPage) {
        *self.0 = Some(page);
    }
}
