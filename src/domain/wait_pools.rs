//! Pending-match storage.
//!
//! [`WaitPools`] holds the unconditional pool (clients open to anyone) and
//! one pool per interest tag. Pools are append-only at the tail; removal is
//! by value from anywhere. The struct is not synchronized on its own: it is
//! only ever touched inside the chat state lock, together with the
//! [`super::Registry`].

use std::collections::{BTreeMap, HashMap};

use super::ClientId;

/// Unconditional pool plus per-tag interest pools.
#[derive(Debug, Default)]
pub struct WaitPools {
    unconditional: Vec<ClientId>,
    by_interest: HashMap<String, Vec<ClientId>>,
}

impl WaitPools {
    /// Creates empty pools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the unconditional pool when `interests` is empty,
    /// otherwise to the pool of every tag in `interests`.
    pub fn enqueue(&mut self, id: &ClientId, interests: &[String]) {
        if interests.is_empty() {
            push_unique(&mut self.unconditional, id);
            return;
        }
        for tag in interests {
            push_unique(self.by_interest.entry(tag.clone()).or_default(), id);
        }
    }

    /// Removes `id` from whichever pools `interests` places it in.
    ///
    /// Removing an identifier that is not waiting is a no-op. Interest pools
    /// left empty are dropped.
    pub fn remove(&mut self, id: &ClientId, interests: &[String]) {
        if interests.is_empty() {
            self.unconditional.retain(|waiting| waiting != id);
            return;
        }
        for tag in interests {
            if let Some(pool) = self.by_interest.get_mut(tag) {
                pool.retain(|waiting| waiting != id);
                if pool.is_empty() {
                    self.by_interest.remove(tag);
                }
            }
        }
    }

    /// Returns the unconditional pool in arrival order.
    #[must_use]
    pub fn unconditional(&self) -> &[ClientId] {
        &self.unconditional
    }

    /// Returns the pool for `tag` in arrival order (empty if none).
    #[must_use]
    pub fn interest(&self, tag: &str) -> &[ClientId] {
        self.by_interest
            .get(tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns `true` if `id` waits in any pool.
    #[must_use]
    pub fn contains(&self, id: &ClientId) -> bool {
        self.unconditional.contains(id) || self.by_interest.values().any(|pool| pool.contains(id))
    }

    /// Returns the number of distinct pools `id` is waiting in.
    #[must_use]
    pub fn membership_count(&self, id: &ClientId) -> usize {
        usize::from(self.unconditional.contains(id))
            + self
                .by_interest
                .values()
                .filter(|pool| pool.contains(id))
                .count()
    }

    /// Returns per-tag waiting counts, sorted by tag.
    #[must_use]
    pub fn interest_sizes(&self) -> BTreeMap<String, usize> {
        self.by_interest
            .iter()
            .map(|(tag, pool)| (tag.clone(), pool.len()))
            .collect()
    }
}

fn push_unique(pool: &mut Vec<ClientId>, id: &ClientId) {
    if !pool.contains(id) {
        pool.push(id.clone());
    }
}
