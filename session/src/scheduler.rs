use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tether_shared::{NetworkId, Timer};

/// Identifies one scheduled tick. A cancelled handle never fires again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickHandle(u64);

struct TickEntry {
    id: NetworkId,
    timer: Timer,
}

/// Periodic per-entity ticks, each with its own interval
pub struct TickScheduler {
    entries: HashMap<TickHandle, TickEntry>,
    next_handle: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_handle: 0,
        }
    }

    /// Schedules a tick for `id` every `interval`, first ringing one
    /// interval after `now`
    pub fn schedule(&mut self, id: NetworkId, interval: Duration, now: Instant) -> TickHandle {
        let handle = TickHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.entries.insert(
            handle,
            TickEntry {
                id,
                timer: Timer::new(interval, now),
            },
        );
        handle
    }

    /// Returns whether the handle was scheduled
    pub fn cancel(&mut self, handle: &TickHandle) -> bool {
        self.entries.remove(handle).is_some()
    }

    pub fn is_scheduled(&self, handle: &TickHandle) -> bool {
        self.entries.contains_key(handle)
    }

    /// Collects every tick whose interval has elapsed and restarts its timer
    /// from `now`. A tick that missed several intervals fires once.
    ///
    /// Ticks are returned in the order they became due, ties broken by
    /// entity identifier.
    pub fn due(&mut self, now: Instant) -> Vec<(TickHandle, NetworkId)> {
        let mut ringing: Vec<(Instant, NetworkId, TickHandle)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.timer.ringing(now))
            .map(|(handle, entry)| (entry.timer.next_ring(), entry.id, *handle))
            .collect();
        ringing.sort();

        for (_, _, handle) in &ringing {
            if let Some(entry) = self.entries.get_mut(handle) {
                entry.timer.reset(now);
            }
        }

        ringing
            .into_iter()
            .map(|(_, id, handle)| (handle, id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cancels every tick
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}
