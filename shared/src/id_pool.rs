use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::NetworkId;

const RANDOM_ATTEMPTS: usize = 64;

/// How the host picks identifiers for newly hosted entities
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdAllocation {
    /// Advance a cursor through `1..=u16::MAX`, wrapping past zero
    Sequential,
    /// Pick random identifiers, falling back to a scan when the pool is crowded
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdPoolError {
    /// Every non-zero 16-bit identifier is held by a live entity
    #[error("All {live} network identifiers are in use")]
    Exhausted { live: usize },
}

/// Hands out identifiers that are unique among live entities
pub struct NetworkIdPool {
    allocation: IdAllocation,
    in_use: HashSet<NetworkId>,
    cursor: u16,
    rng: fastrand::Rng,
}

impl NetworkIdPool {
    pub fn new(allocation: IdAllocation) -> Self {
        Self::with_rng(allocation, fastrand::Rng::new())
    }

    pub fn with_seed(allocation: IdAllocation, seed: u64) -> Self {
        Self::with_rng(allocation, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(allocation: IdAllocation, rng: fastrand::Rng) -> Self {
        Self {
            allocation,
            in_use: HashSet::new(),
            cursor: 0,
            rng,
        }
    }

    pub fn allocation(&self) -> IdAllocation {
        self.allocation
    }

    pub fn generate(&mut self) -> Result<NetworkId, IdPoolError> {
        if self.in_use.len() >= usize::from(u16::MAX) {
            return Err(IdPoolError::Exhausted {
                live: self.in_use.len(),
            });
        }

        if self.allocation == IdAllocation::Random {
            for _ in 0..RANDOM_ATTEMPTS {
                let Some(id) = NetworkId::new(self.rng.u16(1..=u16::MAX)) else {
                    continue;
                };
                if self.in_use.insert(id) {
                    return Ok(id);
                }
            }
            debug!("NetworkIdPool: random picks collided, scanning for a free identifier");
        }

        loop {
            self.cursor = self.cursor.wrapping_add(1);
            let Some(id) = NetworkId::new(self.cursor) else {
                continue;
            };
            if self.in_use.insert(id) {
                return Ok(id);
            }
        }
    }

    /// Claims a specific identifier. Returns false if it is already live.
    pub fn reserve(&mut self, id: NetworkId) -> bool {
        self.in_use.insert(id)
    }

    pub fn release(&mut self, id: &NetworkId) -> bool {
        self.in_use.remove(id)
    }

    pub fn is_in_use(&self, id: &NetworkId) -> bool {
        self.in_use.contains(id)
    }

    pub fn live_count(&self) -> usize {
        self.in_use.len()
    }

    pub fn clear(&mut self) {
        self.in_use.clear();
        self.cursor = 0;
    }
}
