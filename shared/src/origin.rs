use std::{collections::HashMap, sync::Arc};

use log::{info, warn};
use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};

use crate::{ReplicationConfig, SyncComponent};

const MAX_ORIGIN_ID: u16 = i16::MAX as u16;
const RANDOM_ATTEMPTS: usize = 32;

/// Names the template a receiver instantiates when a Spawn arrives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OriginId(u16);

impl OriginId {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl Serde for OriginId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = UnsignedVariableInteger::<7>::de(reader)?.get();
        let value = u16::try_from(value)
            .map_err(|_| SerdeErr::IntegerOutOfRange { value, bits: 16 })?;
        Ok(Self(value))
    }
}

/// Local recipe for an entity: the ordered component list every peer builds
pub trait Template: Send + Sync {
    fn name(&self) -> &str;

    /// Builds a fresh component list. Every call must produce the same
    /// component kinds, in the same order, with the same field counts.
    fn build_components(&self) -> Vec<Box<dyn SyncComponent>>;

    fn replication_config(&self) -> ReplicationConfig {
        ReplicationConfig::default()
    }
}

/// Maps origin descriptors to local templates and back
pub trait OriginResolver: Send {
    fn resolve(&self, origin: &OriginId) -> Option<Arc<dyn Template>>;

    fn describe(&self, template: &Arc<dyn Template>) -> Option<OriginId>;
}

/// Bidirectional table of templates keyed by `OriginId`
pub struct OriginTable {
    templates: HashMap<OriginId, Arc<dyn Template>>,
    rng: fastrand::Rng,
}

impl OriginTable {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Registers `template` under a random free id in `1..=i16::MAX`.
    /// Registering the same template twice returns its existing id.
    pub fn register(&mut self, template: Arc<dyn Template>) -> Option<OriginId> {
        if let Some(existing) = self.describe(&template) {
            return Some(existing);
        }

        let mut chosen = None;
        for _ in 0..RANDOM_ATTEMPTS {
            let candidate = OriginId(self.rng.u16(1..=MAX_ORIGIN_ID));
            if !self.templates.contains_key(&candidate) {
                chosen = Some(candidate);
                break;
            }
        }
        if chosen.is_none() {
            chosen = (1..=MAX_ORIGIN_ID)
                .map(OriginId)
                .find(|candidate| !self.templates.contains_key(candidate));
        }

        let Some(origin) = chosen else {
            warn!("OriginTable: no free origin id for template {}", template.name());
            return None;
        };

        info!("OriginTable: registering template {} as {:?}", template.name(), origin);
        self.templates.insert(origin, template);
        Some(origin)
    }

    /// Registers `template` under a fixed id, returning any template it replaced
    pub fn register_with_id(
        &mut self,
        origin: OriginId,
        template: Arc<dyn Template>,
    ) -> Option<Arc<dyn Template>> {
        self.templates.insert(origin, template)
    }

    pub fn remove(&mut self, origin: &OriginId) -> Option<Arc<dyn Template>> {
        self.templates.remove(origin)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for OriginTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginResolver for OriginTable {
    fn resolve(&self, origin: &OriginId) -> Option<Arc<dyn Template>> {
        self.templates.get(origin).cloned()
    }

    fn describe(&self, template: &Arc<dyn Template>) -> Option<OriginId> {
        self.templates
            .iter()
            .find(|(_, candidate)| std::ptr::addr_eq(Arc::as_ptr(candidate), Arc::as_ptr(template)))
            .map(|(origin, _)| *origin)
    }
}
