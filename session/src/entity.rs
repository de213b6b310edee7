use std::time::{Duration, Instant};

use log::{debug, warn};

use tether_shared::{
    any_set, BitReader, BitWriter, DirtyMask, MalformedMessageError, MessageKind, NetworkId,
    OriginId, PeerKey, ReadMode, ReplicationConfig, ReplicationError, SpawnHeader, SyncComponent,
    Template, Transport, TransportError, UpdateHeader,
};

use crate::TickHandle;

/// Lifecycle of a replicated entity.
///
/// Host side: `Unspawned -> Hosted -> Destroyed`.
/// Client side: `Unspawned -> Spawned -> Destroyed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityState {
    Unspawned,
    Hosted,
    Spawned,
    Destroyed,
}

/// Result of one host tick
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed since the last Update, nothing was sent
    Unchanged,
    /// Fields changed but no peer is ready. They stay dirty.
    NoReadyPeers,
    /// One Update was handed to the transport for every ready peer. Lists
    /// the peers whose send failed.
    Sent {
        failures: Vec<(PeerKey, TransportError)>,
    },
}

/// An object whose synchronized components are kept consistent between
/// the host and its ready peers
pub struct ReplicatedEntity {
    network_id: Option<NetworkId>,
    origin: OriginId,
    components: Vec<Box<dyn SyncComponent>>,
    // Fixed once components are attached
    total_fields: usize,
    attached: bool,
    config: ReplicationConfig,
    state: EntityState,
    last_update: Option<Instant>,
    tick: Option<TickHandle>,
}

impl ReplicatedEntity {
    /// Create an entity with no components. `origin` names the template
    /// peers instantiate when they receive its Spawn.
    pub fn new(origin: OriginId, config: ReplicationConfig) -> Self {
        Self {
            network_id: None,
            origin,
            components: Vec::new(),
            total_fields: 0,
            attached: false,
            config,
            state: EntityState::Unspawned,
            last_update: None,
            tick: None,
        }
    }

    /// Create an entity with the components and config `template` describes
    pub fn from_template(origin: OriginId, template: &dyn Template) -> Self {
        let mut entity = Self::new(origin, template.replication_config());
        entity.install(template.build_components());
        entity
    }

    /// Request a specific identifier. The host keeps it if it is free when
    /// the entity is hosted.
    pub fn with_network_id(mut self, id: NetworkId) -> Self {
        self.network_id = Some(id);
        self
    }

    /// Attach the ordered component list. This fixes the entity's field
    /// count and may only happen once.
    pub fn attach(
        &mut self,
        components: Vec<Box<dyn SyncComponent>>,
    ) -> Result<(), ReplicationError> {
        if self.attached {
            return Err(ReplicationError::AlreadyAttached);
        }
        self.install(components);
        Ok(())
    }

    fn install(&mut self, components: Vec<Box<dyn SyncComponent>>) {
        self.total_fields = components
            .iter()
            .map(|component| component.field_count())
            .sum();
        self.components = components;
        self.attached = true;
    }

    // Accessors

    pub fn network_id(&self) -> Option<NetworkId> {
        self.network_id
    }

    pub fn origin(&self) -> OriginId {
        self.origin
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn total_fields(&self) -> usize {
        self.total_fields
    }

    pub fn components(&self) -> &[Box<dyn SyncComponent>] {
        &self.components
    }

    /// First attached component of type `T`
    pub fn component<T: SyncComponent>(&self) -> Option<&T> {
        self.components
            .iter()
            .find_map(|component| component.as_any().downcast_ref::<T>())
    }

    pub fn component_mut<T: SyncComponent>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<T>())
    }

    /// When the last Spawn or Update was applied (client side)
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn since_last_update(&self, now: Instant) -> Option<Duration> {
        self.last_update
            .map(|last_update| now.saturating_duration_since(last_update))
    }

    /// Combined dirty vector of every component, in attach order
    pub fn dirty_bits(&self) -> Vec<bool> {
        let mut bits = Vec::with_capacity(self.total_fields);
        for component in &self.components {
            bits.extend(component.dirty_vector());
        }
        if bits.len() != self.total_fields {
            warn!(
                "Entity {:?} reported {} dirty flags for {} fields, field counts must not change",
                self.network_id,
                bits.len(),
                self.total_fields
            );
            bits.resize(self.total_fields, true);
        }
        bits
    }

    pub fn dirty_mask(&self) -> DirtyMask {
        DirtyMask::from_bits(&self.dirty_bits())
    }

    fn hosted_id(&self) -> Option<NetworkId> {
        match self.state {
            EntityState::Hosted => self.network_id,
            _ => None,
        }
    }

    // Host

    pub(crate) fn host(&mut self, id: NetworkId, tick: TickHandle) {
        self.network_id = Some(id);
        self.state = EntityState::Hosted;
        self.tick = Some(tick);
    }

    /// Spawn for the peers that are ready when the entity is hosted. Every
    /// field is recorded as sent.
    pub(crate) fn write_spawn(&mut self, id: NetworkId) -> Vec<u8> {
        let mut writer = BitWriter::new();
        SpawnHeader {
            origin: self.origin,
            id,
        }
        .write(&mut writer);
        for component in &mut self.components {
            component.write_changed(&mut writer, true);
        }
        writer.to_bytes()
    }

    /// Spawn for a single peer joining later. Nothing is recorded as sent,
    /// so changes still pending for the other peers go out on the next tick.
    fn write_late_spawn(&self, id: NetworkId) -> Vec<u8> {
        let mut writer = BitWriter::new();
        SpawnHeader {
            origin: self.origin,
            id,
        }
        .write(&mut writer);
        for component in &self.components {
            component.write_snapshot(&mut writer);
        }
        writer.to_bytes()
    }

    /// Sends the entity's full current state to a peer that just became
    /// ready
    pub fn on_peer_ready(
        &self,
        peer: &PeerKey,
        transport: &mut dyn Transport,
    ) -> Result<(), TransportError> {
        let Some(id) = self.hosted_id() else {
            debug!("Entity is not hosted, no late-join Spawn for {:?}", peer);
            return Ok(());
        };
        let payload = self.write_late_spawn(id);
        transport.send(peer, MessageKind::Spawn.channel(), &payload)
    }

    /// One replication tick. Sends a single Update with every changed field
    /// to `ready` peers, or nothing when no field changed or no peer is
    /// ready.
    pub fn tick(&mut self, ready: &[PeerKey], transport: &mut dyn Transport) -> TickOutcome {
        let Some(id) = self.hosted_id() else {
            return TickOutcome::Unchanged;
        };

        let bits = self.dirty_bits();
        if !any_set(&bits) {
            return TickOutcome::Unchanged;
        }
        if ready.is_empty() {
            return TickOutcome::NoReadyPeers;
        }

        let mut writer = BitWriter::new();
        UpdateHeader { id }.write(&mut writer);
        DirtyMask::from_bits(&bits).write(&mut writer);
        for component in &mut self.components {
            component.write_changed(&mut writer, false);
        }
        let payload = writer.to_bytes();

        let failures = transport.broadcast(
            MessageKind::Update.channel(),
            &payload,
            &|peer: &PeerKey| ready.contains(peer),
        );
        TickOutcome::Sent { failures }
    }

    pub(crate) fn tick_handle(&self) -> Option<TickHandle> {
        self.tick
    }

    /// Marks the entity destroyed and hands back its tick for cancellation
    pub(crate) fn destroy(&mut self) -> Option<TickHandle> {
        self.state = EntityState::Destroyed;
        self.tick.take()
    }

    /// Returns a hosted entity to `Unspawned` at the end of a session. The
    /// identifier is kept so the next session can host it under the same one.
    pub(crate) fn unhost(&mut self) -> Option<TickHandle> {
        self.state = EntityState::Unspawned;
        self.tick.take()
    }

    // Client

    /// Applies the full state carried by a Spawn and takes on the host's
    /// identifier. A rejected Spawn leaves the entity untouched.
    pub fn client_receive_spawn(
        &mut self,
        id: NetworkId,
        reader: &mut BitReader,
        now: Instant,
    ) -> Result<(), ReplicationError> {
        if self.state == EntityState::Destroyed {
            return Err(ReplicationError::EntityDestroyed {
                id: self.network_id,
            });
        }

        self.read_components(reader, None)?;

        self.network_id = Some(id);
        self.state = EntityState::Spawned;
        self.last_update = Some(now);
        Ok(())
    }

    /// Applies the changed fields carried by an Update. The mask is sized
    /// from this entity's field count, and components may blend toward the
    /// new values over one send interval. A rejected Update leaves the
    /// entity untouched.
    pub fn client_receive_update(
        &mut self,
        reader: &mut BitReader,
        now: Instant,
    ) -> Result<(), ReplicationError> {
        let mask = DirtyMask::read(reader, self.total_fields)?;
        self.read_components(reader, Some(&mask))?;

        self.last_update = Some(now);
        Ok(())
    }

    /// Decodes every component's fields, checks nothing is left over, then
    /// applies them. Reads every field when `mask` is `None`.
    fn read_components(
        &mut self,
        reader: &mut BitReader,
        mask: Option<&DirtyMask>,
    ) -> Result<(), ReplicationError> {
        let blend_interval = self.config.send_interval();
        let mode_at = |offset: usize| match mask {
            Some(mask) => ReadMode::Delta {
                mask,
                offset,
                blend_interval,
            },
            None => ReadMode::Full,
        };

        let mut staged = Vec::with_capacity(self.components.len());
        let mut offset = 0;
        for component in &self.components {
            let context = component.name();
            let fields = component
                .decode(reader, mode_at(offset))
                .map_err(|source| MalformedMessageError::Truncated { context, source })?;
            staged.push((offset, fields));
            offset += component.field_count();
        }
        expect_end(reader)?;

        for (component, (offset, fields)) in self.components.iter_mut().zip(staged) {
            component.apply(fields, mode_at(offset));
        }
        Ok(())
    }

    /// Moves every component's interpolation forward
    pub fn advance(&mut self, delta: Duration) {
        for component in &mut self.components {
            component.advance(delta);
        }
    }
}

/// A payload ends inside its last byte, and the writer leaves the unused
/// bits of that byte clear
fn expect_end(reader: &mut BitReader) -> Result<(), MalformedMessageError> {
    let remaining_bits = reader.bits_remaining();
    if remaining_bits >= 8 {
        return Err(MalformedMessageError::TrailingBytes { remaining_bits });
    }
    while reader.bits_remaining() > 0 {
        let set = reader
            .read_bit()
            .map_err(|source| MalformedMessageError::Truncated {
                context: "padding",
                source,
            })?;
        if set {
            return Err(MalformedMessageError::TrailingBytes { remaining_bits });
        }
    }
    Ok(())
}
