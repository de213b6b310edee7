use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};

use tether_shared::{
    BitReader, ChannelKind, Clock, IdPoolError, MessageKind, NetworkId, NetworkIdPool, OriginId,
    OriginResolver, PeerKey, PeerState, ReplicationError, SessionConfig, SpawnHeader, Transport,
    TransportError, UpdateHeader,
};

use crate::{
    EntityState, HostSpawnError, PeerTable, ReplicatedEntity, ReplicationEvent, TickOutcome,
    TickScheduler,
};

/// Which side of a session this process is on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// No session is running
    Inactive,
    /// Authoritative: assigns identifiers and sends Spawns and Updates
    Host,
    /// Receives and applies Spawns and Updates
    Client,
}

/// Owns the replicated entities of one process and moves their state
/// between the host and its ready peers
pub struct ReplicationManager {
    // Config
    config: SessionConfig,
    role: Role,

    // Collaborators
    transport: Box<dyn Transport>,
    origins: Box<dyn OriginResolver>,
    clock: Box<dyn Clock>,

    // Entities
    id_pool: NetworkIdPool,
    entities: BTreeMap<NetworkId, ReplicatedEntity>,
    scheduler: TickScheduler,

    // Peers
    peers: PeerTable,

    // Client blending
    last_advance: Option<Instant>,
}

impl ReplicationManager {
    /// Create a new ReplicationManager with no session running
    pub fn new(
        config: SessionConfig,
        transport: Box<dyn Transport>,
        origins: Box<dyn OriginResolver>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let id_pool = NetworkIdPool::new(config.id_allocation);
        Self {
            config,
            role: Role::Inactive,
            transport,
            origins,
            clock,
            id_pool,
            entities: BTreeMap::new(),
            scheduler: TickScheduler::new(),
            peers: PeerTable::new(),
            last_advance: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    // Session

    /// Begin a session as the authoritative host
    pub fn start_host(&mut self) {
        if self.role != Role::Inactive {
            warn!(
                "Cannot start hosting while already running as {:?}, stop the session first",
                self.role
            );
            return;
        }
        info!("Replication session started as host");
        self.role = Role::Host;
    }

    /// Begin a session as a client of a remote host
    pub fn start_client(&mut self) {
        if self.role != Role::Inactive {
            warn!(
                "Cannot start as client while already running as {:?}, stop the session first",
                self.role
            );
            return;
        }
        info!("Replication session started as client");
        self.role = Role::Client;
        self.last_advance = Some(self.clock.now());
    }

    /// End the session. Every tick is cancelled and the registry and peer
    /// table are cleared.
    ///
    /// On the host, the hosted entities are handed back `Unspawned` with
    /// their identifiers, ready to be hosted again next session. Client
    /// mirrors are dropped.
    pub fn stop(&mut self) -> Vec<ReplicatedEntity> {
        let entities = std::mem::take(&mut self.entities);
        self.scheduler.clear();
        self.id_pool.clear();
        self.peers.clear();
        self.last_advance = None;

        let was_host = self.role == Role::Host;
        self.role = Role::Inactive;
        info!(
            "Replication session stopped, released {} entities",
            entities.len()
        );

        if !was_host {
            return Vec::new();
        }
        entities
            .into_values()
            .map(|mut entity| {
                entity.unhost();
                entity
            })
            .collect()
    }

    // Entities

    /// Build an empty entity for `origin` with the session's default
    /// replication config. Components are attached by the caller.
    pub fn new_entity(&self, origin: OriginId) -> ReplicatedEntity {
        ReplicatedEntity::new(origin, self.config.default_replication)
    }

    /// Build an unhosted entity from the template registered for `origin`
    pub fn instantiate(&self, origin: OriginId) -> Result<ReplicatedEntity, ReplicationError> {
        let template = self
            .origins
            .resolve(&origin)
            .ok_or(ReplicationError::UnknownOrigin { origin })?;
        Ok(ReplicatedEntity::from_template(origin, template.as_ref()))
    }

    /// Assigns the entity an identifier, registers it, sends its Spawn to
    /// every ready peer and schedules its tick.
    ///
    /// An identifier requested with `with_network_id` (or kept from a
    /// previous session) is reused when it is free. A refused entity is
    /// handed back inside the error.
    pub fn host_spawn(
        &mut self,
        mut entity: ReplicatedEntity,
    ) -> Result<NetworkId, HostSpawnError> {
        if !self.is_host() {
            let error = ReplicationError::NotHost {
                operation: "host_spawn",
            };
            return Err(HostSpawnError::new(error, entity));
        }
        if entity.state() == EntityState::Destroyed {
            let error = ReplicationError::EntityDestroyed {
                id: entity.network_id(),
            };
            return Err(HostSpawnError::new(error, entity));
        }

        let id = match self.allocate_id(entity.network_id()) {
            Ok(id) => id,
            Err(error) => return Err(HostSpawnError::new(error, entity)),
        };

        let payload = entity.write_spawn(id);
        let ready = self.peers.ready_peers();
        let failures = self.transport.broadcast(
            MessageKind::Spawn.channel(),
            &payload,
            &|peer: &PeerKey| ready.contains(peer),
        );
        self.drop_failed_peers(failures);

        let now = self.clock.now();
        let handle = self
            .scheduler
            .schedule(id, entity.config().send_interval(), now);
        entity.host(id, handle);
        self.entities.insert(id, entity);

        info!("Hosting entity {} for {} ready peers", id, ready.len());
        Ok(id)
    }

    fn allocate_id(&mut self, requested: Option<NetworkId>) -> Result<NetworkId, IdPoolError> {
        match requested {
            Some(requested) if self.id_pool.reserve(requested) => Ok(requested),
            Some(requested) => {
                let id = self.id_pool.generate()?;
                warn!(
                    "Requested identifier {} is in use, hosting entity as {}",
                    requested, id
                );
                Ok(id)
            }
            None => self.id_pool.generate(),
        }
    }

    /// Deregisters a hosted entity, cancels its tick and frees its
    /// identifier. The entity is handed back destroyed.
    pub fn despawn(&mut self, id: &NetworkId) -> Result<ReplicatedEntity, ReplicationError> {
        if !self.is_host() {
            return Err(ReplicationError::NotHost {
                operation: "despawn",
            });
        }
        let mut entity = self
            .entities
            .remove(id)
            .ok_or(ReplicationError::UnknownIdentifier { id: *id })?;

        if let Some(handle) = entity.destroy() {
            self.scheduler.cancel(&handle);
        }
        self.id_pool.release(id);
        info!("Despawned entity {}", id);
        Ok(entity)
    }

    pub fn entity(&self, id: &NetworkId) -> Option<&ReplicatedEntity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: &NetworkId) -> Option<&mut ReplicatedEntity> {
        self.entities.get_mut(id)
    }

    /// Registered identifiers in ascending order
    pub fn entity_ids(&self) -> Vec<NetworkId> {
        self.entities.keys().copied().collect()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_ticking(&self, id: &NetworkId) -> bool {
        self.entities
            .get(id)
            .and_then(ReplicatedEntity::tick_handle)
            .is_some_and(|handle| self.scheduler.is_scheduled(&handle))
    }

    /// Client entities that have not received a Spawn or Update within
    /// `threshold`
    pub fn stale_entities(&self, threshold: Duration) -> Vec<NetworkId> {
        let now = self.clock.now();
        self.entities
            .iter()
            .filter(|(_, entity)| {
                entity
                    .since_last_update(now)
                    .is_some_and(|elapsed| elapsed > threshold)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    // Peers

    /// Records a readiness change reported by the transport. When a peer
    /// becomes ready the host sends it one Spawn per hosted entity, before
    /// any Update can reach it.
    pub fn set_peer_state(&mut self, peer: PeerKey, state: PeerState) {
        let became_ready = self.peers.set(peer, state);
        debug!("Peer {:?} is now {:?}", peer, state);

        if !became_ready || !self.is_host() {
            return;
        }

        let mut sent = 0;
        let mut failure = None;
        for entity in self.entities.values() {
            if let Err(error) = entity.on_peer_ready(&peer, self.transport.as_mut()) {
                failure = Some(error);
                break;
            }
            sent += 1;
        }

        match failure {
            Some(error) => self.drop_failed_peers(vec![(peer, error)]),
            None => info!("Peer {:?} is ready, sent {} Spawns", peer, sent),
        }
    }

    /// `None` for peers never reported and for disconnected peers
    pub fn peer_state(&self, peer: &PeerKey) -> Option<PeerState> {
        self.peers.state(peer)
    }

    pub fn ready_peers(&self) -> Vec<PeerKey> {
        self.peers.ready_peers()
    }

    fn drop_failed_peers(&mut self, failures: Vec<(PeerKey, TransportError)>) {
        for (peer, error) in failures {
            warn!("{}, peer {:?} is disconnected", error, peer);
            self.peers.set(peer, PeerState::Disconnected);
        }
    }

    // Ticks

    /// Runs every due entity tick on the host, or moves client blending
    /// forward. Returns how many Updates were sent.
    pub fn update(&mut self) -> usize {
        let now = self.clock.now();
        match self.role {
            Role::Host => self.tick_due_entities(now),
            Role::Client => {
                self.advance_entities(now);
                0
            }
            Role::Inactive => 0,
        }
    }

    fn tick_due_entities(&mut self, now: Instant) -> usize {
        let mut sent = 0;
        for (handle, id) in self.scheduler.due(now) {
            let Some(entity) = self.entities.get_mut(&id) else {
                self.scheduler.cancel(&handle);
                continue;
            };

            let ready = self.peers.ready_peers();
            if let TickOutcome::Sent { failures } = entity.tick(&ready, self.transport.as_mut()) {
                sent += 1;
                self.drop_failed_peers(failures);
            }
        }
        sent
    }

    fn advance_entities(&mut self, now: Instant) {
        let delta = match self.last_advance {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last_advance = Some(now);
        if delta.is_zero() {
            return;
        }
        for entity in self.entities.values_mut() {
            entity.advance(delta);
        }
    }

    // Inbound

    /// Handles one inbound message. Rejected messages are logged and
    /// dropped.
    pub fn receive(&mut self, channel: ChannelKind, payload: &[u8]) -> Option<ReplicationEvent> {
        match self.try_receive(channel, payload) {
            Ok(event) => Some(event),
            Err(error) => {
                report(&error);
                None
            }
        }
    }

    /// Handles one inbound message, returning why it was rejected. A
    /// rejected Update leaves the registry untouched.
    pub fn try_receive(
        &mut self,
        channel: ChannelKind,
        payload: &[u8],
    ) -> Result<ReplicationEvent, ReplicationError> {
        if !self.is_client() {
            return Err(ReplicationError::NotClient {
                operation: "receive",
            });
        }

        let mut reader = BitReader::new(payload);
        match MessageKind::read_on(&mut reader, channel)? {
            MessageKind::Spawn => {
                let header = SpawnHeader::read(&mut reader)?;
                self.receive_spawn(header, &mut reader)
            }
            MessageKind::Update => {
                let header = UpdateHeader::read(&mut reader)?;
                self.receive_update(header, &mut reader)
            }
        }
    }

    fn receive_spawn(
        &mut self,
        header: SpawnHeader,
        reader: &mut BitReader,
    ) -> Result<ReplicationEvent, ReplicationError> {
        let SpawnHeader { origin, id } = header;
        let now = self.clock.now();

        if let Some(existing) = self.entities.get_mut(&id) {
            if existing.origin() == origin {
                existing.client_receive_spawn(id, reader, now)?;
                debug!("Refreshed entity {} from a repeated Spawn", id);
                return Ok(ReplicationEvent::Updated { id });
            }
        }

        let mut entity = self.instantiate(origin)?;
        entity.client_receive_spawn(id, reader, now)?;
        if self.entities.insert(id, entity).is_some() {
            info!("Entity {} replaced by a Spawn for origin {:?}", id, origin);
        } else {
            info!("Spawned entity {} from origin {:?}", id, origin);
        }
        Ok(ReplicationEvent::Spawned { id, origin })
    }

    fn receive_update(
        &mut self,
        header: UpdateHeader,
        reader: &mut BitReader,
    ) -> Result<ReplicationEvent, ReplicationError> {
        let id = header.id;
        let now = self.clock.now();
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(ReplicationError::UnknownIdentifier { id })?;
        entity.client_receive_update(reader, now)?;
        Ok(ReplicationEvent::Updated { id })
    }
}

fn report(error: &ReplicationError) {
    match error {
        ReplicationError::UnknownIdentifier { .. } => debug!("Dropped message: {}", error),
        ReplicationError::NotHost { .. } | ReplicationError::NotClient { .. } => {
            error!("Dropped message: {}", error)
        }
        _ => warn!("Dropped message: {}", error),
    }
}
