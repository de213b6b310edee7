/// Rejected inbound messages are dropped without panics or registry changes
use std::time::Duration;

use glam::Vec3;
use proptest::prelude::*;

use tether_session::ReplicationEvent;
use tether_shared::{
    Animator, AnimatorValue, ChannelKind, MalformedMessageError, MessageKind, NetworkId,
    OriginId, PeerKey, ReplicationError, Rigidbody, SerdeErr, Transform,
};
use tether_test::{TestClient, TestHost, CRATE, PLAYER, UNIT};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A host with one ready peer, and the payload of the Spawn it sent
fn hosted_spawn(origin: OriginId) -> (TestHost, TestClient, NetworkId, Vec<u8>) {
    init_logging();
    let peer = PeerKey::new(1);
    let mut host = TestHost::new();
    host.connect(peer);
    let id = host.spawn(origin);
    let mut messages = host.outbox.drain();
    assert_eq!(messages.len(), 1);
    let payload = messages.remove(0).payload;
    (host, TestClient::new(peer), id, payload)
}

#[test]
fn update_for_unknown_identifier_is_dropped() {
    let (_host, mut client, id, spawn) = hosted_spawn(CRATE);
    client.receive(ChannelKind::OrderedReliable, &spawn).unwrap();

    // Update for #42: kind, identifier, empty 4-field mask
    let update = [2, 42, 0, 0];
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::UnorderedUnreliable, &update),
        Err(ReplicationError::UnknownIdentifier {
            id: NetworkId::new(42).unwrap()
        })
    );
    assert!(client
        .receive(ChannelKind::UnorderedUnreliable, &update)
        .is_none());
    assert_eq!(client.manager.entity_ids(), vec![id]);

    // processing continues
    let valid = [2, id.value() as u8, 0, 0];
    assert_eq!(
        client.receive(ChannelKind::UnorderedUnreliable, &valid),
        Some(ReplicationEvent::Updated { id })
    );
}

#[test]
fn truncated_spawn_registers_nothing() {
    let (_host, mut client, _id, spawn) = hosted_spawn(UNIT);
    let truncated = &spawn[..spawn.len() - 4];

    let result = client
        .manager
        .try_receive(ChannelKind::OrderedReliable, truncated);
    assert!(matches!(
        result,
        Err(ReplicationError::Malformed(MalformedMessageError::Truncated {
            context: "Score",
            ..
        }))
    ));
    assert_eq!(client.manager.entity_count(), 0);
}

#[test]
fn mask_padding_is_malformed() {
    let (_host, mut client, id, spawn) = hosted_spawn(CRATE);
    client.receive(ChannelKind::OrderedReliable, &spawn).unwrap();
    let before = client.manager.entity(&id).unwrap().last_update();

    // crates have four fields, bit 4 is padding
    let update = [2, id.value() as u8, 0, 0b0001_0000];
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::UnorderedUnreliable, &update),
        Err(ReplicationError::Malformed(
            MalformedMessageError::MaskPadding { bit_count: 4 }
        ))
    );
    assert_eq!(client.manager.entity(&id).unwrap().last_update(), before);
}

#[test]
fn messages_on_the_wrong_channel_are_malformed() {
    let (_host, mut client, _id, spawn) = hosted_spawn(CRATE);
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::UnorderedUnreliable, &spawn),
        Err(ReplicationError::Malformed(
            MalformedMessageError::ChannelMismatch {
                kind: MessageKind::Spawn,
                channel: ChannelKind::UnorderedUnreliable,
            }
        ))
    );
    assert_eq!(client.manager.entity_count(), 0);

    assert!(matches!(
        client
            .manager
            .try_receive(ChannelKind::OrderedReliable, &[2, 1, 0, 0]),
        Err(ReplicationError::Malformed(
            MalformedMessageError::ChannelMismatch { .. }
        ))
    ));
}

#[test]
fn unknown_kind_and_empty_payloads_are_malformed() {
    let mut client = TestClient::new(PeerKey::new(1));
    assert_eq!(
        client.manager.try_receive(ChannelKind::OrderedReliable, &[9]),
        Err(ReplicationError::Malformed(
            MalformedMessageError::UnknownMessageKind { kind: 9 }
        ))
    );
    assert!(matches!(
        client.manager.try_receive(ChannelKind::OrderedReliable, &[]),
        Err(ReplicationError::Malformed(MalformedMessageError::Truncated {
            context: "message kind",
            ..
        }))
    ));
}

#[test]
fn zero_identifier_is_malformed() {
    let mut client = TestClient::new(PeerKey::new(1));
    // Spawn, origin 1, identifier 0
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::OrderedReliable, &[1, 2, 0, 0]),
        Err(ReplicationError::Malformed(MalformedMessageError::Truncated {
            context: "spawn identifier",
            source: SerdeErr::InvalidValue {
                type_name: "NetworkId",
                value: 0,
            },
        }))
    );
}

#[test]
fn unknown_origin_is_dropped() {
    let mut client = TestClient::new(PeerKey::new(1));
    // Spawn, origin 99, identifier 5
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::OrderedReliable, &[1, 99 << 1, 5, 0]),
        Err(ReplicationError::UnknownOrigin {
            origin: OriginId::new(99)
        })
    );
    assert_eq!(client.manager.entity_count(), 0);
}

#[test]
fn role_violations() {
    let (mut host, mut client, _id, spawn) = hosted_spawn(CRATE);

    assert_eq!(
        host.manager
            .try_receive(ChannelKind::OrderedReliable, &spawn),
        Err(ReplicationError::NotClient {
            operation: "receive"
        })
    );

    let entity = client.manager.instantiate(CRATE).unwrap();
    let rejected = client.manager.host_spawn(entity).unwrap_err();
    assert_eq!(
        rejected.error(),
        &ReplicationError::NotHost {
            operation: "host_spawn"
        }
    );
    assert_eq!(rejected.into_entity().origin(), CRATE);
    assert!(matches!(
        client.manager.despawn(&NetworkId::new(1).unwrap()),
        Err(ReplicationError::NotHost { .. })
    ));
}

#[test]
fn repeated_spawn_refreshes_the_entity() {
    let (_host, mut client, id, spawn) = hosted_spawn(CRATE);
    assert_eq!(
        client.receive(ChannelKind::OrderedReliable, &spawn),
        Some(ReplicationEvent::Spawned { id, origin: CRATE })
    );
    assert_eq!(
        client.receive(ChannelKind::OrderedReliable, &spawn),
        Some(ReplicationEvent::Updated { id })
    );
    assert_eq!(client.manager.entity_count(), 1);
}

#[test]
fn spawn_with_new_origin_replaces_the_entity() {
    let (_crate_host, mut client, crate_id, crate_spawn) = hosted_spawn(CRATE);
    let (_unit_host, _, unit_id, unit_spawn) = hosted_spawn(UNIT);
    assert_eq!(crate_id, unit_id);

    client.receive(ChannelKind::OrderedReliable, &crate_spawn);
    assert_eq!(
        client.receive(ChannelKind::OrderedReliable, &unit_spawn),
        Some(ReplicationEvent::Spawned {
            id: unit_id,
            origin: UNIT
        })
    );
    assert_eq!(client.manager.entity(&unit_id).unwrap().origin(), UNIT);
}

#[test]
fn truncated_update_leaves_every_component_unchanged() {
    let (mut host, mut client, id, spawn) = hosted_spawn(PLAYER);
    client.receive(ChannelKind::OrderedReliable, &spawn).unwrap();
    let before = client.manager.entity(&id).unwrap().last_update();

    {
        let entity = host.manager.entity_mut(&id).unwrap();
        entity
            .component_mut::<Transform>()
            .unwrap()
            .position
            .set(Vec3::new(4.0, 0.0, 0.0));
        entity
            .component_mut::<Animator>()
            .unwrap()
            .set_float("speed", 2.0)
            .unwrap();
    }
    client.clock.advance(Duration::from_millis(100));
    assert_eq!(host.advance(Duration::from_millis(100)), 1);
    let update = host.outbox.drain().remove(0).payload;

    // the Transform decodes, the Animator's value is cut short
    let truncated = &update[..update.len() - 1];
    assert!(matches!(
        client
            .manager
            .try_receive(ChannelKind::UnorderedUnreliable, truncated),
        Err(ReplicationError::Malformed(MalformedMessageError::Truncated {
            context: "Animator",
            ..
        }))
    ));
    {
        let mirror = client.manager.entity(&id).unwrap();
        let transform = mirror.component::<Transform>().unwrap();
        assert_eq!(transform.target_position(), Vec3::ZERO);
        assert!(!transform.is_blending());
        assert_eq!(
            mirror.component::<Animator>().unwrap().get("speed"),
            Some(AnimatorValue::Float(0.0))
        );
        assert_eq!(mirror.last_update(), before);
    }

    assert_eq!(
        client.receive(ChannelKind::UnorderedUnreliable, &update),
        Some(ReplicationEvent::Updated { id })
    );
    let mirror = client.manager.entity(&id).unwrap();
    assert_eq!(
        mirror.component::<Transform>().unwrap().target_position(),
        Vec3::new(4.0, 0.0, 0.0)
    );
    assert_eq!(
        mirror.component::<Animator>().unwrap().get("speed"),
        Some(AnimatorValue::Float(2.0))
    );
}

#[test]
fn truncated_repeated_spawn_leaves_the_entity_unchanged() {
    let (mut host, mut client, id, spawn) = hosted_spawn(CRATE);
    client.receive(ChannelKind::OrderedReliable, &spawn).unwrap();
    let before = client.manager.entity(&id).unwrap().last_update();

    // host the same identifier again with new state
    host.manager.despawn(&id).unwrap();
    let mut entity = host.instantiate(CRATE).with_network_id(id);
    entity
        .component_mut::<Transform>()
        .unwrap()
        .position
        .set(Vec3::splat(9.0));
    entity
        .component_mut::<Rigidbody>()
        .unwrap()
        .velocity
        .set(Vec3::splat(9.0));
    assert_eq!(host.manager.host_spawn(entity).unwrap(), id);
    let respawn = host.outbox.drain().remove(0).payload;

    // cut inside the Rigidbody's angular velocity
    let truncated = &respawn[..respawn.len() - 6];
    assert!(matches!(
        client
            .manager
            .try_receive(ChannelKind::OrderedReliable, truncated),
        Err(ReplicationError::Malformed(MalformedMessageError::Truncated {
            context: "Rigidbody",
            ..
        }))
    ));
    {
        let mirror = client.manager.entity(&id).unwrap();
        assert_eq!(*mirror.component::<Transform>().unwrap().position, Vec3::ZERO);
        assert_eq!(*mirror.component::<Rigidbody>().unwrap().velocity, Vec3::ZERO);
        assert_eq!(mirror.last_update(), before);
    }

    assert_eq!(
        client.receive(ChannelKind::OrderedReliable, &respawn),
        Some(ReplicationEvent::Updated { id })
    );
    let mirror = client.manager.entity(&id).unwrap();
    assert_eq!(
        *mirror.component::<Transform>().unwrap().position,
        Vec3::splat(9.0)
    );
}

#[test]
fn payload_left_after_the_last_component_is_malformed() {
    let (_host, mut client, id, spawn) = hosted_spawn(CRATE);

    let mut padded = spawn.clone();
    padded.push(0);
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::OrderedReliable, &padded),
        Err(ReplicationError::Malformed(
            MalformedMessageError::TrailingBytes { remaining_bits: 8 }
        ))
    );
    assert_eq!(client.manager.entity_count(), 0);

    client.receive(ChannelKind::OrderedReliable, &spawn).unwrap();
    let before = client.manager.entity(&id).unwrap().last_update();

    // an empty Update followed by a stray vector
    let mut update = vec![2, id.value() as u8, 0, 0];
    update.extend_from_slice(&[0; 12]);
    assert_eq!(
        client
            .manager
            .try_receive(ChannelKind::UnorderedUnreliable, &update),
        Err(ReplicationError::Malformed(
            MalformedMessageError::TrailingBytes { remaining_bits: 96 }
        ))
    );
    assert_eq!(client.manager.entity(&id).unwrap().last_update(), before);
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(
        payload in prop::collection::vec(any::<u8>(), 0..64),
        reliable in any::<bool>(),
    ) {
        let mut client = TestClient::new(PeerKey::new(1));
        let channel = if reliable {
            ChannelKind::OrderedReliable
        } else {
            ChannelKind::UnorderedUnreliable
        };
        let _ = client.manager.try_receive(channel, &payload);
    }
}
