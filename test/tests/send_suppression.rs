/// Ticks never send unchanged data
use std::time::Duration;

use glam::Vec3;

use tether_shared::{PeerKey, Rigidbody, Transform};
use tether_test::{deliver, TestClient, TestHost, CRATE};

const TICK: Duration = Duration::from_millis(334);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn unchanged_entity_sends_nothing() {
    init_logging();
    let mut host = TestHost::new();
    host.connect(PeerKey::new(1));
    host.spawn(CRATE);
    host.spawn(CRATE);
    host.outbox.drain();

    for _ in 0..5 {
        assert_eq!(host.advance(TICK), 0);
    }
    assert!(host.outbox.is_empty());
}

#[test]
fn a_change_is_sent_once() {
    init_logging();
    let mut host = TestHost::new();
    host.connect(PeerKey::new(1));
    let id = host.spawn(CRATE);
    host.outbox.drain();

    host.manager
        .entity_mut(&id)
        .unwrap()
        .component_mut::<Rigidbody>()
        .unwrap()
        .velocity
        .set(Vec3::X);

    assert_eq!(host.advance(TICK), 1);
    assert_eq!(host.outbox.drain().len(), 1);
    assert_eq!(host.advance(TICK), 0);
    assert!(host.outbox.is_empty());
}

#[test]
fn nothing_is_sent_between_ticks() {
    let mut host = TestHost::new();
    host.connect(PeerKey::new(1));
    let id = host.spawn(CRATE);
    host.outbox.drain();

    host.manager
        .entity_mut(&id)
        .unwrap()
        .component_mut::<Rigidbody>()
        .unwrap()
        .velocity
        .set(Vec3::Y);

    assert_eq!(host.advance(Duration::from_millis(100)), 0);
    assert_eq!(host.advance(Duration::from_millis(100)), 0);
    assert!(host.outbox.is_empty());
    assert_eq!(host.advance(Duration::from_millis(134)), 1);
}

#[test]
fn reverted_change_is_not_sent() {
    let mut host = TestHost::new();
    host.connect(PeerKey::new(1));
    let id = host.spawn(CRATE);
    host.outbox.drain();

    let entity = host.manager.entity_mut(&id).unwrap();
    let transform = entity.component_mut::<Transform>().unwrap();
    transform.position.set(Vec3::ONE);
    transform.position.set(Vec3::ZERO);

    assert_eq!(host.advance(TICK), 0);
    assert!(host.outbox.is_empty());
}

#[test]
fn changes_wait_for_a_ready_peer() {
    init_logging();
    let peer = PeerKey::new(1);
    let mut host = TestHost::new();
    let id = host.spawn(CRATE);

    host.manager
        .entity_mut(&id)
        .unwrap()
        .component_mut::<Rigidbody>()
        .unwrap()
        .velocity
        .set(Vec3::Z);
    assert_eq!(host.advance(TICK), 0);
    assert!(host.outbox.is_empty());

    // the late-join Spawn already carries the change
    host.connect(peer);
    let mut client = TestClient::new(peer);
    deliver(&host.outbox, &mut client);
    let velocity = *client
        .manager
        .entity(&id)
        .unwrap()
        .component::<Rigidbody>()
        .unwrap()
        .velocity;
    assert_eq!(velocity, Vec3::Z);
}
