/// Packed dirty masks: bit order, sizing and the 3 + 2 field scenario
use std::time::Duration;

use proptest::prelude::*;

use tether_shared::{any_set, byte_len, pack, unpack, ChannelKind, PeerKey};
use tether_test::{deliver, TestClient, TestHost, Vitals, UNIT};

proptest! {
    #[test]
    fn unpack_inverts_pack(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let packed = pack(&bits);
        prop_assert_eq!(packed.len(), byte_len(bits.len()));
        prop_assert_eq!(unpack(&packed, bits.len()), bits.clone());
        prop_assert_eq!(any_set(&bits), bits.contains(&true));
    }

    #[test]
    fn padding_stays_clear(bits in prop::collection::vec(any::<bool>(), 1..64)) {
        let packed = pack(&bits);
        let used = bits.len() % 8;
        if used != 0 {
            prop_assert_eq!(packed[packed.len() - 1] >> used, 0);
        }
    }
}

#[test]
fn field_one_of_three_plus_two() {
    let _ = env_logger::builder().is_test(true).try_init();

    let peer = PeerKey::new(1);
    let mut host = TestHost::new();
    host.connect(peer);
    let mut client = TestClient::new(peer);

    let id = host.spawn(UNIT);
    deliver(&host.outbox, &mut client);

    host.manager
        .entity_mut(&id)
        .unwrap()
        .component_mut::<Vitals>()
        .unwrap()
        .armor
        .set(5);
    assert_eq!(
        host.manager.entity(&id).unwrap().dirty_mask().bytes(),
        &[0b0000_0010]
    );

    assert_eq!(host.advance(Duration::from_millis(334)), 1);
    let messages = host.outbox.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].channel, ChannelKind::UnorderedUnreliable);
    // kind, identifier (LE), mask, armor
    assert_eq!(messages[0].payload, vec![2, 1, 0, 0b0000_0010, 5]);

    deliver(&host.outbox, &mut client);
    let vitals = client
        .manager
        .entity(&id)
        .unwrap()
        .component::<Vitals>()
        .unwrap();
    assert_eq!(*vitals.armor, 5);
    assert_eq!(*vitals.health, 100);
}

#[test]
fn mask_is_sized_from_field_count() {
    let mut host = TestHost::new();
    let id = host.spawn(UNIT);
    let entity = host.manager.entity(&id).unwrap();
    assert_eq!(entity.total_fields(), 5);
    assert_eq!(entity.dirty_mask().bytes().len(), 1);
}
