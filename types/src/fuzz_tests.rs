//! Fuzz tests for inbound decoding.
//!
//! Decoding arbitrary bytes must never panic, and any operation body that decodes must
//! decode back to the same value once re-encoded.

use crate::{draw::U256, Event, Inbound, Message, Operation};
use commonware_codec::{DecodeExt, Encode, ReadExt};
use commonware_cryptography::{ed25519::PrivateKey, PrivateKeyExt};
use proptest::prelude::*;

fn arb_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

fn arb_word() -> impl Strategy<Value = U256> {
    prop::array::uniform32(any::<u8>()).prop_map(U256::from)
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (any::<u64>(), any::<u32>(), arb_word()).prop_map(|(query_id, draw_id, answer)| {
            Operation::LuckRoll {
                query_id,
                draw_id,
                answer,
            }
        }),
        (any::<u64>(), any::<u32>(), any::<u64>(), arb_word()).prop_map(
            |(query_id, draw_id, min_entry_amount, key_length)| Operation::CreateDraw {
                query_id,
                draw_id,
                min_entry_amount,
                key_length,
            }
        ),
        Just(Operation::TopUp),
    ]
}

proptest! {
    #[test]
    fn decode_arbitrary_inbound_never_panics(bytes in arb_bytes(512)) {
        let _ = Inbound::decode(bytes.as_slice());
        let _ = Message::decode(bytes.as_slice());
        let _ = Event::decode(bytes.as_slice());
    }

    #[test]
    fn decode_arbitrary_operation_never_panics(bytes in arb_bytes(256)) {
        let mut reader = bytes.as_slice();
        if let Ok(op) = Operation::read(&mut reader) {
            let reencoded = Operation::decode(op.encode()).expect("re-encoded operation decodes");
            prop_assert_eq!(reencoded, op);
        }
    }

    #[test]
    fn signed_message_survives_transport(
        seed in any::<u64>(),
        value in any::<u64>(),
        op in arb_operation(),
    ) {
        let private = PrivateKey::from_seed(seed);
        let message = Message::sign(&private, value, Some(op));
        let decoded = Message::decode(message.encode()).expect("message decodes");
        prop_assert!(decoded.verify());
        prop_assert_eq!(decoded, message);
    }
}
