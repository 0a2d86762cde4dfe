#![no_main]

//! Fuzz target for the Identity method.
//!
//! Splits the input into two responses and feeds them in order to fresh and
//! picked-up exchanges. Whatever the input, a finished exchange keeps its
//! decision and the identity it stored.

use eap_proto::{Frame, MethodType, Vendor, validate};
use eap_server::{IdentityMethod, MethodExchange, ServerMethod, ServerSession};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else { return };
    let (first, second) = rest.split_at(usize::from(split).min(rest.len()));
    let Ok(first) = Frame::from_bytes(first.to_vec()) else { return };
    let second = Frame::from_bytes(second.to_vec()).ok();

    let method = IdentityMethod::new();
    let expected = validate(Vendor::IETF, MethodType::IDENTITY, &first).ok();

    for pick_up in [false, true] {
        let mut session = ServerSession::new();
        let exchange = if pick_up { method.init_pick_up(&session) } else { method.init(&session) };
        let Ok(mut exchange) = exchange else { return };

        let _ = exchange.check(&session, &first);
        let _ = exchange.process(&mut session, &first);

        if exchange.is_success() {
            let stored = session.identity().map(|identity| identity.as_bytes());
            assert_eq!(stored, expected);
        }
        if exchange.is_done() {
            let success = exchange.is_success();
            let stored = session.identity().cloned();
            if let Some(second) = &second {
                let _ = exchange.process(&mut session, second);
            }
            assert!(exchange.is_done());
            assert_eq!(exchange.is_success(), success);
            assert_eq!(session.identity().cloned(), stored);
        }
        exchange.reset();
    }
});
