//! Identity exchange integration tests.
//!
//! Drives the Identity method through the dispatcher the way an
//! authenticator would:
//! - Request/Response round trip and stored identity
//! - Pick-up from an unsolicited response
//! - Stale and foreign responses are dropped

use std::sync::Arc;

use eap_harness::{DispatchAction, DispatchError, DispatchStatus, Dispatcher, RecordingHost};
use eap_proto::{Code, Frame, MethodType, Vendor};
use eap_server::{MethodRegistry, ServerSession, register_identity};
use hex_literal::hex;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn registry() -> Arc<MethodRegistry> {
    let mut registry = MethodRegistry::new();
    register_identity(&mut registry, None).expect("identity registers");
    Arc::new(registry)
}

fn dispatcher(host: &Arc<RecordingHost>) -> Dispatcher {
    let session = ServerSession::new().with_callbacks(host.clone());
    Dispatcher::new(registry(), session)
}

fn identity_response(identifier: u8, identity: &[u8]) -> Frame {
    Frame::response(Vendor::IETF, MethodType::IDENTITY, identifier, identity).expect("response")
}

fn sent_frame(action: &DispatchAction) -> &Frame {
    match action {
        DispatchAction::SendFrame(frame) => frame,
        other => panic!("expected SendFrame, got {other:?}"),
    }
}

#[test]
fn identity_round_trip() {
    init_logging();
    let host = Arc::new(RecordingHost::with_prompt("auth"));
    let mut dispatcher = dispatcher(&host).with_first_identifier(7);

    let actions = dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(sent_frame(&actions[0]).as_bytes(), hex!("01 07 0009 01 61757468"));
    assert_eq!(dispatcher.status(), DispatchStatus::Running);

    let actions = dispatcher.handle_response(identity_response(7, b"alice")).unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(sent_frame(&actions[0]).as_bytes(), hex!("03 07 0004"));
    assert_eq!(actions[1], DispatchAction::Finished { success: true });
    assert_eq!(dispatcher.status(), DispatchStatus::Finished { success: true });

    let identity = dispatcher.session().identity().unwrap();
    assert_eq!(identity.as_bytes(), b"alice");
    assert!(!dispatcher.session().update_user());
    assert_eq!(host.events(), vec!["EAP-Response/Identity 'alice'".to_string()]);
}

#[test]
fn escaped_identity_in_session_log() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host);

    let actions = dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap();
    assert_eq!(sent_frame(&actions[0]).as_bytes(), hex!("01 00 0005 01"));

    dispatcher.handle_response(identity_response(0, b"bob\n\x01")).unwrap();
    assert_eq!(host.events(), vec!["EAP-Response/Identity 'bob\\n\\x01'".to_string()]);
    assert_eq!(dispatcher.session().identity().unwrap().as_bytes(), b"bob\n\x01");
}

#[test]
fn second_exchange_flags_user_update() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host);

    dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap();
    dispatcher.handle_response(identity_response(0, b"anonymous")).unwrap();
    assert!(!dispatcher.session().update_user());

    let actions = dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap();
    assert_eq!(sent_frame(&actions[0]).identifier(), 1);
    dispatcher.handle_response(identity_response(1, b"alice@example.org")).unwrap();

    assert!(dispatcher.session().update_user());
    assert_eq!(dispatcher.session().identity().unwrap().as_bytes(), b"alice@example.org");
}

#[test]
fn stale_identifier_is_dropped() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host).with_first_identifier(3);
    dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap();

    let actions = dispatcher.handle_response(identity_response(2, b"late")).unwrap();
    assert!(actions.is_empty());
    assert_eq!(dispatcher.status(), DispatchStatus::Running);
    assert!(dispatcher.session().identity().is_none());
}

#[test]
fn foreign_method_response_is_dropped() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host);
    dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap();

    let nak = Frame::response(Vendor::IETF, MethodType::NAK, 0, &[MethodType::PEAP.value() as u8])
        .unwrap();
    assert!(dispatcher.handle_response(nak).unwrap().is_empty());

    let truncated = Frame::from_bytes(hex!("02 00 0004").to_vec()).unwrap();
    assert!(dispatcher.handle_response(truncated).unwrap().is_empty());

    assert_eq!(dispatcher.status(), DispatchStatus::Running);
    assert!(host.events().is_empty());
}

#[test]
fn pick_up_skips_the_request() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host);

    let actions = dispatcher
        .pick_up(Vendor::IETF, MethodType::IDENTITY, identity_response(42, b"carol"))
        .unwrap();

    assert_eq!(actions.len(), 2);
    let decision = sent_frame(&actions[0]);
    assert_eq!(decision.code(), Some(Code::Success));
    assert_eq!(decision.identifier(), 42);
    assert_eq!(dispatcher.session().identity().unwrap().as_bytes(), b"carol");
    assert!(dispatcher.last_request().is_none());
}

#[test]
fn pick_up_of_malformed_response_fails() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host);

    let wrong_type = Frame::response(Vendor::IETF, MethodType::MD5, 5, b"x").unwrap();
    let actions = dispatcher.pick_up(Vendor::IETF, MethodType::IDENTITY, wrong_type).unwrap();

    assert_eq!(sent_frame(&actions[0]).code(), Some(Code::Failure));
    assert_eq!(actions[1], DispatchAction::Finished { success: false });
    assert!(dispatcher.session().identity().is_none());
}

#[test]
fn unknown_method_is_reported() {
    let host = Arc::new(RecordingHost::new());
    let mut dispatcher = dispatcher(&host);

    let err = dispatcher.start(Vendor::IETF, MethodType::TLS).unwrap_err();
    assert!(matches!(err, DispatchError::UnknownMethod { method_type: MethodType::TLS, .. }));
    assert_eq!(dispatcher.status(), DispatchStatus::Idle);

    let err = dispatcher.handle_response(identity_response(0, b"x")).unwrap_err();
    assert!(matches!(err, DispatchError::NotRunning));
}

#[test]
fn oversized_prompt_fails_before_sending() {
    let host = Arc::new(RecordingHost::with_prompt(vec![b'a'; usize::from(u16::MAX)]));
    let mut dispatcher = dispatcher(&host);

    let err = dispatcher.start(Vendor::IETF, MethodType::IDENTITY).unwrap_err();
    assert!(matches!(err, DispatchError::Method(_)));
    assert_eq!(dispatcher.status(), DispatchStatus::Finished { success: false });
}
