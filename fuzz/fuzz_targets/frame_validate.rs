#![no_main]

//! Fuzz target for EAP header parsing and method validation.
//!
//! Every byte string must either be rejected or yield a payload that lies
//! inside the declared length.

use bytes::Bytes;
use eap_proto::{Frame, MethodType, Vendor, validate, validate_slice};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let expanded = Vendor::new(0x0000_372A).unwrap_or(Vendor::IETF);
    for (vendor, method_type) in [
        (Vendor::IETF, MethodType::IDENTITY),
        (Vendor::IETF, MethodType::PEAP),
        (expanded, MethodType::new(1)),
    ] {
        if let Ok(payload) = validate_slice(vendor, method_type, data) {
            let length = usize::from(u16::from_be_bytes([data[2], data[3]]));
            assert!(payload.len() < length);
            assert!(length <= data.len());
        }
    }

    let Ok(frame) = Frame::from_bytes(Bytes::copy_from_slice(data)) else { return };
    let slice = validate_slice(Vendor::IETF, MethodType::IDENTITY, data).ok();
    let framed = validate(Vendor::IETF, MethodType::IDENTITY, &frame).ok();
    assert_eq!(slice, framed);
});
