//! Fuzz target for reply decoding
//!
//! # Invariants
//!
//! - NEVER panic on arbitrary bytes
//! - A decoded reply re-encodes and decodes to the same clock reading and
//!   status classification

#![no_main]

use bulletin_proto::{decode_reply, encode_reply};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(reply) = decode_reply(data) else {
        return;
    };

    let clock = reply.data.clock();
    let status = reply.data.status_kind();

    let bytes = encode_reply(&reply).expect("decoded reply must re-encode");
    let again = decode_reply(&bytes).expect("re-encoded reply must decode");

    assert_eq!(again.data.clock(), clock);
    assert_eq!(again.data.status_kind(), status);
});
