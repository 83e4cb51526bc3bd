//! Fuzz target for `decrypt_message`
//!
//! Incoming payloads arrive from the transport and are fully untrusted.
//! This fuzzer drives arbitrary `{ciphertext, iv}` string pairs through
//! decryption to find:
//! - Panics on malformed base64 or wrong-length ivs
//! - Paths that return bytes without passing authentication
//!
//! Decryption should NEVER panic and NEVER succeed for fuzzed input
//! (forging a valid GCM tag is computationally infeasible).

#![no_main]

use hearth_crypto::{EncryptedPayload, RoomKey, SoftwareProvider, decrypt_message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, String)| {
    let (ciphertext, iv) = input;
    let provider = SoftwareProvider::new();
    let key = RoomKey::from_bytes([0x42; 32]);

    let payload = EncryptedPayload { ciphertext, iv };
    let result = decrypt_message(&provider, &key, &payload);

    assert!(result.is_err(), "fuzzed input must never authenticate");
});
