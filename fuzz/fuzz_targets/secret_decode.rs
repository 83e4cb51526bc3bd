//! Fuzz target for `FamilySecret::decode`
//!
//! Stored secrets come back from platform keystores that other builds or
//! platforms may have written. This fuzzer feeds arbitrary strings
//! through the codec to find:
//! - Panics on malformed base64
//! - Length-check bypasses (any accepted value must decode to 32 bytes)
//!
//! The decoder should NEVER panic. All invalid inputs must return an
//! error.

#![no_main]

use hearth_crypto::FamilySecret;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|encoded: String| {
    // Decoding arbitrary strings must never panic, only return Err
    if let Ok(secret) = FamilySecret::decode(&encoded) {
        // Anything accepted must re-encode canonically
        assert_eq!(secret.encode().len(), 44);
        assert_eq!(secret.as_bytes().len(), 32);
    }
});
