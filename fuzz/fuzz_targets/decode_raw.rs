#![no_main]

use libfuzzer_sys::fuzz_target;
use squeeze::{decode, Config};

fuzz_target!(|data: &[u8]| {
    // Arbitrary input is not a valid stream; decoding may hand back
    // garbage but must never crash.
    let _ = decode(data, Config::default());
});
