#![no_main]

use libfuzzer_sys::fuzz_target;
use squeeze::{decode, encode, Config};

fuzz_target!(|data: &[u8]| {
    let compressed = encode(data, Config::default()).unwrap();
    let decompressed = decode(&compressed, Config::default()).unwrap();
    assert_eq!(decompressed, data);
});
