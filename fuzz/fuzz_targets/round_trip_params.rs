#![no_main]

use libfuzzer_sys::fuzz_target;
use squeeze::{decode, encode, Config};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // The first two bytes pick the parameters, the rest is the payload.
    let window = 4 + data[0] % 12;
    let lookahead = 3 + data[1] % (window - 3);
    let config = Config::new(window, lookahead).unwrap();

    let payload = &data[2..];
    let compressed = encode(payload, config).unwrap();
    let decompressed = decode(&compressed, config).unwrap();
    assert_eq!(decompressed, payload);
});
