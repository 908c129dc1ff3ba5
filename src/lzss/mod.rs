//! A streaming LZSS codec with configurable window and lookahead sizes.
//!
//! The compressed stream is a plain bit stream, most significant bit
//! first. Each token is either a literal (marker bit 1 followed by the
//! eight bits of the byte) or a back-reference (marker bit 0, then
//! 'window_bits' bits holding the distance minus one, then
//! 'lookahead_bits' bits holding the length minus one). The final partial
//! byte is padded with zero bits, which the decoder parses as a truncated
//! token and discards. There is no header: the two sides must agree on
//! the parameters out of band.

mod bits;
mod decode;
mod encode;

pub use decode::LzssDecoder;
pub use encode::LzssEncoder;

use crate::Error;

/// The smallest supported window exponent.
pub const WINDOW_BITS_MIN: u8 = 4;
/// The largest supported window exponent.
pub const WINDOW_BITS_MAX: u8 = 15;
/// The smallest supported lookahead exponent. The largest is one below
/// the window exponent.
pub const LOOKAHEAD_BITS_MIN: u8 = 3;
/// The default window exponent, a 2 KiB window.
pub const DEFAULT_WINDOW_BITS: u8 = 11;
/// The default lookahead exponent, 16 byte matches.
pub const DEFAULT_LOOKAHEAD_BITS: u8 = 4;
/// The default size of the decoder's input staging buffer.
pub const DEFAULT_INPUT_BUFFER: usize = 256;

/// Validated codec parameters, shared by both sides of a stream.
///
/// Construction is the only place the bounds are checked, so a session
/// can never exist with unusable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Window exponent; matches reach back up to 1 << window_bits bytes.
    window_bits: u8,
    /// Lookahead exponent; matches run up to 1 << lookahead_bits bytes.
    lookahead_bits: u8,
}

impl Config {
    /// Creates a configuration, rejecting exponents outside the supported
    /// ranges.
    pub fn new(window_bits: u8, lookahead_bits: u8) -> Result<Self, Error> {
        if !(WINDOW_BITS_MIN..=WINDOW_BITS_MAX).contains(&window_bits) {
            return Err(Error::InvalidWindow(window_bits));
        }
        if lookahead_bits < LOOKAHEAD_BITS_MIN
            || lookahead_bits >= window_bits
        {
            return Err(Error::InvalidLookahead(lookahead_bits));
        }
        Ok(Self {
            window_bits,
            lookahead_bits,
        })
    }

    #[must_use]
    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    #[must_use]
    pub fn lookahead_bits(&self) -> u8 {
        self.lookahead_bits
    }

    /// The window size in bytes.
    #[must_use]
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    /// The longest match length in bytes.
    #[must_use]
    pub fn lookahead_size(&self) -> usize {
        1 << self.lookahead_bits
    }

    /// The longest match that is still cheaper to emit as literals. A
    /// back-reference costs 1 + window_bits + lookahead_bits bits, so
    /// matches must beat that to be worth taking.
    pub(crate) fn break_even(&self) -> usize {
        (1 + self.window_bits as usize + self.lookahead_bits as usize) / 8
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_bits: DEFAULT_WINDOW_BITS,
            lookahead_bits: DEFAULT_LOOKAHEAD_BITS,
        }
    }
}
