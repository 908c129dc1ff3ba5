//! The decompressing half of the codec.

use crate::lzss::bits::BitReader;
use crate::lzss::{Config, DEFAULT_INPUT_BUFFER};
use crate::{FinishStatus, PollStatus, Transform, TransformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At a token boundary, waiting on the marker bit.
    TagBit,
    /// Marker seen; reading the eight literal bits.
    Literal,
    /// Reading the high bits of a back-reference distance.
    IndexMsb,
    /// Reading the low bits of a back-reference distance.
    IndexLsb,
    /// Reading the high bits of a back-reference length.
    CountMsb,
    /// Reading the low bits of a back-reference length.
    CountLsb,
    /// Copying a back-reference out of the window.
    Backref,
}

/// A streaming LZSS decoder.
///
/// Keeps a ring over the last window of produced output so
/// back-references can be resolved, plus a small staging buffer for
/// compressed input arriving in fragments. The ring starts zeroed to
/// mirror the encoder's window, and no reference can reach outside it,
/// so corrupt input produces garbage bytes rather than a fault.
pub struct LzssDecoder {
    config: Config,
    /// The last window of produced output, as a ring.
    window: Box<[u8]>,
    /// Next ring slot to write; wraps by masking.
    head: usize,
    /// Staged compressed input, read bit by bit.
    bits: BitReader,
    state: State,
    /// Distance of the back-reference being decoded.
    distance: usize,
    /// Bytes of the back-reference still to copy.
    remaining: usize,
    /// Set once 'finish' is called; no further input is accepted.
    finishing: bool,
}

impl LzssDecoder {
    /// Creates a decoder with the default input staging size.
    pub fn new(config: Config) -> Self {
        Self::with_input_buffer(config, DEFAULT_INPUT_BUFFER)
    }

    /// Creates a decoder with 'staging' bytes of input staging. Small
    /// values trade throughput for memory.
    pub fn with_input_buffer(config: Config, staging: usize) -> Self {
        assert!(staging > 0, "Staging buffer cannot be empty");
        Self {
            config,
            window: vec![0; config.window_size()].into_boxed_slice(),
            head: 0,
            bits: BitReader::with_capacity(staging),
            state: State::TagBit,
            distance: 0,
            remaining: 0,
            finishing: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }
}

impl Transform for LzssDecoder {
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError> {
        if self.finishing {
            return Err(TransformError("sink after finish"));
        }
        Ok(self.bits.stage(input))
    }

    fn poll(
        &mut self,
        output: &mut [u8],
    ) -> Result<(usize, PollStatus), TransformError> {
        if output.is_empty() {
            return Err(TransformError("poll into an empty buffer"));
        }
        let window_bits = u32::from(self.config.window_bits());
        let lookahead_bits = u32::from(self.config.lookahead_bits());
        let mask = self.config.window_size() - 1;
        let mut written = 0;

        loop {
            let before = self.state;
            match self.state {
                State::TagBit => {
                    if let Some(bit) = self.bits.take(1) {
                        if bit == 1 {
                            self.state = State::Literal;
                        } else {
                            self.distance = 0;
                            self.state = if window_bits > 8 {
                                State::IndexMsb
                            } else {
                                State::IndexLsb
                            };
                        }
                    }
                }
                State::Literal => {
                    if written < output.len() {
                        if let Some(byte) = self.bits.take(8) {
                            let byte = byte as u8;
                            self.window[self.head & mask] = byte;
                            self.head = self.head.wrapping_add(1);
                            output[written] = byte;
                            written += 1;
                            self.state = State::TagBit;
                        }
                    }
                }
                State::IndexMsb => {
                    if let Some(high) = self.bits.take(window_bits - 8) {
                        self.distance = usize::from(high) << 8;
                        self.state = State::IndexLsb;
                    }
                }
                State::IndexLsb => {
                    if let Some(low) = self.bits.take(window_bits.min(8)) {
                        self.distance = (self.distance | usize::from(low)) + 1;
                        self.remaining = 0;
                        self.state = if lookahead_bits > 8 {
                            State::CountMsb
                        } else {
                            State::CountLsb
                        };
                    }
                }
                State::CountMsb => {
                    if let Some(high) = self.bits.take(lookahead_bits - 8) {
                        self.remaining = usize::from(high) << 8;
                        self.state = State::CountLsb;
                    }
                }
                State::CountLsb => {
                    if let Some(low) = self.bits.take(lookahead_bits.min(8)) {
                        self.remaining = (self.remaining | usize::from(low)) + 1;
                        self.state = State::Backref;
                    }
                }
                State::Backref => {
                    // Byte at a time, so an overlapping copy feeds on the
                    // bytes it just produced.
                    while self.remaining > 0 && written < output.len() {
                        let byte = self.window
                            [self.head.wrapping_sub(self.distance) & mask];
                        self.window[self.head & mask] = byte;
                        self.head = self.head.wrapping_add(1);
                        output[written] = byte;
                        written += 1;
                        self.remaining -= 1;
                    }
                    if self.remaining == 0 {
                        self.state = State::TagBit;
                    }
                }
            }

            // A pass that changed nothing is stuck on output space or on
            // input bits; report which.
            if self.state == before {
                let status = if written == output.len() {
                    PollStatus::More
                } else {
                    PollStatus::Exhausted
                };
                return Ok((written, status));
            }
        }
    }

    fn finish(&mut self) -> Result<FinishStatus, TransformError> {
        self.finishing = true;
        // A stream may end inside a token: the zero padding of the final
        // byte parses as a truncated tag or back-reference, and is
        // discarded. Only an unfinished window copy still owes output.
        let done = match self.state {
            State::Backref => false,
            _ => self.bits.is_drained(),
        };
        Ok(if done {
            FinishStatus::Done
        } else {
            FinishStatus::More
        })
    }

    fn output_hint(&self) -> usize {
        self.config.window_size()
    }
}
