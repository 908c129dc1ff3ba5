//! The compressing half of the codec.

use crate::lzss::bits::BitWriter;
use crate::lzss::Config;
use crate::{FinishStatus, PollStatus, Transform, TransformError};

/// Marks a chain slot with no earlier occurrence of the byte.
const NO_MATCH: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accepting input into the staging half of the buffer.
    Filling,
    /// Tokenizing the staged bytes.
    Scanning,
    /// Input is over; pad and emit the tail of the bit stream.
    Flushing,
    Done,
}

/// A streaming LZSS encoder.
///
/// Input accumulates in a staging area and is only compressed once the
/// staging fills or the stream is finished, so every scan runs against a
/// full window of history. The window starts zeroed, and matches may
/// reach into that zero history; the decoder's window starts the same
/// way, so such references resolve correctly.
pub struct LzssEncoder {
    config: Config,
    /// The history window followed by the staging area, each window-sized.
    buf: Box<[u8]>,
    /// For each buffer position, the previous position holding the same
    /// byte, or NO_MATCH. Rebuilt at the start of every scan pass.
    chain: Box<[i32]>,
    /// Bytes staged behind the window half.
    staged: usize,
    /// Staged bytes already tokenized.
    scan: usize,
    state: State,
    /// Set once 'finish' is called; no further input is accepted.
    finishing: bool,
    /// Token bits waiting to drain into poll output.
    bits: BitWriter,
}

impl LzssEncoder {
    pub fn new(config: Config) -> Self {
        let window = config.window_size();
        Self {
            config,
            buf: vec![0; 2 * window].into_boxed_slice(),
            chain: vec![NO_MATCH; 2 * window].into_boxed_slice(),
            staged: 0,
            scan: 0,
            state: State::Filling,
            finishing: false,
            bits: BitWriter::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> Config {
        self.config
    }

    /// Builds the per-byte chain index over the window and the staged
    /// bytes, then starts tokenizing.
    fn begin_scan(&mut self) {
        let end = self.config.window_size() + self.staged;
        let mut last = [NO_MATCH; 256];
        for i in 0..end {
            let value = self.buf[i] as usize;
            self.chain[i] = last[value];
            last[value] = i as i32;
        }
        self.state = State::Scanning;
    }

    /// Finds the longest earlier match for the bytes starting at absolute
    /// position 'end', capped at 'max_len'. Returns the distance back and
    /// the length, or None when literals are cheaper.
    fn longest_match(
        &self,
        end: usize,
        max_len: usize,
    ) -> Option<(usize, usize)> {
        let start = end - self.config.window_size();
        let mut best_len = 0;
        let mut best_pos = 0;
        let mut pos = self.chain[end];
        while pos >= start as i32 {
            let at = pos as usize;
            // The chain guarantees the first byte matches; skip candidates
            // that cannot beat the best so far before comparing in full.
            if self.buf[at + best_len] == self.buf[end + best_len] {
                let mut len = 1;
                while len < max_len && self.buf[at + len] == self.buf[end + len]
                {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_pos = at;
                    if len == max_len {
                        break;
                    }
                }
            }
            pos = self.chain[at];
        }
        if best_len > self.config.break_even() {
            Some((end - best_pos, best_len))
        } else {
            None
        }
    }

    /// Tokenizes one step at the scan position: a back-reference covering
    /// several bytes, or a single literal.
    fn emit_token(&mut self) {
        let end = self.config.window_size() + self.scan;
        let max_len = self.config.lookahead_size().min(self.staged - self.scan);
        match self.longest_match(end, max_len) {
            Some((distance, length)) => {
                self.bits.push(0, 1);
                self.bits.push(
                    (distance - 1) as u16,
                    u32::from(self.config.window_bits()),
                );
                self.bits.push(
                    (length - 1) as u16,
                    u32::from(self.config.lookahead_bits()),
                );
                self.scan += length;
            }
            None => {
                self.bits.push(1, 1);
                self.bits.push(u16::from(self.buf[end]), 8);
                self.scan += 1;
            }
        }
    }

    /// Shifts the scanned prefix into the history half so its bytes stay
    /// reachable for future matches, and reopens the staging space.
    fn save_backlog(&mut self) {
        let window = self.config.window_size();
        let rem = self.staged - self.scan;
        self.buf.copy_within(self.scan..window + self.staged, 0);
        self.staged = rem;
        self.scan = 0;
        self.state = State::Filling;
    }
}

impl Transform for LzssEncoder {
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError> {
        if self.finishing {
            return Err(TransformError("sink after finish"));
        }
        if self.state != State::Filling {
            // Pending tokens must drain before more input can stage.
            return Ok(0);
        }
        let window = self.config.window_size();
        let take = input.len().min(window - self.staged);
        self.buf[window + self.staged..window + self.staged + take]
            .copy_from_slice(&input[..take]);
        self.staged += take;
        if self.staged == window {
            self.begin_scan();
        }
        Ok(take)
    }

    fn poll(
        &mut self,
        output: &mut [u8],
    ) -> Result<(usize, PollStatus), TransformError> {
        if output.is_empty() {
            return Err(TransformError("poll into an empty buffer"));
        }
        let mut written = 0;
        loop {
            written += self.bits.drain(&mut output[written..]);
            if written == output.len() {
                // Suspended mid-stream; queued bits keep their place.
                return Ok((written, PollStatus::More));
            }
            match self.state {
                State::Filling | State::Done => {
                    return Ok((written, PollStatus::Exhausted));
                }
                State::Scanning => {
                    // When more input may follow, stop a full lookahead
                    // short of the staged end so a chunk boundary never
                    // truncates a match.
                    let keep_back = if self.finishing {
                        1
                    } else {
                        self.config.lookahead_size()
                    };
                    if self.scan + keep_back > self.staged {
                        if self.finishing {
                            self.state = State::Flushing;
                        } else {
                            self.save_backlog();
                            return Ok((written, PollStatus::Exhausted));
                        }
                    } else {
                        self.emit_token();
                    }
                }
                State::Flushing => {
                    self.bits.pad_to_byte();
                    self.state = State::Done;
                }
            }
        }
    }

    fn finish(&mut self) -> Result<FinishStatus, TransformError> {
        if !self.finishing {
            self.finishing = true;
            if self.state == State::Filling {
                self.begin_scan();
            }
        }
        Ok(if self.state == State::Done && !self.bits.has_byte() {
            FinishStatus::Done
        } else {
            FinishStatus::More
        })
    }

    fn output_hint(&self) -> usize {
        self.config.window_size()
    }
}
