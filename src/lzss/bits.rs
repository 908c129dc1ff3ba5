//! Bit-level plumbing for the codec: an incremental writer that packs
//! token bits most significant first, and an all-or-nothing reader that
//! never consumes a partial field.

/// Packs bits most significant first and hands them out as whole bytes.
///
/// Queued bits survive across calls, so emission can suspend when an
/// output slice fills mid-token and resume losslessly on the next drain.
#[derive(Debug)]
pub struct BitWriter {
    /// Queued bits, right-aligned in the low 'queued' bits. Bits above
    /// the live window are stale and ignored.
    acc: u64,
    /// Number of queued bits.
    queued: u32,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    pub fn new() -> Self {
        Self { acc: 0, queued: 0 }
    }

    /// Queues the lowest 'count' bits of 'bits', oldest first.
    pub fn push(&mut self, bits: u16, count: u32) {
        debug_assert!(count <= 16, "Pushing too many bits");
        debug_assert!(self.queued + count <= 64, "Bit queue overflow");
        self.acc =
            (self.acc << count) | (u64::from(bits) & ((1u64 << count) - 1));
        self.queued += count;
    }

    /// Moves as many whole bytes as fit into 'out'. Returns the number of
    /// bytes written; up to seven bits stay queued for the next byte.
    pub fn drain(&mut self, out: &mut [u8]) -> usize {
        let mut written = 0;
        while self.queued >= 8 && written < out.len() {
            out[written] = (self.acc >> (self.queued - 8)) as u8;
            self.queued -= 8;
            written += 1;
        }
        written
    }

    /// True while at least one whole byte is ready to drain.
    #[must_use]
    pub fn has_byte(&self) -> bool {
        self.queued >= 8
    }

    /// Pads the queue with zero bits up to the next byte boundary, so the
    /// tail of the stream drains as a final whole byte.
    pub fn pad_to_byte(&mut self) {
        let rem = self.queued % 8;
        if rem != 0 {
            self.push(0, 8 - rem);
        }
    }
}

/// Reads bit fields most significant first out of staged input bytes.
///
/// Reads are all or nothing: a field is taken whole or the reader is left
/// untouched, so a decoder can suspend mid-token and pick up exactly
/// where it stopped once more input is staged.
#[derive(Debug)]
pub struct BitReader {
    /// Staged input bytes waiting to be read.
    staging: Box<[u8]>,
    /// Number of staged bytes.
    len: usize,
    /// Read position within the staged bytes.
    pos: usize,
    /// The byte bits are currently being taken from.
    current: u8,
    /// Bits of 'current' not yet taken.
    live: u32,
}

impl BitReader {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            staging: vec![0; capacity].into_boxed_slice(),
            len: 0,
            pos: 0,
            current: 0,
            live: 0,
        }
    }

    /// Stages as much of 'input' as fits. Returns the number of bytes
    /// taken; zero means the staging space is full until it is read down.
    pub fn stage(&mut self, input: &[u8]) -> usize {
        let take = input.len().min(self.staging.len() - self.len);
        self.staging[self.len..self.len + take]
            .copy_from_slice(&input[..take]);
        self.len += take;
        take
    }

    /// True once every staged byte has been consumed. Leftover bits of
    /// the byte being read do not count; at the end of a stream they are
    /// padding.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.len == 0
    }

    /// Takes 'count' bits, oldest first, or returns None without
    /// consuming anything when that many bits are not staged.
    pub fn take(&mut self, count: u32) -> Option<u16> {
        debug_assert!(count <= 16, "Taking too many bits");
        let available = (self.len - self.pos) * 8 + self.live as usize;
        if available < count as usize {
            return None;
        }
        let mut bits = 0u16;
        for _ in 0..count {
            if self.live == 0 {
                self.current = self.staging[self.pos];
                self.pos += 1;
                self.live = 8;
                if self.pos == self.len {
                    // Fully consumed; reopen the staging space.
                    self.pos = 0;
                    self.len = 0;
                }
            }
            self.live -= 1;
            bits = (bits << 1) | u16::from((self.current >> self.live) & 1);
        }
        Some(bits)
    }
}
