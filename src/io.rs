//! Adapters that run the codec over [`std::io`] streams.

use std::io::{self, Read, Write};

use crate::lzss::{Config, LzssDecoder, LzssEncoder};
use crate::{FinishStatus, PollStatus, Transform, TransformError};

fn codec_error(fault: TransformError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, fault)
}

/// A [`Write`] adapter that compresses everything written through it into
/// the inner writer.
///
/// The stream is not complete until [`finish`] runs; dropping the adapter
/// without it loses the trailing bits of the final byte.
///
/// [`finish`]: LzssWriter::finish
pub struct LzssWriter<W: Write> {
    inner: W,
    encoder: LzssEncoder,
    /// Scratch space for draining encoder output.
    chunk: Box<[u8]>,
}

impl<W: Write> LzssWriter<W> {
    pub fn new(inner: W, config: Config) -> Self {
        let encoder = LzssEncoder::new(config);
        let chunk = vec![0; encoder.output_hint()].into_boxed_slice();
        Self {
            inner,
            encoder,
            chunk,
        }
    }

    /// Polls the encoder dry and forwards everything to the inner writer.
    fn drain(&mut self) -> io::Result<()> {
        loop {
            let (produced, status) =
                self.encoder.poll(&mut self.chunk).map_err(codec_error)?;
            if produced > 0 {
                self.inner.write_all(&self.chunk[..produced])?;
            }
            if status == PollStatus::Exhausted {
                return Ok(());
            }
        }
    }

    /// Ends the compressed stream, flushes the inner writer and returns
    /// it.
    pub fn finish(mut self) -> io::Result<W> {
        loop {
            match self.encoder.finish().map_err(codec_error)? {
                FinishStatus::Done => break,
                FinishStatus::More => self.drain()?,
            }
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }
}

impl<W: Write> Write for LzssWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let taken = self.encoder.sink(buf).map_err(codec_error)?;
            self.drain()?;
            if taken > 0 {
                return Ok(taken);
            }
            // The encoder was full; the drain above reopened it.
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        // Bits for input still staged in the encoder cannot be forced out
        // without ending the stream; forward what is already produced.
        self.drain()?;
        self.inner.flush()
    }
}

/// A [`Read`] adapter that decompresses the inner reader.
///
/// End of file is reported only once the inner stream is exhausted and
/// the decoder has handed out every pending byte.
pub struct LzssReader<R: Read> {
    inner: R,
    decoder: LzssDecoder,
    /// Bytes pulled from the inner reader but not yet staged.
    pending: Box<[u8]>,
    /// Start of the unstaged bytes in 'pending'.
    start: usize,
    /// End of the unstaged bytes in 'pending'.
    end: usize,
    /// The inner reader hit end of file.
    eof: bool,
    /// The finish handshake reported completion.
    done: bool,
}

impl<R: Read> LzssReader<R> {
    pub fn new(inner: R, config: Config) -> Self {
        let decoder = LzssDecoder::new(config);
        Self {
            inner,
            decoder,
            pending: vec![0; crate::lzss::DEFAULT_INPUT_BUFFER]
                .into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
            done: false,
        }
    }

    #[must_use]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> Read for LzssReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.done {
            return Ok(0);
        }
        loop {
            // Serve decoded output before touching the inner reader.
            let (produced, _) =
                self.decoder.poll(buf).map_err(codec_error)?;
            if produced > 0 {
                return Ok(produced);
            }

            // Stage input that is already on hand.
            if self.start < self.end {
                let taken = self
                    .decoder
                    .sink(&self.pending[self.start..self.end])
                    .map_err(codec_error)?;
                self.start += taken;
                debug_assert!(taken > 0, "Decoder refused staged input");
                continue;
            }

            if self.eof {
                match self.decoder.finish().map_err(codec_error)? {
                    FinishStatus::Done => {
                        self.done = true;
                        return Ok(0);
                    }
                    FinishStatus::More => continue,
                }
            }

            // Refill from the inner reader.
            let got = self.inner.read(&mut self.pending)?;
            if got == 0 {
                self.eof = true;
            } else {
                self.start = 0;
                self.end = got;
            }
        }
    }
}
