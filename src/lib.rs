//! A streaming implementation of the LZSS compression algorithm with a
//! small, configurable window, intended for data produced by embedded and
//! memory-constrained systems.
//!
//! The crate is built out of three layers. The [`Transform`] trait is the
//! protocol every codec session speaks: input is offered with `sink`,
//! output is collected with `poll`, and the end of the stream is negotiated
//! with `finish`. The [`StreamDriver`] pumps a whole input buffer through
//! any transform and gathers the result in an [`OutputBuffer`]. On top of
//! those, [`encode`] and [`decode`] run a complete session in one call, and
//! [`io::LzssWriter`] / [`io::LzssReader`] adapt the codec to the standard
//! io traits.
//!
//! The compressed stream carries no header and no checksum, so both sides
//! must agree on the [`Config`] parameters out of band. A corrupt stream
//! decodes into garbage bytes rather than an error.

pub mod buffer;
pub mod driver;
pub mod io;
pub mod lzss;

pub use buffer::{GrowthPolicy, OutputBuffer};
pub use driver::{Phase, StreamDriver};
pub use lzss::{Config, LzssDecoder, LzssEncoder};

use std::collections::TryReserveError;
use thiserror::Error;

/// A fault reported by a transform. Always fatal for the session: the
/// transform's state afterwards is unspecified and the session must be
/// abandoned, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransformError(pub &'static str);

/// The error type for every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage for an output buffer could not be obtained, either while
    /// creating it, growing it, or taking a snapshot. The buffer involved
    /// is left exactly as it was.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// The transform reported a fault.
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    /// A window exponent outside the supported range.
    #[error(
        "invalid window size {0}, expected {min} to {max}",
        min = lzss::WINDOW_BITS_MIN,
        max = lzss::WINDOW_BITS_MAX
    )]
    InvalidWindow(u8),

    /// A lookahead exponent outside the supported range.
    #[error(
        "invalid lookahead size {0}, expected {min} to one below the window size",
        min = lzss::LOOKAHEAD_BITS_MIN
    )]
    InvalidLookahead(u8),
}

/// Reported by [`Transform::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// More output is pending; poll again before sinking further input.
    More,
    /// Nothing further can be produced without new input or a finish.
    Exhausted,
}

/// Reported by [`Transform::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishStatus {
    /// Output is still pending; run another drain pass and finish again.
    More,
    /// The stream is complete and every byte of output has been handed out.
    Done,
}

/// A trait that defines the interface for incremental, bounded-memory
/// transforms over a byte stream.
///
/// A session interleaves the three calls: sink some input, poll output
/// until [`PollStatus::Exhausted`], and repeat; once all input is sunk,
/// alternate `finish` and drain passes until [`FinishStatus::Done`].
pub trait Transform {
    /// Offer 'input' to the transform. Returns the number of bytes
    /// accepted, which may be less than offered. Zero means the internal
    /// staging is full and output must be polled first; it is not an
    /// error. Sinking after 'finish' is an error.
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError>;

    /// Write pending output into 'output' and report whether more is
    /// immediately available. Polling into an empty slice is an error.
    fn poll(&mut self, output: &mut [u8])
        -> Result<(usize, PollStatus), TransformError>;

    /// Signal that no further input will be sunk. [`FinishStatus::More`]
    /// means pending output remains; poll it out and call 'finish' again.
    fn finish(&mut self) -> Result<FinishStatus, TransformError>;

    /// The transform's preferred output chunk size. A sizing hint for
    /// drain scratch space and output buffers, not a limit.
    fn output_hint(&self) -> usize;
}

/// Compresses 'input' in one call and returns the complete stream.
///
/// Failure is all-or-nothing: on error no partial output is returned.
pub fn encode(input: &[u8], config: Config) -> Result<Vec<u8>, Error> {
    let mut encoder = LzssEncoder::new(config);
    let out = collect(&mut encoder, input)?;
    log::debug!("encoded {} bytes into {}", input.len(), out.len());
    Ok(out)
}

/// Decompresses 'input' in one call. The parameters must match the ones
/// the stream was encoded with.
pub fn decode(input: &[u8], config: Config) -> Result<Vec<u8>, Error> {
    let mut decoder = LzssDecoder::new(config);
    let out = collect(&mut decoder, input)?;
    log::debug!("decoded {} bytes into {}", input.len(), out.len());
    Ok(out)
}

/// Runs a full driver session over 'input' and snapshots the result.
fn collect<T: Transform>(
    transform: &mut T,
    input: &[u8],
) -> Result<Vec<u8>, Error> {
    let mut out = OutputBuffer::with_capacity(transform.output_hint())?;
    StreamDriver::new(transform, input).run(&mut out)?;
    out.snapshot()
}
