//! The state machine that pumps one input buffer through a [`Transform`]
//! and gathers the complete output.

use crate::buffer::OutputBuffer;
use crate::{Error, FinishStatus, PollStatus, Transform};

/// The observable stage of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Offering input bytes to the transform.
    Sinking,
    /// Collecting pending output until the transform reports exhaustion.
    Draining,
    /// All input is sunk; flushing whatever the transform still holds.
    Finishing,
    /// The finish handshake completed and the output is whole.
    Done,
    /// A fault stopped the session. Output collected so far is partial
    /// and must not be used.
    Failed,
}

/// Drives a [`Transform`] over one input buffer. A driver runs a single
/// session; construct a new one per stream.
pub struct StreamDriver<'a, T: Transform> {
    /// The transform being driven.
    transform: &'a mut T,
    /// The complete input for this session.
    input: &'a [u8],
    /// Input bytes the transform has accepted so far.
    sunk: usize,
    phase: Phase,
}

impl<'a, T: Transform> StreamDriver<'a, T> {
    pub fn new(transform: &'a mut T, input: &'a [u8]) -> Self {
        Self {
            transform,
            input,
            sunk: 0,
            phase: Phase::Sinking,
        }
    }

    /// The input bytes accepted so far.
    #[must_use]
    pub fn bytes_sunk(&self) -> usize {
        self.sunk
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs the session to completion, appending everything the transform
    /// produces to 'out'. Bytes already in 'out' are left in place.
    ///
    /// Each pass sinks what the transform will take, then drains until it
    /// reports exhaustion. Draining must run dry before the next sink: the
    /// transform's output window is finite, and offering more input
    /// against a full window would never make progress. Once the whole
    /// input is accepted, the finish handshake may still demand further
    /// drain passes (possibly empty ones) before it reports completion.
    /// Empty input skips sinking entirely and goes straight to the
    /// handshake, which may still produce output.
    pub fn run(&mut self, out: &mut OutputBuffer) -> Result<(), Error> {
        let mut scratch = vec![0u8; self.transform.output_hint().max(1)];

        loop {
            let mut taken = 0;
            if self.sunk < self.input.len() {
                self.phase = Phase::Sinking;
                taken = match self.transform.sink(&self.input[self.sunk..]) {
                    Ok(taken) => taken,
                    Err(fault) => return Err(self.fail(fault.into())),
                };
                debug_assert!(
                    taken <= self.input.len() - self.sunk,
                    "Transform overconsumed"
                );
                self.sunk += taken;
            }

            self.phase = Phase::Draining;
            let mut drained = 0;
            loop {
                let (produced, status) =
                    match self.transform.poll(&mut scratch) {
                        Ok(step) => step,
                        Err(fault) => return Err(self.fail(fault.into())),
                    };
                if produced > 0 {
                    if let Err(err) = out.append(&scratch[..produced]) {
                        return Err(self.fail(err));
                    }
                    drained += produced;
                }
                if status == PollStatus::Exhausted {
                    break;
                }
            }

            if self.sunk == self.input.len() {
                self.phase = Phase::Finishing;
                match self.transform.finish() {
                    Ok(FinishStatus::Done) => {
                        self.phase = Phase::Done;
                        return Ok(());
                    }
                    Ok(FinishStatus::More) => {}
                    Err(fault) => return Err(self.fail(fault.into())),
                }
            } else {
                // A zero-byte sink is only legal while output is pending,
                // so a pass that moves nothing in either direction would
                // repeat forever.
                debug_assert!(
                    taken > 0 || drained > 0,
                    "Transform made no progress"
                );
            }
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        self.phase = Phase::Failed;
        error
    }
}
