use squeeze::{
    FinishStatus, OutputBuffer, Phase, PollStatus, StreamDriver, Transform,
    TransformError,
};

/// One protocol call as a transform observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Sink(usize),
    Poll(usize, PollStatus),
    Finish(FinishStatus),
}

/// Echoes its input, but batches it: bytes accumulate in a staging area
/// of 'capacity' bytes and only become output once the staging fills or
/// the stream finishes. Output leaves in steps of at most 'step' bytes,
/// so one drain takes several polls. Every call is recorded.
struct BatchedEcho {
    capacity: usize,
    step: usize,
    staging: Vec<u8>,
    outq: Vec<u8>,
    finishing: bool,
    log: Vec<Call>,
}

impl BatchedEcho {
    fn new(capacity: usize, step: usize) -> Self {
        Self {
            capacity,
            step,
            staging: Vec::new(),
            outq: Vec::new(),
            finishing: false,
            log: Vec::new(),
        }
    }
}

impl Transform for BatchedEcho {
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError> {
        if self.finishing {
            return Err(TransformError("sink after finish"));
        }
        let take = if self.outq.is_empty() {
            input.len().min(self.capacity - self.staging.len())
        } else {
            // Output is pending; accept nothing until it drains.
            0
        };
        self.staging.extend_from_slice(&input[..take]);
        if self.staging.len() == self.capacity {
            self.outq.append(&mut self.staging);
        }
        self.log.push(Call::Sink(take));
        Ok(take)
    }

    fn poll(
        &mut self,
        output: &mut [u8],
    ) -> Result<(usize, PollStatus), TransformError> {
        let n = self.step.min(self.outq.len()).min(output.len());
        output[..n].copy_from_slice(&self.outq[..n]);
        self.outq.drain(..n);
        let status = if self.outq.is_empty() {
            PollStatus::Exhausted
        } else {
            PollStatus::More
        };
        self.log.push(Call::Poll(n, status));
        Ok((n, status))
    }

    fn finish(&mut self) -> Result<FinishStatus, TransformError> {
        self.finishing = true;
        if !self.staging.is_empty() {
            self.outq.append(&mut self.staging);
        }
        let status = if self.outq.is_empty() {
            FinishStatus::Done
        } else {
            FinishStatus::More
        };
        self.log.push(Call::Finish(status));
        Ok(status)
    }

    fn output_hint(&self) -> usize {
        self.step
    }
}

/// Checks that the driver drained the transform dry before every sink:
/// each sink except the first must directly follow an exhausted poll.
fn assert_drained_between_sinks(log: &[Call]) {
    for (i, call) in log.iter().enumerate() {
        if let Call::Sink(_) = call {
            if i == 0 {
                continue;
            }
            assert!(
                matches!(log[i - 1], Call::Poll(_, PollStatus::Exhausted)),
                "sink at log index {} without a drained poll before it",
                i
            );
        }
    }
}

#[test]
fn test_round_trip_through_batches() {
    let input: Vec<u8> = (0..=25).collect();
    let mut echo = BatchedEcho::new(4, 3);
    let mut out = OutputBuffer::with_capacity(0).unwrap();

    let mut driver = StreamDriver::new(&mut echo, &input);
    driver.run(&mut out).unwrap();
    assert_eq!(driver.phase(), Phase::Done);
    assert_eq!(driver.bytes_sunk(), input.len());
    drop(driver);

    assert_eq!(out.as_slice(), input);
    assert_drained_between_sinks(&echo.log);
}

#[test]
fn test_partial_sinks_make_progress() {
    // Staging of one byte forces one sink per input byte.
    let input = [7u8; 10];
    let mut echo = BatchedEcho::new(1, 8);
    let mut out = OutputBuffer::with_capacity(0).unwrap();
    StreamDriver::new(&mut echo, &input).run(&mut out).unwrap();

    assert_eq!(out.as_slice(), input);
    let sinks = echo
        .log
        .iter()
        .filter(|c| matches!(c, Call::Sink(_)))
        .count();
    assert_eq!(sinks, 10);
    assert_drained_between_sinks(&echo.log);
}

#[test]
fn test_trailing_output_needs_finish_passes() {
    // Half-full staging holds data back until the finish handshake.
    let input = [1u8, 2, 3];
    let mut echo = BatchedEcho::new(8, 2);
    let mut out = OutputBuffer::with_capacity(0).unwrap();
    StreamDriver::new(&mut echo, &input).run(&mut out).unwrap();

    assert_eq!(out.as_slice(), input);
    // The first finish must have reported pending output, and the last
    // one completion.
    let finishes: Vec<&Call> = echo
        .log
        .iter()
        .filter(|c| matches!(c, Call::Finish(_)))
        .collect();
    assert_eq!(finishes.first(), Some(&&Call::Finish(FinishStatus::More)));
    assert_eq!(finishes.last(), Some(&&Call::Finish(FinishStatus::Done)));
}

#[test]
fn test_empty_input_still_finishes() {
    let mut echo = BatchedEcho::new(4, 2);
    let mut out = OutputBuffer::with_capacity(0).unwrap();
    let mut driver = StreamDriver::new(&mut echo, &[]);
    driver.run(&mut out).unwrap();
    assert_eq!(driver.phase(), Phase::Done);
    drop(driver);

    assert!(out.is_empty());
    // No input was ever offered, but the handshake ran.
    assert!(!echo.log.iter().any(|c| matches!(c, Call::Sink(_))));
    assert!(echo.log.contains(&Call::Finish(FinishStatus::Done)));
}

/// Emits a fixed preamble before accepting any input, so the driver sees
/// a sink call that consumes zero bytes.
struct PreambleEcho {
    preamble: Vec<u8>,
    echo: Vec<u8>,
    finishing: bool,
    log: Vec<Call>,
}

impl PreambleEcho {
    fn new(preamble: &[u8]) -> Self {
        Self {
            preamble: preamble.to_vec(),
            echo: Vec::new(),
            finishing: false,
            log: Vec::new(),
        }
    }
}

impl Transform for PreambleEcho {
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError> {
        if self.finishing {
            return Err(TransformError("sink after finish"));
        }
        // Refuse input until the preamble is out the door.
        let take = if self.preamble.is_empty() {
            input.len()
        } else {
            0
        };
        self.echo.extend_from_slice(&input[..take]);
        self.log.push(Call::Sink(take));
        Ok(take)
    }

    fn poll(
        &mut self,
        output: &mut [u8],
    ) -> Result<(usize, PollStatus), TransformError> {
        let source = if self.preamble.is_empty() {
            &mut self.echo
        } else {
            &mut self.preamble
        };
        let n = source.len().min(output.len());
        output[..n].copy_from_slice(&source[..n]);
        source.drain(..n);
        let status = if self.preamble.is_empty() && self.echo.is_empty() {
            PollStatus::Exhausted
        } else {
            PollStatus::More
        };
        self.log.push(Call::Poll(n, status));
        Ok((n, status))
    }

    fn finish(&mut self) -> Result<FinishStatus, TransformError> {
        self.finishing = true;
        let status = if self.preamble.is_empty() && self.echo.is_empty() {
            FinishStatus::Done
        } else {
            FinishStatus::More
        };
        self.log.push(Call::Finish(status));
        Ok(status)
    }

    fn output_hint(&self) -> usize {
        4
    }
}

#[test]
fn test_zero_byte_sink_is_not_an_error() {
    let input = [5u8, 6, 7];
    let mut echo = PreambleEcho::new(&[0xAA, 0xBB]);
    let mut out = OutputBuffer::with_capacity(0).unwrap();
    StreamDriver::new(&mut echo, &input).run(&mut out).unwrap();

    assert_eq!(out.as_slice(), &[0xAA, 0xBB, 5, 6, 7]);
    // The first sink was refused, and the driver recovered by draining.
    assert_eq!(echo.log.first(), Some(&Call::Sink(0)));
    assert!(echo.log.contains(&Call::Sink(3)));
}

/// Consumes everything, produces nothing, and needs two finish rounds.
struct SlowFlush {
    finishes: usize,
    log: Vec<Call>,
}

impl Transform for SlowFlush {
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError> {
        self.log.push(Call::Sink(input.len()));
        Ok(input.len())
    }

    fn poll(
        &mut self,
        _output: &mut [u8],
    ) -> Result<(usize, PollStatus), TransformError> {
        self.log.push(Call::Poll(0, PollStatus::Exhausted));
        Ok((0, PollStatus::Exhausted))
    }

    fn finish(&mut self) -> Result<FinishStatus, TransformError> {
        self.finishes += 1;
        let status = if self.finishes < 2 {
            FinishStatus::More
        } else {
            FinishStatus::Done
        };
        self.log.push(Call::Finish(status));
        Ok(status)
    }

    fn output_hint(&self) -> usize {
        4
    }
}

#[test]
fn test_finish_more_with_an_empty_drain_pass() {
    // A transform may answer More and then have nothing to poll; the
    // driver must run the empty pass and ask again rather than stop.
    let mut flush = SlowFlush {
        finishes: 0,
        log: Vec::new(),
    };
    let mut out = OutputBuffer::with_capacity(0).unwrap();
    let mut driver = StreamDriver::new(&mut flush, &[1, 2]);
    driver.run(&mut out).unwrap();
    assert_eq!(driver.phase(), Phase::Done);
    drop(driver);

    assert!(out.is_empty());
    let tail = &flush.log[flush.log.len() - 3..];
    assert_eq!(tail[0], Call::Finish(FinishStatus::More));
    assert_eq!(tail[1], Call::Poll(0, PollStatus::Exhausted));
    assert_eq!(tail[2], Call::Finish(FinishStatus::Done));
}

/// Fails on command in one of the three protocol calls.
struct FaultingTransform {
    fail_in: &'static str,
}

impl Transform for FaultingTransform {
    fn sink(&mut self, input: &[u8]) -> Result<usize, TransformError> {
        if self.fail_in == "sink" {
            return Err(TransformError("sink fault"));
        }
        Ok(input.len())
    }

    fn poll(
        &mut self,
        _output: &mut [u8],
    ) -> Result<(usize, PollStatus), TransformError> {
        if self.fail_in == "poll" {
            return Err(TransformError("poll fault"));
        }
        Ok((0, PollStatus::Exhausted))
    }

    fn finish(&mut self) -> Result<FinishStatus, TransformError> {
        if self.fail_in == "finish" {
            return Err(TransformError("finish fault"));
        }
        Ok(FinishStatus::Done)
    }

    fn output_hint(&self) -> usize {
        4
    }
}

#[test]
fn test_faults_propagate_and_mark_the_session() {
    for fail_in in ["sink", "poll", "finish"] {
        let mut transform = FaultingTransform { fail_in };
        let mut out = OutputBuffer::with_capacity(0).unwrap();
        let mut driver = StreamDriver::new(&mut transform, &[1, 2, 3]);
        let err = driver.run(&mut out).unwrap_err();
        assert!(
            matches!(err, squeeze::Error::Transform(_)),
            "unexpected error in {}: {:?}",
            fail_in,
            err
        );
        assert_eq!(driver.phase(), Phase::Failed);
    }
}
