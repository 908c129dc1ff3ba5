//! A growable byte buffer that accumulates transform output across a
//! streaming session.

use crate::Error;

/// Selects how [`OutputBuffer`] grows when an append does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Keep doubling the capacity until the append fits. Amortizes the
    /// copy work to O(1) per byte, at the cost of up to 2x overshoot.
    Doubling,
    /// Grow to exactly what the append needs. Wastes no memory, but a long
    /// run of small appends degrades to quadratic copy work.
    Additive,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy::Doubling
    }
}

/// An append-only byte buffer with explicit capacity tracking.
///
/// The buffer tracks its capacity itself, independently of any
/// over-allocation below it, so the growth schedule is deterministic and
/// observable. All allocation is fallible: a failed creation, growth or
/// snapshot reports [`Error::Alloc`] and leaves the buffer exactly as it
/// was. Bytes between the length and the capacity are not readable through
/// the API.
#[derive(Debug)]
pub struct OutputBuffer {
    /// The valid bytes. Its length never exceeds 'cap'.
    data: Vec<u8>,
    /// The reserved capacity, in bytes. Never shrinks.
    cap: usize,
    /// Selects the growth schedule.
    policy: GrowthPolicy,
}

impl OutputBuffer {
    /// Creates a buffer with 'initial' bytes of reserved storage and the
    /// doubling growth policy.
    pub fn with_capacity(initial: usize) -> Result<Self, Error> {
        Self::with_policy(initial, GrowthPolicy::default())
    }

    /// Creates a buffer with 'initial' bytes of reserved storage.
    pub fn with_policy(
        initial: usize,
        policy: GrowthPolicy,
    ) -> Result<Self, Error> {
        let mut data = Vec::new();
        data.try_reserve_exact(initial)?;
        let buf = Self {
            data,
            cap: initial,
            policy,
        };
        buf.verify();
        Ok(buf)
    }

    /// Appends all of 'bytes', growing first when they do not fit. On
    /// failure the contents and capacity are unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let need = self.data.len().saturating_add(bytes.len());
        if need > self.cap {
            let target = self.grown_capacity(need, bytes.len());
            self.data.try_reserve_exact(target - self.data.len())?;
            self.cap = target;
        }
        self.data.extend_from_slice(bytes);
        self.verify();
        Ok(())
    }

    /// Drops the contents but keeps the reserved storage, so a buffer can
    /// be reused across sessions without reallocating.
    pub fn clear(&mut self) {
        self.data.clear();
        self.verify();
    }

    /// Returns an independently owned copy of the valid bytes. The copy
    /// outlives the buffer and does not share storage with it.
    pub fn snapshot(&self) -> Result<Vec<u8>, Error> {
        let mut copy = Vec::new();
        copy.try_reserve_exact(self.data.len())?;
        copy.extend_from_slice(&self.data);
        Ok(copy)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The reserved capacity. Follows the policy schedule, not whatever
    /// the allocator rounded up to.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the capacity the growth policy picks for an append that
    /// needs 'need' total bytes, 'incoming' of them new. Saturates instead
    /// of wrapping, so an oversize request fails in the allocator.
    fn grown_capacity(&self, need: usize, incoming: usize) -> usize {
        match self.policy {
            GrowthPolicy::Doubling => {
                if self.cap == 0 {
                    return need;
                }
                let mut cap = self.cap;
                while cap < need {
                    cap = cap.saturating_mul(2);
                }
                cap
            }
            GrowthPolicy::Additive => self.cap.saturating_add(incoming),
        }
    }

    fn verify(&self) {
        // The tracked capacity never trails the valid bytes, and the
        // vector must really have that much room, so appends within the
        // tracked capacity cannot reallocate.
        debug_assert!(self.data.len() <= self.cap, "Length exceeds capacity");
        debug_assert!(
            self.data.capacity() >= self.cap,
            "Reserved storage went missing"
        );
    }
}
