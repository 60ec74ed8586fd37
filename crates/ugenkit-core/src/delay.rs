//! Fixed-capacity circular delay line.
//!
//! [`DelayLine`] is the storage behind every reverb in this workspace: the
//! comb and allpass stages of the comb/allpass reverberator, the feedback
//! lines and tapped early-reflection line of the FDN reverberator, and the
//! [`Diffuser`](crate::Diffuser) stages.
//!
//! # Capacity vs. length
//!
//! The buffer is allocated once at its *capacity*. The *length* is the
//! logical ring size used for index wrap-around and may be smaller, so a line
//! can be sized for the worst case while running at a shorter delay.
//!
//! ```text
//!          pos
//!           v
//! [ . . . . W . . . . . | unused capacity ]
//!   <------ length ----->
//! ```
//!
//! The slot at `pos` holds the oldest sample (written `length` writes ago),
//! so a read-then-write at `pos` yields exactly `length` samples of delay.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Circular buffer of `f32` samples with a fixed allocation.
///
/// # Invariants
///
/// - `1 <= length <= capacity`
/// - `pos` is always in `[0, length)`
/// - The buffer is zero-filled at construction, so reads before the first
///   wrap return silence
///
/// # Example
///
/// ```rust
/// use ugenkit_core::DelayLine;
///
/// let mut line = DelayLine::new(3);
/// line.write(1.0);
/// line.write(2.0);
/// assert_eq!(line.read(1), 2.0);
/// assert_eq!(line.read(2), 1.0);
/// // The oldest slot has not been written yet.
/// assert_eq!(line.oldest(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    length: usize,
    pos: usize,
}

impl DelayLine {
    /// Create a line whose capacity equals its length.
    ///
    /// A zero length is raised to 1.
    pub fn new(length: usize) -> Self {
        Self::with_capacity(length, length)
    }

    /// Create a line allocated for `capacity` samples running at `length`.
    ///
    /// `capacity` is raised to at least 1 and `length` is clamped to
    /// `[1, capacity]`.
    pub fn with_capacity(capacity: usize, length: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: vec![0.0; capacity],
            length: length.clamp(1, capacity),
            pos: 0,
        }
    }

    /// Sample written `delay` writes ago, for `delay` in `1..=length`.
    ///
    /// `delay == length` is the oldest sample, the same as [`oldest`](Self::oldest).
    /// Larger delays wrap modulo the length.
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let delay = delay % self.length;
        let idx = (self.pos + self.length - delay) % self.length;
        self.buffer[idx]
    }

    /// Sample in the slot that the next [`write`](Self::write) overwrites.
    #[inline]
    pub fn oldest(&self) -> f32 {
        self.buffer[self.pos]
    }

    /// Store a sample and advance the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.pos] = sample;
        self.pos += 1;
        if self.pos == self.length {
            self.pos = 0;
        }
    }

    /// Logical ring size.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false: a line holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Allocated size in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Current write position, always below [`len`](Self::len).
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Zero the buffer and rewind the write position.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}
