//! Bounded circular store of pending frame batches.
//!
//! The ring holds one [`FrameBatch`] per slot, in append order, and owns
//! every resident batch from acceptance until release. Head and tail are
//! monotonic counters; the slot for a counter value is `counter % capacity`,
//! the same wrap discipline as a delay line's write cursor.
//!
//! Frames are addressed by *absolute* index: the ring remembers how many
//! frames it has ever accepted since the last [`ParameterRing::clear`], and
//! each batch records the absolute index of its first frame. Consumers look
//! frames up by absolute index and release whole batches once every frame in
//! them lies behind the consumption cursor.

use crate::frame::{Frame, FrameBatch};

#[derive(Debug)]
struct Entry {
    /// Absolute index of the batch's first frame.
    origin: u64,
    batch: FrameBatch,
}

/// Fixed-capacity circular store of frame batches.
#[derive(Debug)]
pub struct ParameterRing {
    slots: Vec<Option<Entry>>,
    /// Next slot counter to fill.
    head: u64,
    /// Oldest resident slot counter.
    tail: u64,
    /// Absolute frames accepted since the last clear.
    total_frames: u64,
}

impl ParameterRing {
    /// Creates a ring with `slots` batch slots.
    ///
    /// # Panics
    ///
    /// Panics if `slots` is 0.
    pub fn new(slots: usize) -> Self {
        assert!(slots > 0, "ring must have at least one slot");
        Self {
            slots: (0..slots).map(|_| None).collect(),
            head: 0,
            tail: 0,
            total_frames: 0,
        }
    }

    /// Number of batch slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of batches currently resident.
    pub fn pending_batches(&self) -> usize {
        (self.head - self.tail) as usize
    }

    /// True when no batches are resident.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// True when every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.pending_batches() == self.slots.len()
    }

    /// Absolute count of frames ever accepted since the last clear.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Attempts to enqueue a batch.
    ///
    /// A full ring hands the batch back untouched so the caller's scope can
    /// release it; acceptance transfers ownership into the ring.
    pub fn push(&mut self, batch: FrameBatch) -> Result<(), FrameBatch> {
        if self.is_full() {
            return Err(batch);
        }
        let origin = self.total_frames;
        self.total_frames += batch.len() as u64;
        let index = (self.head % self.slots.len() as u64) as usize;
        self.slots[index] = Some(Entry { origin, batch });
        self.head += 1;
        Ok(())
    }

    /// Looks up a frame by absolute index across resident batches.
    ///
    /// Returns `None` when the frame was already released or not yet
    /// appended.
    pub fn frame(&self, index: u64) -> Option<&Frame> {
        for counter in self.tail..self.head {
            let slot = (counter % self.slots.len() as u64) as usize;
            let entry = self.slots[slot].as_ref()?;
            if index < entry.origin {
                return None;
            }
            if index < entry.origin + entry.batch.len() as u64 {
                return entry.batch.frames().get((index - entry.origin) as usize);
            }
        }
        None
    }

    /// Releases every batch whose frames all precede `frame_index`.
    ///
    /// Returns the number of batches dropped.
    pub fn release_below(&mut self, frame_index: u64) -> usize {
        let mut dropped = 0;
        while self.tail < self.head {
            let slot = (self.tail % self.slots.len() as u64) as usize;
            let consumed = match &self.slots[slot] {
                Some(entry) => entry.origin + entry.batch.len() as u64 <= frame_index,
                None => true,
            };
            if !consumed {
                break;
            }
            self.slots[slot] = None;
            self.tail += 1;
            dropped += 1;
        }
        dropped
    }

    /// Drops all resident batches and resets every counter.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.total_frames = 0;
    }
}
