#![allow(clippy::len_without_is_empty)]
use rand::{seq::SliceRandom, thread_rng};

use crate::ds::RingBuffer;

use super::{Transition, TransitionBatch};

/// A fixed-size memory storage for past transitions
///
/// This structure uses a ring buffer to store transitions, automatically
/// overwriting the oldest ones once it reaches its capacity. Sampling is
/// uniform and without replacement, which breaks the temporal correlation
/// between consecutive steps of experience.
pub struct ReplayMemory {
    memory: RingBuffer<Transition>,
}

impl ReplayMemory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay memory capacity must be non-zero");
        Self {
            memory: RingBuffer::new(capacity),
        }
    }

    /// Number of transitions currently stored
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn capacity(&self) -> usize {
        self.memory.capacity()
    }

    /// Add a new transition to the memory, evicting the oldest one if full
    pub fn push(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Whether at least `batch_size` transitions are currently stored
    pub fn has_batch_size(&self, batch_size: usize) -> bool {
        self.memory.len() >= batch_size
    }

    /// Sample a random batch of transitions from the memory and zip it into
    /// one vector per field
    ///
    /// ### Returns
    /// - `Some(batch)` if `batch_size` is less than or equal to the buffer length
    /// - `None` otherwise
    pub fn sample_zipped(&self, batch_size: usize) -> Option<TransitionBatch> {
        if self.has_batch_size(batch_size) {
            let transitions = self
                .memory
                .view()
                .choose_multiple(&mut thread_rng(), batch_size)
                .cloned();
            Some(TransitionBatch::from_iter(transitions, batch_size))
        } else {
            None
        }
    }
}
