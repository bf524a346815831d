use crate::error::Error;

pub const DEFAULT_SLOT_CAPACITY: usize = 16;

/// Construction parameters for a [`crate::MemorySpace`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpaceConfig {
    /// Number of addressable words, `[0, arena_size)`.
    pub arena_size: usize,
    /// Initial slot count of the block store and both sequences.
    pub slot_capacity: usize,
    /// Emit one debug line per malloc, free and defrag.
    pub trace: bool,
}

impl SpaceConfig {
    pub fn new(arena_size: usize) -> Self {
        Self {
            arena_size,
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            trace: false,
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_slot_capacity(mut self, slot_capacity: usize) -> Self {
        self.slot_capacity = slot_capacity;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.arena_size == 0 {
            return Err(Error::EmptyArena);
        }
        Ok(())
    }
}
