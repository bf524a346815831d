use core::fmt;

use collections::SlotId;

/// Identity of a block inside a [`crate::MemorySpace`].
pub type BlockId = SlotId;

/// Contiguous address range `[base, base + length)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub base: usize,
    pub length: usize,
}

impl Block {
    pub fn new(base: usize, length: usize) -> Self {
        Self { base, length }
    }

    /// First address past the block.
    pub fn end(&self) -> usize {
        self.base + self.length
    }

    pub fn contains(&self, address: usize) -> bool {
        address >= self.base && address < self.end()
    }

    /// True when `next` starts exactly where this block ends.
    pub fn is_adjacent_to(&self, next: &Block) -> bool {
        self.end() == next.base
    }

    pub fn overlaps(&self, other: &Block) -> bool {
        self.base < other.end() && other.base < self.end()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} , {})", self.base, self.length)
    }
}
