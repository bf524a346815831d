use alloc::vec::Vec;
use core::fmt;

use collections::{LinkedSequence, SlotArena};

use crate::block::{Block, BlockId};
use crate::config::SpaceConfig;
use crate::error::{Error, Violation};
use crate::mprintln;

/// Occupancy summary of a [`MemorySpace`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpaceStats {
    pub arena_size: usize,
    pub free_words: usize,
    pub allocated_words: usize,
    pub free_blocks: usize,
    pub allocated_blocks: usize,
    pub largest_free: usize,
}

impl fmt::Display for SpaceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arena {} | free {} in {} blocks (largest {}) | allocated {} in {} blocks",
            self.arena_size,
            self.free_words,
            self.free_blocks,
            self.largest_free,
            self.allocated_words,
            self.allocated_blocks
        )
    }
}

/// Bookkeeping for a simulated linear arena `[0, arena_size)`.
///
/// Every block lives once in the block store; the free and allocated
/// sequences only hold [`BlockId`]s, so moving a block between them keeps
/// its identity. Allocation is first-fit in free-sequence order, and
/// fragmentation is only repaired by an explicit [`MemorySpace::defrag`].
pub struct MemorySpace {
    blocks: SlotArena<Block>,
    free: LinkedSequence<BlockId>,
    allocated: LinkedSequence<BlockId>,
    arena_size: usize,
    trace: bool,
}

impl MemorySpace {
    /// Panics when `arena_size` is zero; use [`MemorySpace::with_config`] to
    /// get the error instead.
    pub fn new(arena_size: usize) -> Self {
        match Self::with_config(SpaceConfig::new(arena_size)) {
            Ok(space) => space,
            Err(error) => panic!("cannot create memory space: {}", error),
        }
    }

    pub fn with_config(config: SpaceConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut blocks = SlotArena::new(config.slot_capacity.max(1));
        let mut free = LinkedSequence::with_capacity(config.slot_capacity);
        let whole = blocks.add(Block::new(0, config.arena_size))?;
        free.push_back(whole)?;

        Ok(Self {
            blocks,
            free,
            allocated: LinkedSequence::with_capacity(config.slot_capacity),
            arena_size: config.arena_size,
            trace: config.trace,
        })
    }

    pub fn arena_size(&self) -> usize {
        self.arena_size
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    fn block(&self, id: BlockId) -> Result<Block, Error> {
        Ok(*self.blocks.get(id)?)
    }

    /// Allocates `length` words and returns the base address, or `None` when
    /// `length` is zero or no free block is large enough.
    pub fn malloc(&mut self, length: usize) -> Option<usize> {
        let result = match self.try_malloc(length) {
            Ok(address) => address,
            Err(error) => {
                mprintln!("malloc({}) aborted: {}", length, error);
                None
            }
        };
        if self.trace {
            match result {
                Some(address) => mprintln!("malloc({}) -> {}", length, address),
                None => mprintln!("malloc({}) failed", length),
            }
        }
        result
    }

    fn try_malloc(&mut self, length: usize) -> Result<Option<usize>, Error> {
        if length == 0 {
            return Ok(None);
        }

        let mut found = None;
        for (index, id) in self.free.iter().enumerate() {
            let block = self.block(id)?;
            if block.length >= length {
                found = Some((index, id, block));
                break;
            }
        }
        let Some((index, id, block)) = found else {
            return Ok(None);
        };

        if block.length == length {
            self.free.remove_at(index)?;
            self.allocated.push_back(id)?;
        } else {
            let allocation = self.blocks.add(Block::new(block.base, length))?;
            if let Err(error) = self.allocated.push_back(allocation) {
                self.blocks.remove(allocation)?;
                return Err(error.into());
            }
            let remainder = self.blocks.get_mut(id)?;
            remainder.base += length;
            remainder.length -= length;
        }

        Ok(Some(block.base))
    }

    /// Releases the allocated block starting at `address` to the tail of the
    /// free sequence.
    pub fn free(&mut self, address: usize) -> Result<(), Error> {
        if self.allocated.is_empty() {
            return Err(Error::NothingAllocated);
        }

        let mut found = None;
        for id in self.allocated.iter() {
            if self.block(id)?.base == address {
                found = Some(id);
                break;
            }
        }
        let id = found.ok_or(Error::NotAllocated(address))?;

        self.allocated.remove(id)?;
        self.free.push_back(id)?;

        if self.trace {
            mprintln!("free({}) -> {} words released", address, self.block(id)?.length);
        }
        Ok(())
    }

    /// Sorts the free sequence by base address and coalesces contiguous
    /// neighbours.
    pub fn defrag(&mut self) -> Result<(), Error> {
        let blocks = &self.blocks;
        self.free.sort_by_key(|id| blocks.get(*id).map(|block| block.base).unwrap_or(usize::MAX));

        let before = self.free.len();
        let mut index = 0;
        while index + 1 < self.free.len() {
            let current_id = self.free.get(index)?;
            let next_id = self.free.get(index + 1)?;
            let current = self.block(current_id)?;
            let next = self.block(next_id)?;

            if current.is_adjacent_to(&next) {
                self.blocks.get_mut(current_id)?.length += next.length;
                self.free.remove_at(index + 1)?;
                self.blocks.remove(next_id)?;
            } else {
                index += 1;
            }
        }

        if self.trace {
            mprintln!("defrag: {} free blocks -> {}", before, self.free.len());
        }
        Ok(())
    }

    pub fn free_blocks(&self) -> impl Iterator<Item = Block> + '_ {
        self.free
            .iter()
            .filter_map(move |id| self.blocks.get(id).ok().copied())
    }

    pub fn allocated_blocks(&self) -> impl Iterator<Item = Block> + '_ {
        self.allocated
            .iter()
            .filter_map(move |id| self.blocks.get(id).ok().copied())
    }

    /// The allocated block whose base is `address`.
    pub fn block_at(&self, address: usize) -> Option<Block> {
        self.allocated_blocks().find(|block| block.base == address)
    }

    pub fn stats(&self) -> SpaceStats {
        let mut stats = SpaceStats {
            arena_size: self.arena_size,
            ..SpaceStats::default()
        };
        for block in self.free_blocks() {
            stats.free_words += block.length;
            stats.free_blocks += 1;
            stats.largest_free = stats.largest_free.max(block.length);
        }
        for block in self.allocated_blocks() {
            stats.allocated_words += block.length;
            stats.allocated_blocks += 1;
        }
        stats
    }

    /// Verifies that the two sequences exactly tile the arena.
    pub fn check(&self) -> Result<(), Error> {
        if !self.free.check_links() || !self.allocated.check_links() {
            return Err(Error::Corrupted(Violation::BrokenLinks));
        }

        let mut tiles = Vec::with_capacity(self.free.len() + self.allocated.len());
        for id in self.free.iter().chain(self.allocated.iter()) {
            let block = self
                .block(id)
                .map_err(|_| Error::Corrupted(Violation::DanglingBlock))?;
            if block.length == 0 {
                return Err(Error::Corrupted(Violation::ZeroLength(block)));
            }
            if block.end() > self.arena_size {
                return Err(Error::Corrupted(Violation::OutOfArena(block)));
            }
            tiles.push(block);
        }

        if self.blocks.len() != tiles.len() {
            return Err(Error::Corrupted(Violation::UntrackedBlocks {
                stored: self.blocks.len(),
                tracked: tiles.len(),
            }));
        }

        tiles.sort_by_key(|block| block.base);
        for pair in tiles.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(Error::Corrupted(Violation::Overlap {
                    first: pair[0],
                    second: pair[1],
                }));
            }
        }

        let covered: usize = tiles.iter().map(|block| block.length).sum();
        if covered != self.arena_size {
            return Err(Error::Corrupted(Violation::CapacityMismatch {
                expected: self.arena_size,
                actual: covered,
            }));
        }
        Ok(())
    }

    fn write_sequence(&self, f: &mut fmt::Formatter<'_>, sequence: &LinkedSequence<BlockId>) -> fmt::Result {
        for id in sequence {
            let block = self.blocks.get(id).map_err(|_| fmt::Error)?;
            write!(f, "{} ", block)?;
        }
        Ok(())
    }
}

impl fmt::Display for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_sequence(f, &self.free)?;
        f.write_str("\n")?;
        self.write_sequence(f, &self.allocated)
    }
}

impl fmt::Debug for MemorySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySpace")
            .field("arena_size", &self.arena_size)
            .field("free", &self.free_blocks().collect::<Vec<_>>())
            .field("allocated", &self.allocated_blocks().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;
    use std::vec;
    use std::vec::Vec;

    fn space_with(arena_size: usize, free: &[(usize, usize)], allocated: &[(usize, usize)]) -> MemorySpace {
        let mut blocks = SlotArena::new(4);
        let mut free_sequence = LinkedSequence::new();
        let mut allocated_sequence = LinkedSequence::new();
        for &(base, length) in free {
            free_sequence.push_back(blocks.add(Block::new(base, length)).unwrap()).unwrap();
        }
        for &(base, length) in allocated {
            allocated_sequence.push_back(blocks.add(Block::new(base, length)).unwrap()).unwrap();
        }
        MemorySpace {
            blocks,
            free: free_sequence,
            allocated: allocated_sequence,
            arena_size,
            trace: false,
        }
    }

    fn pairs(blocks: impl Iterator<Item = Block>) -> Vec<(usize, usize)> {
        blocks.map(|block| (block.base, block.length)).collect()
    }

    #[test]
    fn new_space_is_one_free_block() {
        let space = MemorySpace::new(100);
        assert_eq!(pairs(space.free_blocks()), vec![(0, 100)]);
        assert_eq!(space.allocated_blocks().count(), 0);
        assert_eq!(space.arena_size(), 100);
        assert_eq!(space.check(), Ok(()));
    }

    #[test]
    fn zero_sized_config_is_rejected() {
        assert!(matches!(
            MemorySpace::with_config(SpaceConfig::new(0)),
            Err(Error::EmptyArena)
        ));
    }

    #[test]
    #[should_panic(expected = "cannot create memory space")]
    fn new_panics_on_zero_sized_arena() {
        let _space = MemorySpace::new(0);
    }

    #[test]
    fn malloc_zero_returns_none() {
        let mut space = MemorySpace::new(10);
        assert_eq!(space.malloc(0), None);
        assert_eq!(pairs(space.free_blocks()), vec![(0, 10)]);
    }

    #[test]
    fn malloc_picks_first_fit_not_best_fit() {
        let mut space = space_with(30, &[(0, 5), (10, 3), (20, 10)], &[(5, 5), (13, 7)]);

        assert_eq!(space.malloc(3), Some(0));
        assert_eq!(pairs(space.free_blocks()), vec![(3, 2), (10, 3), (20, 10)]);
        assert_eq!(space.malloc(3), Some(10));
        assert_eq!(pairs(space.free_blocks()), vec![(3, 2), (20, 10)]);
    }

    #[test]
    fn malloc_scans_in_sequence_order() {
        let mut space = space_with(30, &[(20, 10), (0, 10)], &[(10, 10)]);
        assert_eq!(space.malloc(4), Some(20));
        assert_eq!(pairs(space.free_blocks()), vec![(24, 6), (0, 10)]);
    }

    #[test]
    fn malloc_splits_larger_block_in_place() {
        let mut space = space_with(270, &[(250, 20)], &[(0, 250)]);

        assert_eq!(space.malloc(17), Some(250));
        assert_eq!(pairs(space.free_blocks()), vec![(267, 3)]);
        assert_eq!(pairs(space.allocated_blocks()), vec![(0, 250), (250, 17)]);
        assert_eq!(space.check(), Ok(()));
    }

    #[test]
    fn exact_fit_moves_the_same_block() {
        let mut space = space_with(30, &[(0, 5), (10, 3)], &[(5, 5), (13, 17)]);
        let target = space.free.get(0).unwrap();

        assert_eq!(space.malloc(5), Some(0));

        assert_eq!(space.free.len(), 1);
        assert_eq!(space.allocated.last(), Some(target));
        assert_eq!(space.blocks.len(), 4);
    }

    #[test]
    fn malloc_fails_without_touching_sequences_when_exhausted() {
        let mut space = space_with(20, &[(0, 5), (10, 5)], &[(5, 5), (15, 5)]);
        let before = space.to_string();

        assert_eq!(space.malloc(6), None);
        assert_eq!(space.to_string(), before);
    }

    #[test]
    fn malloc_does_not_defrag_implicitly() {
        let mut space = space_with(10, &[(0, 5), (5, 5)], &[]);
        assert_eq!(space.malloc(10), None);
        space.defrag().unwrap();
        assert_eq!(space.malloc(10), Some(0));
    }

    #[test]
    fn free_round_trips_the_allocated_block() {
        let mut space = MemorySpace::new(100);
        let address = space.malloc(40).unwrap();
        let id = space.allocated.last().unwrap();

        space.free(address).unwrap();

        assert_eq!(space.allocated.len(), 0);
        assert_eq!(space.free.last(), Some(id));
        assert_eq!(pairs(space.free_blocks()), vec![(40, 60), (0, 40)]);
        assert_eq!(space.block_at(address), None);
        assert_eq!(space.check(), Ok(()));
    }

    #[test]
    fn free_checks_the_last_allocated_block() {
        let mut space = MemorySpace::new(30);
        space.malloc(10).unwrap();
        space.malloc(10).unwrap();
        let last = space.malloc(10).unwrap();

        space.free(last).unwrap();
        assert_eq!(pairs(space.free_blocks()), vec![(20, 10)]);
    }

    #[test]
    fn free_with_nothing_allocated_fails() {
        let mut space = MemorySpace::new(10);
        assert_eq!(space.free(0), Err(Error::NothingAllocated));
    }

    #[test]
    fn free_of_unknown_address_fails() {
        let mut space = MemorySpace::new(10);
        space.malloc(4).unwrap();
        let before = space.to_string();

        assert_eq!(space.free(2), Err(Error::NotAllocated(2)));
        assert_eq!(space.free(4), Err(Error::NotAllocated(4)));
        assert_eq!(space.to_string(), before);
    }

    #[test]
    fn double_free_fails() {
        let mut space = MemorySpace::new(10);
        let a = space.malloc(4).unwrap();
        space.malloc(4).unwrap();
        space.free(a).unwrap();
        assert_eq!(space.free(a), Err(Error::NotAllocated(a)));
    }

    #[test]
    fn defrag_sorts_and_merges() {
        let mut space = space_with(15, &[(10, 5), (0, 10)], &[]);
        space.defrag().unwrap();
        assert_eq!(pairs(space.free_blocks()), vec![(0, 15)]);
        assert_eq!(space.blocks.len(), 1);
        assert_eq!(space.check(), Ok(()));
    }

    #[test]
    fn defrag_merges_runs_of_neighbours() {
        let mut space = space_with(
            40,
            &[(30, 10), (5, 5), (0, 5), (10, 5), (20, 5)],
            &[(15, 5), (25, 5)],
        );
        space.defrag().unwrap();
        assert_eq!(pairs(space.free_blocks()), vec![(0, 15), (20, 5), (30, 10)]);
        assert_eq!(space.check(), Ok(()));
    }

    #[test]
    fn defrag_is_idempotent() {
        let mut space = MemorySpace::new(100);
        let addresses: Vec<usize> = (0..10).map(|_| space.malloc(10).unwrap()).collect();
        for address in addresses.iter().rev().step_by(2) {
            space.free(*address).unwrap();
        }
        space.free(addresses[2]).unwrap();
        space.free(addresses[4]).unwrap();

        space.defrag().unwrap();
        let once = pairs(space.free_blocks());
        space.defrag().unwrap();

        assert_eq!(pairs(space.free_blocks()), once);
        assert_eq!(once, vec![(10, 50), (70, 10), (90, 10)]);
    }

    #[test]
    fn display_lists_free_then_allocated() {
        let mut space = MemorySpace::new(100);
        space.malloc(10).unwrap();
        space.malloc(20).unwrap();
        assert_eq!(space.to_string(), "(30 , 70) \n(0 , 10) (10 , 20) ");
    }

    #[test]
    fn display_of_full_arena_has_empty_free_line() {
        let mut space = MemorySpace::new(8);
        space.malloc(8).unwrap();
        assert_eq!(space.to_string(), "\n(0 , 8) ");
    }

    #[test]
    fn stats_summarise_both_sequences() {
        let space = space_with(30, &[(0, 5), (10, 3), (20, 10)], &[(5, 5), (13, 7)]);
        let stats = space.stats();
        assert_eq!(
            stats,
            SpaceStats {
                arena_size: 30,
                free_words: 18,
                allocated_words: 12,
                free_blocks: 3,
                allocated_blocks: 2,
                largest_free: 10,
            }
        );
    }

    #[test]
    fn check_reports_overlap() {
        let space = space_with(20, &[(0, 10)], &[(5, 10)]);
        assert_eq!(
            space.check(),
            Err(Error::Corrupted(Violation::Overlap {
                first: Block::new(0, 10),
                second: Block::new(5, 10),
            }))
        );
    }

    #[test]
    fn check_reports_gaps() {
        let space = space_with(20, &[(0, 5)], &[(10, 5)]);
        assert_eq!(
            space.check(),
            Err(Error::Corrupted(Violation::CapacityMismatch {
                expected: 20,
                actual: 10,
            }))
        );
    }

    #[test]
    fn check_reports_blocks_past_the_arena() {
        let space = space_with(10, &[(5, 10)], &[(0, 5)]);
        assert_eq!(
            space.check(),
            Err(Error::Corrupted(Violation::OutOfArena(Block::new(5, 10))))
        );
    }

    #[test]
    fn capacity_and_overlap_hold_across_mixed_workload() {
        let mut space = MemorySpace::with_config(SpaceConfig::new(512).with_slot_capacity(2)).unwrap();
        let mut live = Vec::new();
        let mut seed: u32 = 0x2545_f491;

        for step in 0..400 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let roll = (seed >> 16) as usize;

            if roll % 3 != 0 || live.is_empty() {
                if let Some(address) = space.malloc(roll % 40 + 1) {
                    live.push(address);
                }
            } else {
                let address = live.swap_remove(roll % live.len());
                space.free(address).unwrap();
            }
            if step % 50 == 49 {
                space.defrag().unwrap();
            }

            assert_eq!(space.check(), Ok(()));
            let stats = space.stats();
            assert_eq!(stats.free_words + stats.allocated_words, 512);
            assert_eq!(stats.allocated_blocks, live.len());
        }
    }
}
