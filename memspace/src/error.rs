use core::fmt;

use collections::{linked_sequence, slot_arena};

use crate::block::Block;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    EmptyArena,
    NothingAllocated,
    NotAllocated(usize),
    Sequence(linked_sequence::Error),
    Storage(slot_arena::Error),
    Corrupted(Violation),
}

/// First broken invariant found by [`crate::MemorySpace::check`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Violation {
    BrokenLinks,
    DanglingBlock,
    UntrackedBlocks { stored: usize, tracked: usize },
    ZeroLength(Block),
    OutOfArena(Block),
    Overlap { first: Block, second: Block },
    CapacityMismatch { expected: usize, actual: usize },
}

impl From<linked_sequence::Error> for Error {
    fn from(error: linked_sequence::Error) -> Self {
        Error::Sequence(error)
    }
}

impl From<slot_arena::Error> for Error {
    fn from(error: slot_arena::Error) -> Self {
        Error::Storage(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyArena => f.write_str("arena size must be greater than zero"),
            Error::NothingAllocated => f.write_str("no block is currently allocated"),
            Error::NotAllocated(address) => {
                write!(f, "no allocated block starts at address {}", address)
            }
            Error::Sequence(error) => write!(f, "block sequence: {}", error),
            Error::Storage(error) => write!(f, "block store: {}", error),
            Error::Corrupted(violation) => write!(f, "memory space corrupted: {}", violation),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::BrokenLinks => f.write_str("sequence links do not match its length"),
            Violation::DanglingBlock => f.write_str("sequence refers to a released block"),
            Violation::UntrackedBlocks { stored, tracked } => write!(
                f,
                "{} blocks stored but {} reachable from the sequences",
                stored, tracked
            ),
            Violation::ZeroLength(block) => write!(f, "zero-length block {}", block),
            Violation::OutOfArena(block) => write!(f, "block {} extends past the arena", block),
            Violation::Overlap { first, second } => {
                write!(f, "blocks {} and {} overlap", first, second)
            }
            Violation::CapacityMismatch { expected, actual } => write!(
                f,
                "blocks cover {} words, arena has {}",
                actual, expected
            ),
        }
    }
}
