#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod linked_sequence;
pub mod slot_arena;

pub use linked_sequence::LinkedSequence;
pub use slot_arena::{SlotArena, SlotId};
