#![cfg_attr(not(test), no_std)]

extern crate alloc;
extern crate collections;
extern crate lazy_static;
extern crate spin;

pub mod debug;
pub mod block;
pub mod config;
pub mod error;
pub mod memory_space;

pub use block::{Block, BlockId};
pub use config::SpaceConfig;
pub use error::{Error, Violation};
pub use memory_space::{MemorySpace, SpaceStats};
