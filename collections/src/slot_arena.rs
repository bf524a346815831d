use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

const INDEX_BITS: u32 = u32::BITS;

/// Generation-tagged reference into a [`SlotArena`].
///
/// Two ids are equal only when both the slot and the generation match, so an
/// id kept around after its slot was recycled never aliases the new tenant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub index: u32,
    pub generation: u32,
}

impl SlotId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn pack(&self) -> u64 {
        ((self.index as u64) << INDEX_BITS) | (self.generation as u64)
    }

    pub fn unpack(packed: u64) -> Self {
        let mask = (1u64 << INDEX_BITS) - 1;
        Self {
            index: (packed >> INDEX_BITS) as u32,
            generation: (packed & mask) as u32,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    NotFound,
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => f.write_str("slot id does not refer to a live slot"),
            Error::OutOfMemory => f.write_str("slot arena index range exhausted"),
        }
    }
}

/// Contiguous slot storage with free-slot reuse.
///
/// Freed slots are recycled oldest first. Capacity doubles when every slot is
/// taken, up to the `u32` index range.
pub struct SlotArena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_slots: VecDeque<u32>,
    live: usize,
}

impl<T> SlotArena<T> {
    const MAX_SLOTS: usize = u32::MAX as usize;

    pub fn new(initial_capacity: usize) -> Self {
        assert!(
            initial_capacity <= Self::MAX_SLOTS,
            "Initial capacity cannot exceed the slot index range"
        );
        assert!(initial_capacity > 0, "Initial capacity cannot be zero");

        let mut arena = Self {
            items: Vec::with_capacity(initial_capacity),
            generations: Vec::with_capacity(initial_capacity),
            free_slots: VecDeque::with_capacity(initial_capacity),
            live: 0,
        };
        arena.grow_to(initial_capacity);
        arena
    }

    fn grow_to(&mut self, new_size: usize) {
        for slot in self.items.len()..new_size {
            self.items.push(None);
            self.generations.push(0);
            self.free_slots.push_back(slot as u32);
        }
    }

    pub fn add(&mut self, item: T) -> Result<SlotId, Error> {
        if self.free_slots.is_empty() {
            let current = self.items.len();
            if current >= Self::MAX_SLOTS {
                return Err(Error::OutOfMemory);
            }
            let new_size = current.saturating_mul(2).max(1).min(Self::MAX_SLOTS);
            self.grow_to(new_size);
        }

        let index = self.free_slots.pop_front().ok_or(Error::OutOfMemory)?;
        let slot = index as usize;
        self.items[slot] = Some(item);
        self.live += 1;

        Ok(SlotId::new(index, self.generations[slot]))
    }

    fn live_slot(&self, id: SlotId) -> Option<usize> {
        let index = id.index as usize;
        let valid = index < self.items.len()
            && self.generations[index] == id.generation
            && self.items[index].is_some();
        valid.then_some(index)
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.live_slot(id).is_some()
    }

    pub fn get(&self, id: SlotId) -> Result<&T, Error> {
        let index = self.live_slot(id).ok_or(Error::NotFound)?;
        self.items[index].as_ref().ok_or(Error::NotFound)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Result<&mut T, Error> {
        let index = self.live_slot(id).ok_or(Error::NotFound)?;
        self.items[index].as_mut().ok_or(Error::NotFound)
    }

    pub fn remove(&mut self, id: SlotId) -> Result<T, Error> {
        let index = self.live_slot(id).ok_or(Error::NotFound)?;
        let item = self.items[index].take().ok_or(Error::NotFound)?;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_slots.push_back(index as u32);
        self.live -= 1;
        Ok(item)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }
}
