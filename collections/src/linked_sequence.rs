use alloc::vec::Vec;
use core::fmt;

use crate::slot_arena::{self, SlotArena, SlotId};

const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    OutOfRange { index: usize, len: usize },
    NotFound,
    Arena(slot_arena::Error),
}

impl From<slot_arena::Error> for Error {
    fn from(error: slot_arena::Error) -> Self {
        Error::Arena(error)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange { index, len } => {
                write!(f, "index {} out of range for sequence of length {}", index, len)
            }
            Error::NotFound => f.write_str("value is not in the sequence"),
            Error::Arena(error) => write!(f, "slot storage: {}", error),
        }
    }
}

struct Node<T> {
    value: T,
    next: Option<SlotId>,
}

/// Ordered sequence of values linked through their successors.
///
/// Nodes live in a [`SlotArena`]; each one knows only the slot that follows
/// it. Operations at the head, and appends at the tail, are O(1). Anything
/// that needs a predecessor (middle insertion, removal past the head) walks
/// from the head.
pub struct LinkedSequence<T> {
    nodes: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl<T: Copy + PartialEq> LinkedSequence<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotArena::new(capacity.max(1)),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<T> {
        self.head.and_then(|slot| self.value_of(slot))
    }

    pub fn last(&self) -> Option<T> {
        self.tail.and_then(|slot| self.value_of(slot))
    }

    pub fn first_slot(&self) -> Option<SlotId> {
        self.head
    }

    pub fn last_slot(&self) -> Option<SlotId> {
        self.tail
    }

    pub fn next_slot(&self, slot: SlotId) -> Option<SlotId> {
        self.nodes.get(slot).ok().and_then(|node| node.next)
    }

    pub fn value_of(&self, slot: SlotId) -> Option<T> {
        self.nodes.get(slot).ok().map(|node| node.value)
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<(), Error> {
        if index >= bound {
            return Err(Error::OutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    fn slot_at(&self, index: usize) -> Result<SlotId, Error> {
        self.check_index(index, self.len)?;
        let mut slot = self.head.ok_or(Error::Arena(slot_arena::Error::NotFound))?;
        for _ in 0..index {
            slot = self
                .nodes
                .get(slot)?
                .next
                .ok_or(Error::Arena(slot_arena::Error::NotFound))?;
        }
        Ok(slot)
    }

    pub fn get(&self, index: usize) -> Result<T, Error> {
        let slot = self.slot_at(index)?;
        Ok(self.nodes.get(slot)?.value)
    }

    /// Replaces the value at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T, Error> {
        let slot = self.slot_at(index)?;
        let node = self.nodes.get_mut(slot)?;
        Ok(core::mem::replace(&mut node.value, value))
    }

    pub fn push_front(&mut self, value: T) -> Result<SlotId, Error> {
        let slot = self.nodes.add(Node {
            value,
            next: self.head,
        })?;
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
        self.len += 1;
        Ok(slot)
    }

    pub fn push_back(&mut self, value: T) -> Result<SlotId, Error> {
        let slot = self.nodes.add(Node { value, next: None })?;
        match self.tail {
            Some(tail) => self.nodes.get_mut(tail)?.next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        Ok(slot)
    }

    /// Inserts `value` so that it ends up at position `index`.
    ///
    /// `index` may equal `len()`, which appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<SlotId, Error> {
        self.check_index(index, self.len + 1)?;
        if index == 0 {
            return self.push_front(value);
        }
        if index == self.len {
            return self.push_back(value);
        }

        let prev = self.slot_at(index - 1)?;
        let next = self.nodes.get(prev)?.next;
        let slot = self.nodes.add(Node { value, next })?;
        self.nodes.get_mut(prev)?.next = Some(slot);
        self.len += 1;
        Ok(slot)
    }

    pub fn index_of(&self, value: T) -> Option<usize> {
        self.iter().position(|candidate| candidate == value)
    }

    pub fn contains(&self, value: T) -> bool {
        self.index_of(value).is_some()
    }

    fn unlink(&mut self, prev: Option<SlotId>, slot: SlotId) -> Result<T, Error> {
        let node = self.nodes.remove(slot)?;
        match prev {
            Some(prev) => self.nodes.get_mut(prev)?.next = node.next,
            None => self.head = node.next,
        }
        if self.tail == Some(slot) {
            self.tail = prev;
        }
        self.len -= 1;
        Ok(node.value)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, Error> {
        self.check_index(index, self.len)?;
        if index == 0 {
            let head = self.head.ok_or(Error::Arena(slot_arena::Error::NotFound))?;
            return self.unlink(None, head);
        }

        let prev = self.slot_at(index - 1)?;
        let slot = self
            .nodes
            .get(prev)?
            .next
            .ok_or(Error::Arena(slot_arena::Error::NotFound))?;
        self.unlink(Some(prev), slot)
    }

    /// Removes the first occurrence of `value` and returns the position it held.
    pub fn remove(&mut self, value: T) -> Result<usize, Error> {
        let index = self.index_of(value).ok_or(Error::NotFound)?;
        self.remove_at(index)?;
        Ok(index)
    }

    pub fn remove_slot(&mut self, slot: SlotId) -> Result<T, Error> {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(current) = cursor {
            if current == slot {
                return self.unlink(prev, current);
            }
            prev = Some(current);
            cursor = self.next_slot(current);
        }
        Err(Error::NotFound)
    }

    /// Stable sort by `key`. Values move between nodes; the chain is untouched.
    pub fn sort_by_key<K, F>(&mut self, key: F)
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        let mut values: Vec<T> = self.iter().collect();
        values.sort_by_key(key);

        let mut cursor = self.head;
        for value in values {
            let Some(slot) = cursor else { break };
            match self.nodes.get_mut(slot) {
                Ok(node) => {
                    node.value = value;
                    cursor = node.next;
                }
                Err(_) => break,
            }
        }
    }

    pub fn clear(&mut self) {
        let mut cursor = self.head.take();
        while let Some(slot) = cursor {
            cursor = self.nodes.remove(slot).ok().and_then(|node| node.next);
        }
        self.tail = None;
        self.len = 0;
    }

    /// Walks the successor chain and confirms it visits exactly `len()` nodes
    /// and terminates at the tail.
    pub fn check_links(&self) -> bool {
        if self.head.is_none() || self.tail.is_none() {
            return self.len == 0 && self.head.is_none() && self.tail.is_none();
        }

        let mut visited = 0;
        let mut last = None;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            visited += 1;
            if visited > self.len {
                return false;
            }
            last = Some(slot);
            cursor = match self.nodes.get(slot) {
                Ok(node) => node.next,
                Err(_) => return false,
            };
        }

        visited == self.len && last == self.tail && self.nodes.len() == self.len
    }

    /// Lazy front-to-back traversal starting at the current head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            sequence: self,
            cursor: self.head,
        }
    }
}

impl<T: Copy + PartialEq> Default for LinkedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq + fmt::Debug> fmt::Debug for LinkedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Iter<'a, T> {
    sequence: &'a LinkedSequence<T>,
    cursor: Option<SlotId>,
}

impl<'a, T: Copy + PartialEq> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let slot = self.cursor?;
        let node = self.sequence.nodes.get(slot).ok()?;
        self.cursor = node.next;
        Some(node.value)
    }
}

impl<'a, T: Copy + PartialEq> IntoIterator for &'a LinkedSequence<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
