//! Size-classed slab allocator for document-tree slots.
//!
//! Small requests are rounded up to one of [`SIZE_CLASSES`] and carved out of
//! shared pages of about 4 KiB; freed blocks go onto a free list per class and
//! are handed out again before any page is carved further. Only the newest
//! page is carved; when a block no longer fits, its tail is split onto the
//! free lists of the smaller classes first. Requests above
//! [`MAX_SMALL`] units get a dedicated page that is recycled first-fit by
//! capacity. [`Arena::reset`] drops every page at once.
//!
//! Blocks are plain handles. Each one records its own capacity, so freeing a
//! block never needs the size it was requested with.

use alloc::{boxed::Box, vec, vec::Vec};
use core::mem::size_of;

use log::trace;

/// Block sizes, in slots, served from shared pages.
pub const SIZE_CLASSES: [usize; 10] = [1, 2, 4, 8, 16, 32, 64, 96, 128, 160];

/// Largest request served from a shared page.
pub const MAX_SMALL: usize = 160;

/// Target byte size of a shared page.
pub const PAGE_BYTES: usize = 4096;

/// Handle to a run of slots owned by an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    large: bool,
    page: u32,
    offset: u32,
    capacity: u32,
}

impl Block {
    /// Number of slots the block can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }
}

#[derive(Debug)]
struct Page<T> {
    slots: Box<[T]>,
    used: usize,
}

/// Page and free-list counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Shared pages currently held.
    pub pages: usize,
    /// Dedicated pages for oversized blocks.
    pub large_pages: usize,
    /// Blocks waiting on the small free lists.
    pub free_small: usize,
    /// Oversized blocks waiting for reuse.
    pub free_large: usize,
    /// Slots in blocks that are currently handed out.
    pub live_slots: usize,
}

/// The allocator. One arena serves one document at a time.
#[derive(Debug)]
pub struct Arena<T> {
    pages: Vec<Page<T>>,
    large: Vec<Box<[T]>>,
    free: [Vec<Block>; SIZE_CLASSES.len()],
    free_large: Vec<Block>,
    live_slots: usize,
}

impl<T: Copy + Default> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> Arena<T> {
    /// Creates an arena that holds no pages yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            large: Vec::new(),
            free: Default::default(),
            free_large: Vec::new(),
            live_slots: 0,
        }
    }

    /// Slots per shared page; always room for the largest small class.
    #[must_use]
    pub fn slots_per_page() -> usize {
        (PAGE_BYTES / size_of::<T>().max(1)).max(MAX_SMALL)
    }

    /// Hands out a block of at least `n` slots, all set to `T::default()`.
    ///
    /// A request for zero slots is served as one slot.
    pub fn alloc(&mut self, n: usize) -> Block {
        let n = n.max(1);
        let block = match class_index(n) {
            Some(class) => self.alloc_small(class),
            None => self.alloc_large(n),
        };
        self.live_slots += block.capacity();
        self.slice_mut(block).fill(T::default());
        block
    }

    fn alloc_small(&mut self, class: usize) -> Block {
        if let Some(block) = self.free[class].pop() {
            return block;
        }
        let size = SIZE_CLASSES[class];
        let per_page = Self::slots_per_page();
        // Carve only from the newest page, like a bump allocator.
        let room = self.pages.last().map_or(0, |p| per_page - p.used);
        if room < size {
            self.spill_tail();
            trace!("arena: new page #{} of {per_page} slots", self.pages.len());
            self.pages.push(Page {
                slots: vec![T::default(); per_page].into_boxed_slice(),
                used: 0,
            });
        }
        let page = self.pages.len() - 1;
        let offset = self.pages[page].used;
        self.pages[page].used += size;
        Block {
            large: false,
            page: to_u32(page),
            offset: to_u32(offset),
            capacity: to_u32(size),
        }
    }

    /// Hands the uncarved tail of the newest page to the smaller free lists.
    fn spill_tail(&mut self) {
        let per_page = Self::slots_per_page();
        let index = to_u32(self.pages.len().saturating_sub(1));
        let Some(page) = self.pages.last_mut() else {
            return;
        };
        while let Some(class) = SIZE_CLASSES.iter().rposition(|&s| s <= per_page - page.used) {
            let size = SIZE_CLASSES[class];
            self.free[class].push(Block {
                large: false,
                page: index,
                offset: to_u32(page.used),
                capacity: to_u32(size),
            });
            page.used += size;
        }
    }

    fn alloc_large(&mut self, n: usize) -> Block {
        if let Some(pos) = self.free_large.iter().position(|b| b.capacity() >= n) {
            return self.free_large.swap_remove(pos);
        }
        trace!("arena: dedicated page of {n} slots");
        self.large.push(vec![T::default(); n].into_boxed_slice());
        Block {
            large: true,
            page: to_u32(self.large.len() - 1),
            offset: 0,
            capacity: to_u32(n),
        }
    }

    /// Returns `block` to its free list.
    ///
    /// The block must have come from this arena since the last
    /// [`reset`](Self::reset) and must not be freed twice.
    pub fn dealloc(&mut self, block: Block) {
        self.live_slots = self.live_slots.saturating_sub(block.capacity());
        if block.large {
            self.free_large.push(block);
        } else if let Some(class) = class_index(block.capacity()) {
            self.free[class].push(block);
        }
    }

    /// Moves the first `live` slots of `block` into a block of at least
    /// `new_len` slots and frees the old one.
    pub fn grow(&mut self, block: Block, live: usize, new_len: usize) -> Block {
        if new_len <= block.capacity() {
            return block;
        }
        let grown = self.alloc(new_len);
        let live = live.min(block.capacity());
        self.copy_prefix(block, grown, live);
        self.dealloc(block);
        grown
    }

    /// Copies the first `len` slots of `from` into `to` in one move.
    fn copy_prefix(&mut self, from: Block, to: Block, len: usize) {
        let src = from.offset as usize..from.offset as usize + len;
        let dst = to.offset as usize..to.offset as usize + len;
        if !from.large && !to.large && from.page == to.page {
            if let Some(page) = self.pages.get_mut(from.page as usize) {
                if src.end <= page.slots.len() && dst.end <= page.slots.len() {
                    page.slots.copy_within(src, dst.start);
                }
            }
            return;
        }
        let pair = match (from.large, to.large) {
            (false, false) => pair_mut(&mut self.pages, from.page, to.page)
                .map(|(a, b)| (&*a.slots, &mut *b.slots)),
            (true, true) => {
                pair_mut(&mut self.large, from.page, to.page).map(|(a, b)| (&**a, &mut **b))
            }
            (false, true) => self
                .pages
                .get(from.page as usize)
                .zip(self.large.get_mut(to.page as usize))
                .map(|(a, b)| (&*a.slots, &mut **b)),
            (true, false) => self
                .large
                .get(from.page as usize)
                .zip(self.pages.get_mut(to.page as usize))
                .map(|(a, b)| (&**a, &mut *b.slots)),
        };
        if let Some((source, target)) = pair {
            if let (Some(s), Some(t)) = (source.get(src), target.get_mut(dst)) {
                t.copy_from_slice(s);
            }
        }
    }

    /// The slots of `block`. Empty if the handle is stale.
    #[must_use]
    pub fn slice(&self, block: Block) -> &[T] {
        let (start, end) = block.bounds();
        let slots = if block.large {
            self.large.get(block.page as usize).and_then(|p| p.get(start..end))
        } else {
            self.pages
                .get(block.page as usize)
                .and_then(|p| p.slots.get(start..end))
        };
        slots.unwrap_or(&[])
    }

    /// Mutable slots of `block`. Empty if the handle is stale.
    pub fn slice_mut(&mut self, block: Block) -> &mut [T] {
        let (start, end) = block.bounds();
        let slots = if block.large {
            self.large
                .get_mut(block.page as usize)
                .and_then(|p| p.get_mut(start..end))
        } else {
            self.pages
                .get_mut(block.page as usize)
                .and_then(|p| p.slots.get_mut(start..end))
        };
        slots.unwrap_or(&mut [])
    }

    /// Releases every page and clears every free list.
    ///
    /// All outstanding blocks become stale.
    pub fn reset(&mut self) {
        if !self.pages.is_empty() || !self.large.is_empty() {
            trace!(
                "arena: reset, dropping {} shared and {} dedicated pages",
                self.pages.len(),
                self.large.len()
            );
        }
        self.pages = Vec::new();
        self.large = Vec::new();
        for list in &mut self.free {
            list.clear();
        }
        self.free_large.clear();
        self.live_slots = 0;
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            pages: self.pages.len(),
            large_pages: self.large.len(),
            free_small: self.free.iter().map(Vec::len).sum(),
            free_large: self.free_large.len(),
            live_slots: self.live_slots,
        }
    }
}

impl Block {
    fn bounds(self) -> (usize, usize) {
        let start = self.offset as usize;
        (start, start + self.capacity as usize)
    }
}

/// Index of the smallest class that fits `n`, or `None` for oversized requests.
#[must_use]
pub fn class_index(n: usize) -> Option<usize> {
    SIZE_CLASSES.iter().position(|&size| size >= n)
}

/// Two distinct elements of `items`, borrowed mutably at once.
fn pair_mut<U>(items: &mut [U], a: u32, b: u32) -> Option<(&mut U, &mut U)> {
    let (a, b) = (a as usize, b as usize);
    if a < b {
        let (head, tail) = items.split_at_mut_checked(b)?;
        Some((head.get_mut(a)?, tail.first_mut()?))
    } else if b < a {
        let (head, tail) = items.split_at_mut_checked(a)?;
        let second = head.get_mut(b)?;
        Some((tail.first_mut()?, second))
    } else {
        None
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
