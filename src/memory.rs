//! # Fixed-block memory pool
//!
//! A standalone O(1) allocator over a single aligned region, threading a
//! free list through the unused blocks the way the reference
//! implementation's pool was specified to (§4.1). The AST itself is built
//! from ordinary `Box`-owned trees rather than pool-backed nodes — see
//! `DESIGN.md` for why both exist side by side — so this module's job is
//! to be a correct, independently testable realization of the pool
//! contract, not to back any other part of the compiler.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A fixed-block pool: `count` blocks of (at least) `block_size` bytes,
/// aligned to `alignment`.
pub struct Pool {
    region: NonNull<u8>,
    layout: Layout,
    block_size: usize,
    free_list: Option<NonNull<u8>>,
}

/// Raised size/alignment bookkeeping is intentionally explicit rather than
/// hidden inside `create`, so callers (and tests) can see what was actually
/// reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLayout {
    pub block_size: usize,
    pub count: usize,
    pub alignment: usize,
}

impl Pool {
    /// Reserves a single contiguous region of `block_size * count` bytes
    /// (after `block_size` is raised to fit a free-list link, and
    /// `alignment` is validated as a power of two no smaller than a
    /// pointer's alignment) and threads a free list through every block.
    ///
    /// Panics if the underlying allocator fails — allocation failure on
    /// pool creation is specified as fatal (§4.1), and a toy AOT compiler
    /// has no recovery path to unwind to.
    pub fn create(block_size: usize, count: usize, alignment: usize) -> Pool {
        assert!(alignment.is_power_of_two(), "alignment must be a power of two");
        let min_align = std::mem::align_of::<usize>();
        let alignment = alignment.max(min_align);
        let block_size = block_size.max(std::mem::size_of::<usize>());
        let block_size = round_up(block_size, alignment);

        assert!(count > 0, "pool must hold at least one block");
        let total = block_size
            .checked_mul(count)
            .expect("pool size overflow");
        let layout = Layout::from_size_align(total, alignment).expect("invalid pool layout");

        // SAFETY: layout has non-zero size (block_size >= size_of::<usize>() and count > 0).
        let region = unsafe { alloc::alloc(layout) };
        let region = NonNull::new(region).unwrap_or_else(|| alloc::handle_alloc_error(layout));

        let mut pool = Pool {
            region,
            layout,
            block_size,
            free_list: None,
        };

        // Thread the free list back-to-front so the first `alloc()` returns
        // the first block, matching allocation order to block order.
        for i in (0..count).rev() {
            // SAFETY: i < count, so the offset stays within `region`'s allocation.
            let block = unsafe { pool.region.as_ptr().add(i * pool.block_size) };
            let block = NonNull::new(block).unwrap();
            // SAFETY: block is valid, word-aligned, and large enough for a pointer.
            unsafe {
                (block.as_ptr() as *mut Option<NonNull<u8>>).write(pool.free_list);
            }
            pool.free_list = Some(block);
        }

        crate::debug::log_memory(&format!(
            "pool created: {} blocks of {} bytes",
            count, pool.block_size
        ));
        pool
    }

    pub fn layout(&self) -> PoolLayout {
        PoolLayout {
            block_size: self.block_size,
            count: self.layout.size() / self.block_size,
            alignment: self.layout.align(),
        }
    }

    /// Detaches the head of the free list. Returns `None` if the pool is
    /// exhausted — the caller's responsibility to treat as a fatal resource
    /// error (`CompileError::PoolExhausted`).
    pub fn alloc(&mut self) -> Option<NonNull<u8>> {
        let block = self.free_list?;
        // SAFETY: block was written by `create`/`free` with a valid link.
        let next = unsafe { (block.as_ptr() as *const Option<NonNull<u8>>).read() };
        self.free_list = next;
        Some(block)
    }

    /// Re-attaches `block` at the head of the free list, making it available
    /// to the next `alloc()`. The caller must not use `block` after freeing
    /// it and must only pass blocks this pool itself returned from `alloc`.
    pub fn free(&mut self, block: NonNull<u8>) {
        // SAFETY: block is one of this pool's blocks and is word-aligned.
        unsafe {
            (block.as_ptr() as *mut Option<NonNull<u8>>).write(self.free_list);
        }
        self.free_list = Some(block);
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // SAFETY: region/layout match exactly what `alloc::alloc` was called with.
        unsafe {
            alloc::dealloc(self.region.as_ptr(), self.layout);
        }
    }
}

fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_roundtrip_restores_capacity() {
        let mut pool = Pool::create(16, 4, 8);
        let mut blocks = Vec::new();
        for _ in 0..4 {
            blocks.push(pool.alloc().expect("pool should not be exhausted yet"));
        }
        assert!(pool.alloc().is_none(), "pool of 4 should be exhausted after 4 allocs");

        for block in blocks.drain(..) {
            pool.free(block);
        }

        let mut reallocated = 0;
        while pool.alloc().is_some() {
            reallocated += 1;
        }
        assert_eq!(reallocated, 4, "freeing every block should restore full capacity");
    }

    #[test]
    fn block_size_is_raised_to_fit_a_free_list_link() {
        let pool = Pool::create(1, 2, 1);
        assert!(pool.layout().block_size >= std::mem::size_of::<usize>());
    }

    #[test]
    fn alignment_is_raised_to_at_least_word_size() {
        let pool = Pool::create(4, 2, 1);
        assert!(pool.layout().alignment >= std::mem::align_of::<usize>());
    }

    #[test]
    fn blocks_are_writable_and_distinct() {
        let mut pool = Pool::create(8, 3, 8);
        let a = pool.alloc().unwrap();
        let b = pool.alloc().unwrap();
        assert_ne!(a.as_ptr(), b.as_ptr());
        unsafe {
            (a.as_ptr() as *mut u64).write(0xDEAD_BEEF);
            assert_eq!((a.as_ptr() as *const u64).read(), 0xDEAD_BEEF);
        }
    }
}
