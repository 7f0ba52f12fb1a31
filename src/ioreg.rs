// Licensed under the Apache-2.0 license

//! Hardware register access seam.
//!
//! Every firmware block on the WIB (the per-FEMB COLDATA I2C controllers,
//! the shared fast-command block) is exposed to software as a small array of
//! 32-bit AXI registers. [`RegisterIo`] is the only way drivers in this
//! crate touch those registers, which keeps the drivers testable against a
//! fake register file and independent of how the block was mapped.
//!
//! The crate never caches register contents across accesses; every call hits
//! the implementation directly.

use core::cell::RefCell;

/// Word-indexed access to one memory-mapped register block.
///
/// `index` is a word offset within the block, not a byte address. Reads may
/// have hardware side effects, so both operations take `&mut self`.
pub trait RegisterIo {
    /// Read the 32-bit register at `index`.
    fn read(&mut self, index: usize) -> u32;

    /// Write the 32-bit register at `index`.
    fn write(&mut self, index: usize, value: u32);
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read(&mut self, index: usize) -> u32 {
        (**self).read(index)
    }

    fn write(&mut self, index: usize, value: u32) {
        (**self).write(index, value);
    }
}

/// Shared-handle access for register blocks with more than one owner.
///
/// The fast-command block is shared by all four FEMB slots; each owner holds
/// a `&RefCell<T>` and the `RefCell` enforces the single-writer-at-a-time
/// discipline at runtime. Multi-threaded callers must serialize access with
/// their own lock instead; this impl is for the single-threaded model the
/// board software uses.
impl<T: RegisterIo> RegisterIo for &RefCell<T> {
    fn read(&mut self, index: usize) -> u32 {
        self.borrow_mut().read(index)
    }

    fn write(&mut self, index: usize, value: u32) {
        self.borrow_mut().write(index, value);
    }
}

/// Volatile accessor for a block of device registers mapped into the
/// address space.
pub struct Mmio {
    base: *mut u32,
    len: usize,
}

impl Mmio {
    /// Wrap a mapped register block of `len` 32-bit words starting at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point to a device register region of at least `len` words
    /// that stays mapped for the lifetime of the returned value, and no other
    /// code may access the same region concurrently.
    #[must_use]
    pub const unsafe fn new(base: *mut u32, len: usize) -> Self {
        Self { base, len }
    }

    /// Number of 32-bit words in the block.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl RegisterIo for Mmio {
    fn read(&mut self, index: usize) -> u32 {
        debug_assert!(index < self.len);
        unsafe { core::ptr::read_volatile(self.base.add(index)) }
    }

    fn write(&mut self, index: usize, value: u32) {
        debug_assert!(index < self.len);
        unsafe { core::ptr::write_volatile(self.base.add(index), value) }
    }
}

// The registers behind an Mmio belong to exactly one block; moving the
// accessor to another thread is fine, aliasing it is not.
unsafe impl Send for Mmio {}
