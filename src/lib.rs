//! `slotmem` is a `no_std`-friendly memory layer for container implementations,
//! separating raw typed allocation from object construction and destruction.
//!
//! This crate exports:
//!
//! - [`RawAlloc`]: a trait defining untyped allocation and deallocation over a [`Layout`].
//! - [`DefaultHeap`]: a zero-cost heap source delegating to the global allocator.
//! - [`SlotAlloc`]: a typed allocator handing out blocks of element-sized slots,
//!   with a fail-fast default path and a fallible alternative.
//! - [`lifecycle`]: in-place construction and destruction of values in caller-owned
//!   memory, skipping destruction entirely for types without drop glue.
//! - [`AllocError`]: an enum representing allocation failure cases.
//! - [`SizedProps`](type_props::SizedProps): layout properties of sized types as constants.
//! - [`SlotGuard`](helpers::SlotGuard) and [`RangeGuard`](helpers::RangeGuard):
//!   RAII cleanup for abandoned initialization.
//!
//! # Features
//!
//! - **`std`** (default): `std::error::Error` impls, a diagnostic message on the
//!   fail-fast path, the [`System`](std::alloc::System) heap source, and I/O stat
//!   loggers.
//!
//! - **`malloc`**: Provides [`Malloc`](malloc::Malloc), a heap source backed by
//!   `libc`'s allocation functions.
//!
//! - **`stats`**: Allocation accounting utilities:
//!   - [`StatsLogger`](stats::StatsLogger), a logger for allocation events.
//!   - [`Stats`](stats::Stats), a heap source wrapper that logs operations.
//!   - (With `std`) [`IOLog`](stats::IOLog), a writer-backed logger.
//!   - (With `stats_parking_lot`) Usage of [`parking_lot::Mutex`] instead of
//!     [`std::sync::Mutex`].

#![warn(clippy::all, clippy::pedantic, clippy::undocumented_unsafe_blocks)]
#![deny(missing_docs, unused_unsafe)]
#![allow(unsafe_op_in_unsafe_fn, clippy::module_name_repetitions)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Errors that can occur during allocation, and the fail-fast sink.
pub mod error;
/// Layout arithmetic and RAII guards for partially initialized blocks.
pub mod helpers;
pub mod lifecycle;
/// Sized type properties as constants.
pub mod type_props;

#[cfg(feature = "malloc")]
/// A heap source backed by libc's allocation functions.
pub mod malloc;

#[cfg(feature = "stats")]
/// Allocation accounting wrappers and logger traits.
pub mod stats;

mod slot_alloc;

pub use alloc::alloc::Layout;
pub use error::AllocError;
pub use slot_alloc::SlotAlloc;

use core::ptr::NonNull;
use error::Cause;

/// An untyped memory source.
///
/// Implementations hand out blocks of bytes described by a [`Layout`] and take
/// them back. They never run constructors or destructors; object lifecycle is
/// the domain of [`lifecycle`].
///
/// Thread safety is whatever the underlying primitive provides. This trait adds
/// no synchronization of its own.
pub trait RawAlloc {
    /// Attempts to allocate a block of uninitialized memory fitting the given [`Layout`].
    ///
    /// # Errors
    ///
    /// - [`AllocError::Exhausted`] if the underlying heap fails.
    /// - [`AllocError::ZeroSized`] if `layout` has a size of zero. The contained
    ///   pointer is dangling and valid for the requested alignment.
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Attempts to allocate a zeroed block of memory fitting the given [`Layout`].
    ///
    /// # Errors
    ///
    /// - [`AllocError::Exhausted`] if the underlying heap fails.
    /// - [`AllocError::ZeroSized`] if `layout` has a size of zero.
    #[inline]
    fn zalloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.alloc(layout)?;
        // SAFETY: alloc returned at least layout.size() writable bytes.
        unsafe {
            core::ptr::write_bytes(ptr.as_ptr(), 0, layout.size());
        }
        Ok(ptr)
    }

    /// Deallocates a previously allocated block.
    ///
    /// This is a noop if `layout.size() == 0`.
    ///
    /// # Safety
    ///
    /// - `ptr` must be exactly the address returned by a matching `alloc` or
    ///   `zalloc` call on this source, not yet deallocated.
    /// - `layout` must describe exactly the same block.
    ///
    /// Violating either is undefined behavior, not a detected error.
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Default heap source, delegating to the global allocator.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefaultHeap;

impl RawAlloc for DefaultHeap {
    #[inline]
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        helpers::alloc_or_err(
            layout,
            // SAFETY: alloc_or_err only calls this after verifying the layout is
            //  non-zero-sized.
            |layout| unsafe { alloc::alloc::alloc(layout) },
            Cause::Unknown,
        )
    }

    #[inline]
    fn zalloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        helpers::alloc_or_err(
            layout,
            // SAFETY: alloc_or_err only calls this after verifying the layout is
            //  non-zero-sized.
            |layout| unsafe { alloc::alloc::alloc_zeroed(layout) },
            Cause::Unknown,
        )
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            alloc::alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

// SAFETY: DefaultHeap doesn't unwind, and all layout operations are forwarded
//  unchanged to the global allocator.
unsafe impl alloc::alloc::GlobalAlloc for DefaultHeap {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        alloc::alloc::alloc(layout)
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        alloc::alloc::dealloc(ptr, layout);
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        alloc::alloc::alloc_zeroed(layout)
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        alloc::alloc::realloc(ptr, layout, new_size)
    }
}

#[allow(clippy::inline_always)]
impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    #[inline(always)]
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).alloc(layout)
    }

    #[inline(always)]
    fn zalloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).zalloc(layout)
    }

    #[inline(always)]
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).dealloc(ptr, layout);
    }
}

#[cfg(feature = "std")]
impl RawAlloc for std::alloc::System {
    #[inline]
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        helpers::alloc_or_err(
            layout,
            // SAFETY: alloc_or_err only calls this after verifying the layout is
            //  non-zero-sized.
            |layout| unsafe { alloc::alloc::GlobalAlloc::alloc(self, layout) },
            Cause::Unknown,
        )
    }

    #[inline]
    fn zalloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        helpers::alloc_or_err(
            layout,
            // SAFETY: alloc_or_err only calls this after verifying the layout is
            //  non-zero-sized.
            |layout| unsafe { alloc::alloc::GlobalAlloc::alloc_zeroed(self, layout) },
            Cause::Unknown,
        )
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            alloc::alloc::GlobalAlloc::dealloc(self, ptr.as_ptr(), layout);
        }
    }
}
