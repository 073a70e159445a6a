use crate::{
    error::{AllocError, Cause},
    helpers::alloc_or_err,
    Layout, RawAlloc,
};
use core::ptr::NonNull;

// the alignment malloc guarantees without being asked
#[cfg(any(
    target_arch = "x86",
    target_arch = "arm",
    target_arch = "mips",
    target_arch = "powerpc",
    target_arch = "riscv32"
))]
const MIN_ALIGN: usize = 8;
#[cfg(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "powerpc64",
    target_arch = "riscv64",
    target_arch = "loongarch64",
    target_arch = "s390x"
))]
const MIN_ALIGN: usize = 16;

/// Handle to libc's allocation functions.
///
/// This is almost the same as `std::alloc::System` on unix targets; it exists
/// so the typed layer can be exercised against a heap primitive other than the
/// global allocator.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Malloc;

#[inline]
const fn fits_malloc(layout: Layout) -> bool {
    layout.align() <= MIN_ALIGN && layout.align() <= layout.size()
}

fn raw_alloc(layout: Layout) -> *mut u8 {
    if fits_malloc(layout) {
        // SAFETY: malloc is safe to call with any size.
        unsafe { libc::malloc(layout.size()).cast() }
    } else {
        aligned_alloc(layout)
    }
}

#[cfg(not(windows))]
fn aligned_alloc(layout: Layout) -> *mut u8 {
    use core::{ffi::c_void, mem::size_of, ptr};
    // posix_memalign requires the alignment to be at least pointer-sized
    let align = layout.align().max(size_of::<*mut c_void>());
    let mut out = ptr::null_mut::<c_void>();
    // SAFETY: align is a power of two and a multiple of size_of::<*mut c_void>().
    let ret = unsafe { libc::posix_memalign(&mut out, align, layout.size()) };
    if ret == 0 {
        out.cast()
    } else {
        ptr::null_mut()
    }
}

#[cfg(windows)]
fn aligned_alloc(layout: Layout) -> *mut u8 {
    // SAFETY: a Layout's alignment is always a power of two.
    unsafe { libc::aligned_malloc(layout.size(), layout.align()).cast() }
}

impl RawAlloc for Malloc {
    #[inline]
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        alloc_or_err(layout, raw_alloc, Cause::OutOfMemory)
    }

    #[inline]
    fn zalloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if fits_malloc(layout) {
            alloc_or_err(
                layout,
                // SAFETY: calloc is safe to call with any size.
                |layout| unsafe { libc::calloc(1, layout.size()).cast() },
                Cause::OutOfMemory,
            )
        } else {
            let ptr = self.alloc(layout)?;
            // SAFETY: alloc returned at least layout.size() writable bytes.
            unsafe {
                core::ptr::write_bytes(ptr.as_ptr(), 0, layout.size());
            }
            Ok(ptr)
        }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        #[cfg(not(windows))]
        {
            // both malloc and posix_memalign memory is returned through free
            let _ = layout;
            libc::free(ptr.as_ptr().cast());
        }
        #[cfg(windows)]
        {
            if fits_malloc(layout) {
                libc::free(ptr.as_ptr().cast());
            } else {
                libc::aligned_free(ptr.as_ptr().cast());
            }
        }
    }
}
