use crate::{
    error::{fail_alloc, AllocError},
    helpers::{array_layout, dangling_nonnull},
    lifecycle,
    type_props::SizedProps,
    DefaultHeap, RawAlloc,
};
use core::{fmt, marker::PhantomData, ptr::NonNull};

/// A typed allocator: hands out blocks of `count` contiguous slots of `T` from
/// an untyped heap source, and forwards slot lifecycle to [`lifecycle`].
///
/// This is the surface a container holds. It is stateless beyond the heap
/// source itself (zero-sized for the default source), never retains a
/// reference to the blocks it hands out, and performs no bookkeeping: the
/// caller owns every block from `allocate` to `deallocate` and tracks which
/// slots are live.
///
/// The default path, [`allocate`](SlotAlloc::allocate), fails fast: heap
/// exhaustion reports a diagnostic and terminates rather than returning a
/// pointer that isn't backed by memory. [`try_allocate`](SlotAlloc::try_allocate)
/// is the fallible alternative for callers that can do better than dying.
pub struct SlotAlloc<T, A: RawAlloc = DefaultHeap> {
    heap: A,
    _elem: PhantomData<T>,
}

impl<T> SlotAlloc<T> {
    /// Creates a typed allocator over the global allocator.
    #[must_use]
    #[inline]
    pub const fn new() -> SlotAlloc<T> {
        SlotAlloc { heap: DefaultHeap, _elem: PhantomData }
    }
}

impl<T, A: RawAlloc> SlotAlloc<T, A> {
    /// Creates a typed allocator over the given heap source.
    #[inline]
    pub const fn with_heap(heap: A) -> SlotAlloc<T, A> {
        SlotAlloc { heap, _elem: PhantomData }
    }

    /// A reference to the underlying heap source.
    #[inline]
    pub const fn heap(&self) -> &A {
        &self.heap
    }

    /// Allocates a block of `count` contiguous, uninitialized slots of `T`.
    ///
    /// No constructors run; every slot starts empty. A zero-sized request
    /// (`count == 0`, or a zero-sized `T`) touches no heap and returns a
    /// dangling pointer aligned for `T`, which `deallocate` accepts back as a
    /// no-op.
    ///
    /// Heap exhaustion is not an error the caller sees: it is reported to the
    /// diagnostic stream and the process terminates (see
    /// [`fail_alloc`](crate::error::fail_alloc)). This function never returns
    /// a null or unbacked pointer.
    ///
    /// # Panics
    ///
    /// Panics if `count * size_of::<T>()` overflows the maximum allocation
    /// size, a request no heap could satisfy (see
    /// [`max_count`](SlotAlloc::max_count)).
    #[must_use]
    #[inline]
    pub fn allocate(&self, count: usize) -> NonNull<T> {
        match self.try_allocate(count) {
            Ok(ptr) => ptr,
            Err(AllocError::ZeroSized(ptr)) => ptr.cast(),
            Err(AllocError::Exhausted(layout, _)) => fail_alloc(layout),
            Err(AllocError::LayoutOverflow(count, elem_size)) => {
                panic!("slotmem: {} slots of {} bytes overflow the maximum allocation size", count, elem_size)
            }
        }
    }

    /// Allocates a block for exactly one `T`.
    ///
    /// Equivalent to `allocate(1)`; the common case gets its own name.
    #[must_use]
    #[inline]
    pub fn allocate_one(&self) -> NonNull<T> {
        self.allocate(1)
    }

    /// Attempts to allocate a block of `count` contiguous, uninitialized slots
    /// of `T`.
    ///
    /// # Errors
    ///
    /// - [`AllocError::Exhausted`] if the heap source fails.
    /// - [`AllocError::LayoutOverflow`] if `count * size_of::<T>()` exceeds the
    ///   maximum allocation size.
    /// - [`AllocError::ZeroSized`] for a zero-sized request; the contained
    ///   pointer is dangling and aligned for `T`.
    #[inline]
    pub fn try_allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = array_layout::<T>(count)?;
        if layout.size() == 0 {
            // SAFETY: a type's alignment is always a power of two.
            return Err(AllocError::ZeroSized(unsafe { dangling_nonnull(T::ALIGN) }));
        }
        self.heap.alloc(layout).map(|ptr| ptr.cast())
    }

    /// Releases a block previously obtained from this allocator.
    ///
    /// `count` is accepted for symmetry with [`allocate`](SlotAlloc::allocate)
    /// and must repeat the allocated count; the underlying release mechanism
    /// needs the layout it implies. Zero-sized blocks release as a no-op.
    ///
    /// # Safety
    ///
    /// - `ptr` must be exactly the address returned by a matching `allocate`,
    ///   `allocate_one`, or `try_allocate` call on this allocator, not yet
    ///   released. No sub-block release, no double release, no foreign pointers.
    /// - Every slot in the block must be empty; releasing live slots leaks
    ///   their resources.
    ///
    /// Violations are undefined behavior, not detected errors.
    #[inline]
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        match array_layout::<T>(count) {
            Ok(layout) => self.heap.dealloc(ptr.cast(), layout),
            // a count this size can't have been allocated; nothing to release
            Err(_) => debug_assert!(false, "deallocate count overflows the size arithmetic"),
        }
    }

    /// Releases a block allocated with [`allocate_one`](SlotAlloc::allocate_one).
    ///
    /// # Safety
    ///
    /// Same contract as [`deallocate`](SlotAlloc::deallocate) with a count of 1.
    #[inline]
    pub unsafe fn deallocate_one(&self, ptr: NonNull<T>) {
        self.deallocate(ptr, 1);
    }

    /// The largest `count` the size arithmetic behind
    /// [`allocate`](SlotAlloc::allocate) can represent.
    ///
    /// Informational only: `allocate` does not enforce it up front, it simply
    /// cannot succeed beyond it.
    #[must_use]
    #[inline]
    pub const fn max_count(&self) -> usize {
        T::MAX_SLICE_LEN
    }

    /// The address of a live value, as this allocator's pointer type.
    ///
    /// An identity helper kept for interface completeness.
    #[must_use]
    #[inline]
    pub fn address(&self, value: &mut T) -> NonNull<T> {
        NonNull::from(value)
    }

    /// The address of a live value, as a const pointer.
    ///
    /// An identity helper kept for interface completeness.
    #[must_use]
    #[inline]
    pub fn const_address(&self, value: &T) -> *const T {
        value
    }

    /// Constructs `value` into the empty slot at `dst`.
    ///
    /// # Safety
    ///
    /// See [`lifecycle::construct`].
    #[inline]
    pub unsafe fn construct(&self, dst: NonNull<T>, value: T) {
        lifecycle::construct(dst, value);
    }

    /// Constructs `T`'s default value into the empty slot at `dst`.
    ///
    /// # Safety
    ///
    /// See [`lifecycle::construct_default`].
    #[inline]
    pub unsafe fn construct_default(&self, dst: NonNull<T>)
    where
        T: Default,
    {
        lifecycle::construct_default(dst);
    }

    /// Constructs a clone of `value` into the empty slot at `dst`.
    ///
    /// # Safety
    ///
    /// See [`lifecycle::construct_clone`].
    #[inline]
    pub unsafe fn construct_clone(&self, dst: NonNull<T>, value: &T)
    where
        T: Clone,
    {
        lifecycle::construct_clone(dst, value);
    }

    /// Constructs the result of `make` into the empty slot at `dst`.
    ///
    /// # Safety
    ///
    /// See [`lifecycle::construct_with`].
    #[inline]
    pub unsafe fn construct_with<F: FnOnce() -> T>(&self, dst: NonNull<T>, make: F) {
        lifecycle::construct_with(dst, make);
    }

    /// Destroys the live value at `ptr`; a no-op for types without drop glue.
    ///
    /// # Safety
    ///
    /// See [`lifecycle::destroy`].
    #[inline]
    pub unsafe fn destroy(&self, ptr: NonNull<T>) {
        lifecycle::destroy(ptr);
    }

    /// Destroys every live value in `[first, last)`, in order.
    ///
    /// # Safety
    ///
    /// See [`lifecycle::destroy_range`].
    #[inline]
    pub unsafe fn destroy_range(&self, first: NonNull<T>, last: NonNull<T>) {
        lifecycle::destroy_range(first, last);
    }
}

impl<T> Default for SlotAlloc<T> {
    #[inline]
    fn default() -> SlotAlloc<T> {
        SlotAlloc::new()
    }
}

impl<T, A: RawAlloc + Clone> Clone for SlotAlloc<T, A> {
    #[inline]
    fn clone(&self) -> SlotAlloc<T, A> {
        SlotAlloc::with_heap(self.heap.clone())
    }
}

impl<T, A: RawAlloc + Copy> Copy for SlotAlloc<T, A> {}

impl<T, A: RawAlloc + fmt::Debug> fmt::Debug for SlotAlloc<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotAlloc").field("heap", &self.heap).finish()
    }
}
