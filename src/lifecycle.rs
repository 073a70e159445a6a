//! Construction and destruction of values in caller-owned memory.
//!
//! Every function here operates on a slot: memory sized and aligned for exactly
//! one `T`, tracked by the caller as either *empty* or *live*. `construct`-family
//! functions take an empty slot to live; `destroy`-family functions take a live
//! slot back to empty. Nothing here allocates, deallocates, or retains a
//! reference; pairing these calls with a memory source is the caller's job,
//! and invoking either family from the wrong slot state is undefined behavior,
//! not a detected error.
//!
//! Destruction is elided for types without drop glue: the
//! [`needs_drop`](core::mem::needs_drop) query is resolved per type at compile
//! time, so for trivially destructible element types every `destroy` call in a
//! generic code path folds to nothing. For ranges the decision is made once up
//! front rather than per element.
//!
//! None of these functions report errors. A panic out of a value expression,
//! closure, or `clone` propagates unchanged; already-constructed elements stay
//! live and are the caller's to destroy (see
//! [`RangeGuard`](crate::helpers::RangeGuard) for the RAII way to hold that
//! obligation).

use core::{
    mem::needs_drop,
    ptr::{self, NonNull},
};

/// Constructs `value` into the empty slot at `dst`, making it live.
///
/// The value is moved into place; no copy of it exists elsewhere afterward.
/// This is the receiving end of argument forwarding: build the value in the
/// call expression and it is assembled directly in the slot.
///
/// # Safety
///
/// - `dst` must be valid, writable, and aligned for one `T`.
/// - The slot must be empty; constructing over a live value leaks it (and is a
///   contract violation, not an error).
#[inline]
pub unsafe fn construct<T>(dst: NonNull<T>, value: T) {
    ptr::write(dst.as_ptr(), value);
}

/// Constructs `T`'s default value into the empty slot at `dst`.
///
/// # Safety
///
/// Same contract as [`construct`].
#[inline]
pub unsafe fn construct_default<T: Default>(dst: NonNull<T>) {
    construct(dst, T::default());
}

/// Constructs a clone of `value` into the empty slot at `dst`.
///
/// A panicking `clone` propagates unchanged and leaves the slot empty.
///
/// # Safety
///
/// Same contract as [`construct`]; additionally, `dst` must not overlap `value`.
#[inline]
pub unsafe fn construct_clone<T: Clone>(dst: NonNull<T>, value: &T) {
    construct(dst, value.clone());
}

/// Constructs the result of `make` into the empty slot at `dst`.
///
/// Useful when the value's construction should be deferred until the slot is
/// known good; a panicking `make` propagates unchanged and leaves the slot
/// empty.
///
/// # Safety
///
/// Same contract as [`construct`].
#[inline]
pub unsafe fn construct_with<T, F: FnOnce() -> T>(dst: NonNull<T>, make: F) {
    construct(dst, make());
}

/// Destroys the live value at `ptr`, making the slot empty.
///
/// For types without drop glue this compiles to nothing: the check is a
/// compile-time constant, and no call or branch survives into generic code
/// instantiated with such types. For all other types, the value's destructor
/// runs exactly once.
///
/// # Safety
///
/// - `ptr` must point to a live `T` in a valid slot.
/// - The value must not be used, or destroyed again, afterward.
#[inline]
pub unsafe fn destroy<T>(ptr: NonNull<T>) {
    if needs_drop::<T>() {
        ptr::drop_in_place(ptr.as_ptr());
    }
}

/// Destroys every live value in the half-open range `[first, last)`, in order
/// from `first` to `last`.
///
/// The drop-glue decision is made once for the whole range; for trivially
/// destructible element types the entire call folds to nothing regardless of
/// range length. An empty range (`first == last`) destroys nothing.
///
/// For zero-sized `T` a pointer pair cannot encode a length, so the range is
/// treated as empty; use [`destroy_slice`] where a count of zero-sized live
/// values must be dropped.
///
/// # Safety
///
/// - `first` and `last` must be derived from the same block, with `first <= last`.
/// - Every slot in the range must be live.
/// - The values must not be used, or destroyed again, afterward.
#[inline]
pub unsafe fn destroy_range<T>(first: NonNull<T>, last: NonNull<T>) {
    if !needs_drop::<T>() || core::mem::size_of::<T>() == 0 {
        return;
    }
    debug_assert!(first.as_ptr() <= last.as_ptr(), "destroy_range bounds are reversed");
    // the cast holds: first <= last per contract, so the offset is non-negative
    #[allow(clippy::cast_sign_loss)]
    let len = last.as_ptr().offset_from(first.as_ptr()) as usize;
    ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first.as_ptr(), len));
}

/// Destroys every live value in `slice`, front to back.
///
/// Identical to [`destroy_range`] with the length carried explicitly, which
/// also makes it exact for zero-sized element types.
///
/// # Safety
///
/// - Every slot in `slice` must be live.
/// - The values must not be used, or destroyed again, afterward.
#[inline]
pub unsafe fn destroy_slice<T>(slice: NonNull<[T]>) {
    if !needs_drop::<T>() {
        return;
    }
    ptr::drop_in_place(slice.as_ptr());
}
