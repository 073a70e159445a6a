use crate::Layout;
use core::mem::{align_of, needs_drop, size_of};

/// The maximum value of a `usize` with no high bit.
///
/// This is the upper bound on a single allocation's size; it doubles as the
/// numerator of [`MAX_SLICE_LEN`](SizedProps::MAX_SLICE_LEN).
pub const USIZE_MAX_NO_HIGH_BIT: usize = usize::MAX >> 1;

/// A trait containing layout constants for sized types.
pub trait SizedProps: Sized {
    /// The size of the type.
    const SZ: usize = size_of::<Self>();
    /// The alignment of the type.
    const ALIGN: usize = align_of::<Self>();
    /// The memory layout for the type.
    // SAFETY: size and alignment come from the compiler, so the pair is valid.
    const LAYOUT: Layout = unsafe { Layout::from_size_align_unchecked(Self::SZ, Self::ALIGN) };

    /// Whether the type is zero-sized.
    const IS_ZST: bool = Self::SZ == 0;

    /// Whether dropping the type has any observable effect.
    ///
    /// `false` means destruction is a complete no-op and [`lifecycle`](crate::lifecycle)
    /// elides it; `true` means drop glue must run. Resolved per type at compile
    /// time.
    const NEEDS_DROP: bool = needs_drop::<Self>();

    /// The largest safe length for a `[Self]`, and therefore the largest element
    /// count the size arithmetic in [`helpers::array_layout`](crate::helpers::array_layout)
    /// can represent.
    const MAX_SLICE_LEN: usize = match Self::SZ {
        0 => usize::MAX,
        sz => USIZE_MAX_NO_HIGH_BIT / sz,
    };
}

impl<T> SizedProps for T {}
