use crate::{AllocError, Layout, RawAlloc};
use alloc::{boxed::Box, rc::Rc, sync::Arc};
use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    ptr::NonNull,
    sync::atomic::{
        AtomicUsize,
        Ordering::{AcqRel, Acquire},
    },
};

/// A wrapper that delegates all [`RawAlloc`] calls to `A` and logs each result
/// via `L`.
///
/// The wrapper adds no synchronization to the allocator itself; loggers keep
/// their own state coherent.
pub struct Stats<A, L: StatsLogger>(pub A, pub L);

impl<A, L: StatsLogger> Stats<A, L> {
    /// Creates a new stats-collecting wrapper around a heap source.
    #[inline]
    pub const fn new(heap: A, logger: L) -> Stats<A, L> {
        Stats(heap, logger)
    }
}

/// A sink for allocation events and a running byte total.
///
/// The byte total is the external memory-accounting hook: after every block
/// allocated has been released, [`total_bytes`](StatsLogger::total_bytes)
/// reads zero.
pub trait StatsLogger {
    /// Records one allocation event.
    fn log(&self, event: AllocEvent);

    /// Adds `bytes` to the running total and returns the new total.
    fn inc_total_bytes(&self, bytes: usize) -> usize;

    /// Subtracts `bytes` from the running total and returns the new total.
    fn dec_total_bytes(&self, bytes: usize) -> usize;

    /// The number of bytes currently allocated.
    fn total_bytes(&self) -> usize;
}

// no-op logger
impl StatsLogger for () {
    fn log(&self, _event: AllocEvent) {}
    fn inc_total_bytes(&self, _bytes: usize) -> usize {
        0
    }
    fn dec_total_bytes(&self, _bytes: usize) -> usize {
        0
    }
    fn total_bytes(&self) -> usize {
        0
    }
}

// byte counter-only logger (no event record)
impl StatsLogger for AtomicUsize {
    fn log(&self, _event: AllocEvent) {}

    #[inline]
    fn inc_total_bytes(&self, bytes: usize) -> usize {
        self.fetch_add(bytes, AcqRel) + bytes
    }

    #[inline]
    fn dec_total_bytes(&self, bytes: usize) -> usize {
        self.fetch_sub(bytes, AcqRel) - bytes
    }

    #[inline]
    fn total_bytes(&self) -> usize {
        self.load(Acquire)
    }
}

/// Delegate all calls to the inner logger.
macro_rules! delegate_logger {
    ($ty:ty) => {
        impl<L: StatsLogger + ?Sized> StatsLogger for $ty {
            fn log(&self, event: AllocEvent) {
                (**self).log(event);
            }
            fn inc_total_bytes(&self, bytes: usize) -> usize {
                (**self).inc_total_bytes(bytes)
            }
            fn dec_total_bytes(&self, bytes: usize) -> usize {
                (**self).dec_total_bytes(bytes)
            }
            fn total_bytes(&self) -> usize {
                (**self).total_bytes()
            }
        }
    };
}

delegate_logger!(&L);
delegate_logger!(&mut L);
delegate_logger!(Box<L>);
delegate_logger!(Rc<L>);
delegate_logger!(Arc<L>);

/// One observed allocator operation.
#[derive(Debug, Copy, Clone)]
pub enum AllocEvent {
    /// An allocation succeeded.
    Alloc {
        /// The block's address.
        ptr: NonNull<u8>,
        /// The block's layout.
        layout: Layout,
        /// Whether the block was zeroed.
        zeroed: bool,
    },
    /// An allocation failed.
    Failed {
        /// The rejected layout.
        layout: Layout,
        /// The failure.
        err: AllocError,
    },
    /// A block was released.
    Dealloc {
        /// The block's address.
        ptr: NonNull<u8>,
        /// The block's layout.
        layout: Layout,
    },
}

impl Display for AllocEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AllocEvent::Alloc { ptr, layout, zeroed } => {
                write!(
                    f,
                    "alloc{}: {} bytes (align {}) at {:p}",
                    if *zeroed { " (zeroed)" } else { "" },
                    layout.size(),
                    layout.align(),
                    ptr.as_ptr()
                )
            }
            AllocEvent::Failed { layout, err } => {
                write!(f, "alloc failed: {} bytes (align {}): {}", layout.size(), layout.align(), err)
            }
            AllocEvent::Dealloc { ptr, layout } => {
                write!(
                    f,
                    "dealloc: {} bytes (align {}) at {:p}",
                    layout.size(),
                    layout.align(),
                    ptr.as_ptr()
                )
            }
        }
    }
}

impl<A: RawAlloc, L: StatsLogger> Stats<A, L> {
    fn record_alloc(
        &self,
        res: Result<NonNull<u8>, AllocError>,
        layout: Layout,
        zeroed: bool,
    ) -> Result<NonNull<u8>, AllocError> {
        match res {
            Ok(ptr) => {
                self.1.inc_total_bytes(layout.size());
                self.1.log(AllocEvent::Alloc { ptr, layout, zeroed });
                Ok(ptr)
            }
            Err(err) => {
                self.1.log(AllocEvent::Failed { layout, err });
                Err(err)
            }
        }
    }
}

impl<A: RawAlloc, L: StatsLogger> RawAlloc for Stats<A, L> {
    #[inline]
    fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.record_alloc(self.0.alloc(layout), layout, false)
    }

    #[inline]
    fn zalloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.record_alloc(self.0.zalloc(layout), layout, true)
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) {
        self.0.dealloc(ptr, layout);
        if layout.size() != 0 {
            self.1.dec_total_bytes(layout.size());
            self.1.log(AllocEvent::Dealloc { ptr, layout });
        }
    }
}

#[cfg(feature = "std")]
pub use io_log::IOLog;

#[cfg(feature = "std")]
mod io_log {
    use super::{AllocEvent, StatsLogger};
    use core::sync::atomic::AtomicUsize;
    use std::io::Write;

    #[cfg(feature = "stats_parking_lot")]
    use parking_lot::Mutex;
    #[cfg(not(feature = "stats_parking_lot"))]
    use std::sync::Mutex;

    /// A logger that writes each event as a line to a [`Write`] target and keeps
    /// a byte total.
    pub struct IOLog<W: Write> {
        buf: Mutex<W>,
        total: AtomicUsize,
    }

    impl<W: Write> IOLog<W> {
        /// Creates a logger writing to `writer`.
        pub fn new(writer: W) -> IOLog<W> {
            IOLog { buf: Mutex::new(writer), total: AtomicUsize::new(0) }
        }

        /// Consumes the logger and returns the writer.
        ///
        /// # Panics
        ///
        /// Panics if the writer lock was poisoned.
        pub fn into_writer(self) -> W {
            #[cfg(feature = "stats_parking_lot")]
            {
                self.buf.into_inner()
            }
            #[cfg(not(feature = "stats_parking_lot"))]
            {
                self.buf.into_inner().expect("stats writer lock was poisoned")
            }
        }
    }

    impl<W: Write> StatsLogger for IOLog<W> {
        fn log(&self, event: AllocEvent) {
            #[cfg(feature = "stats_parking_lot")]
            let mut writer = self.buf.lock();
            #[cfg(not(feature = "stats_parking_lot"))]
            let mut writer = self.buf.lock().expect("stats writer lock was poisoned");

            writeln!(writer, "{}", event).expect("failed to write to the stats writer");
        }

        fn inc_total_bytes(&self, bytes: usize) -> usize {
            StatsLogger::inc_total_bytes(&self.total, bytes)
        }

        fn dec_total_bytes(&self, bytes: usize) -> usize {
            StatsLogger::dec_total_bytes(&self.total, bytes)
        }

        fn total_bytes(&self) -> usize {
            StatsLogger::total_bytes(&self.total)
        }
    }
}
