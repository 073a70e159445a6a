use core::cell::{Cell, RefCell};
use core::ptr::NonNull;
use slotmem::{lifecycle, type_props::SizedProps, SlotAlloc};

/// Increments a shared tally when dropped, recording its id.
struct Tracked<'a> {
    id: usize,
    drops: &'a Cell<usize>,
    order: &'a RefCell<Vec<usize>>,
}

impl Drop for Tracked<'_> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
        self.order.borrow_mut().push(self.id);
    }
}

#[test]
fn drop_glue_presence_is_a_compile_time_constant() {
    assert!(!<u32 as SizedProps>::NEEDS_DROP);
    assert!(!<[u8; 64] as SizedProps>::NEEDS_DROP);
    assert!(!<&str as SizedProps>::NEEDS_DROP);
    assert!(<String as SizedProps>::NEEDS_DROP);
    assert!(<Tracked<'_> as SizedProps>::NEEDS_DROP);
}

#[test]
fn construct_writes_the_given_value() {
    let alloc: SlotAlloc<u32> = SlotAlloc::new();
    let slot = alloc.allocate_one();
    unsafe {
        lifecycle::construct(slot, 41);
        assert_eq!(*slot.as_ptr(), 41);
        lifecycle::destroy(slot);
        alloc.deallocate_one(slot);
    }
}

#[test]
fn destroy_fires_drop_exactly_once() {
    let drops = Cell::new(0);
    let order = RefCell::new(Vec::new());
    let alloc: SlotAlloc<Tracked<'_>> = SlotAlloc::new();

    let slot = alloc.allocate_one();
    unsafe {
        lifecycle::construct(slot, Tracked { id: 0, drops: &drops, order: &order });
        assert_eq!(drops.get(), 0);
        lifecycle::destroy(slot);
        alloc.deallocate_one(slot);
    }
    assert_eq!(drops.get(), 1);
}

#[test]
fn destroy_range_fires_per_element_in_order() {
    let drops = Cell::new(0);
    let order = RefCell::new(Vec::new());
    let alloc: SlotAlloc<Tracked<'_>> = SlotAlloc::new();

    let count = 5;
    let block = alloc.allocate(count);
    unsafe {
        for id in 0..count {
            lifecycle::construct_with(block.add(id), || Tracked {
                id,
                drops: &drops,
                order: &order,
            });
        }
        lifecycle::destroy_range(block, block.add(count));
        alloc.deallocate(block, count);
    }

    assert_eq!(drops.get(), count);
    assert_eq!(*order.borrow(), [0, 1, 2, 3, 4]);
}

#[test]
fn empty_range_destroys_nothing() {
    let drops = Cell::new(0);
    let order = RefCell::new(Vec::new());
    let alloc: SlotAlloc<Tracked<'_>> = SlotAlloc::new();

    let block = alloc.allocate(4);
    unsafe {
        lifecycle::construct(block, Tracked { id: 9, drops: &drops, order: &order });
        // first == last: nothing in range
        lifecycle::destroy_range(block, block);
        assert_eq!(drops.get(), 0);

        lifecycle::destroy(block);
        alloc.deallocate(block, 4);
    }
    assert_eq!(drops.get(), 1);
}

#[test]
fn destroy_slice_drops_each_element() {
    let drops = Cell::new(0);
    let order = RefCell::new(Vec::new());
    let alloc: SlotAlloc<Tracked<'_>> = SlotAlloc::new();

    let block = alloc.allocate(2);
    unsafe {
        lifecycle::construct(block, Tracked { id: 0, drops: &drops, order: &order });
        lifecycle::construct(block.add(1), Tracked { id: 1, drops: &drops, order: &order });
        lifecycle::destroy_slice(NonNull::slice_from_raw_parts(block, 2));
        alloc.deallocate(block, 2);
    }
    assert_eq!(drops.get(), 2);
    assert_eq!(*order.borrow(), [0, 1]);
}

#[test]
fn construct_clone_leaves_source_untouched() {
    let alloc: SlotAlloc<Vec<u8>> = SlotAlloc::new();
    let source = vec![1, 2, 3];
    let slot = alloc.allocate_one();
    unsafe {
        lifecycle::construct_clone(slot, &source);
        assert_eq!(*slot.as_ptr(), [1, 2, 3]);
        lifecycle::destroy(slot);
        alloc.deallocate_one(slot);
    }
    assert_eq!(source, [1, 2, 3]);
}

#[test]
fn round_trip_leaves_no_outstanding_drops() {
    let drops = Cell::new(0);
    let order = RefCell::new(Vec::new());
    let alloc: SlotAlloc<Tracked<'_>> = SlotAlloc::new();

    let count = 3;
    let block = alloc.allocate(count);
    unsafe {
        for id in 0..count {
            lifecycle::construct(block.add(id), Tracked { id, drops: &drops, order: &order });
        }
        lifecycle::destroy_range(block, block.add(count));
        alloc.deallocate(block, count);
    }
    // every constructed value was destroyed exactly once
    assert_eq!(drops.get(), count);
}
