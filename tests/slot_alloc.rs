use slotmem::{type_props::SizedProps, AllocError, SlotAlloc};

#[test]
fn allocate_construct_read_back_destroy_deallocate() {
    let alloc: SlotAlloc<i32> = SlotAlloc::new();
    let block = alloc.allocate(3);
    unsafe {
        // copy-construct each slot from an existing value
        for (i, value) in [10, 20, 30].iter().enumerate() {
            alloc.construct_clone(block.add(i), value);
        }
        let slice = core::slice::from_raw_parts(block.as_ptr(), 3);
        assert_eq!(slice, [10, 20, 30]);

        // i32 has no drop glue, so this is a no-op, and provably so at compile time
        assert!(!<i32 as SizedProps>::NEEDS_DROP);
        alloc.destroy_range(block, block.add(3));
        assert_eq!(*block.as_ptr(), 10);

        alloc.deallocate(block, 3);
    }
}

#[test]
fn allocate_one_round_trips() {
    let alloc: SlotAlloc<u64> = SlotAlloc::new();
    let slot = alloc.allocate_one();
    unsafe {
        alloc.construct(slot, 0xDEAD_BEEF);
        assert_eq!(*slot.as_ptr(), 0xDEAD_BEEF);
        alloc.destroy(slot);
        alloc.deallocate_one(slot);
    }
}

#[test]
fn many_cycles_do_not_crash() {
    let alloc: SlotAlloc<[u8; 128]> = SlotAlloc::new();
    for count in 1..=64 {
        let block = alloc.allocate(count);
        unsafe {
            block.as_ptr().cast::<u8>().write_bytes(0xCD, count * 128);
            alloc.deallocate(block, count);
        }
    }
}

#[test]
fn zero_count_is_dangling_and_releases_as_noop() {
    let alloc: SlotAlloc<u32> = SlotAlloc::new();
    let ptr = alloc.allocate(0);
    assert_eq!(ptr.as_ptr() as usize, core::mem::align_of::<u32>());
    unsafe {
        alloc.deallocate(ptr, 0);
    }

    match alloc.try_allocate(0) {
        Err(AllocError::ZeroSized(p)) => assert_eq!(p.as_ptr() as usize, 4),
        other => panic!("expected ZeroSized, got {:?}", other),
    }
}

#[test]
fn zero_sized_elements_never_touch_the_heap() {
    let alloc: SlotAlloc<()> = SlotAlloc::new();
    let ptr = alloc.allocate(1000);
    assert_eq!(ptr.as_ptr() as usize, 1);
    unsafe {
        alloc.deallocate(ptr, 1000);
    }
    assert_eq!(alloc.max_count(), usize::MAX);
}

#[test]
fn max_count_reflects_element_size() {
    let ints: SlotAlloc<u32> = SlotAlloc::new();
    assert_eq!(ints.max_count(), (usize::MAX >> 1) / 4);

    let bytes: SlotAlloc<u8> = SlotAlloc::new();
    assert_eq!(bytes.max_count(), usize::MAX >> 1);
}

#[test]
fn try_allocate_rejects_overflowing_counts() {
    let alloc: SlotAlloc<u64> = SlotAlloc::new();
    match alloc.try_allocate(usize::MAX / 2) {
        Err(AllocError::LayoutOverflow(count, elem_size)) => {
            assert_eq!(count, usize::MAX / 2);
            assert_eq!(elem_size, 8);
        }
        other => panic!("expected LayoutOverflow, got {:?}", other),
    }
}

#[test]
#[should_panic(expected = "overflow the maximum allocation size")]
fn allocate_panics_on_overflowing_count() {
    let alloc: SlotAlloc<u64> = SlotAlloc::new();
    let _ = alloc.allocate(usize::MAX / 2);
}

#[test]
fn address_helpers_are_identity() {
    let alloc: SlotAlloc<i32> = SlotAlloc::new();
    let mut value = 7;
    let expected = core::ptr::addr_of!(value) as usize;
    assert_eq!(alloc.address(&mut value).as_ptr() as usize, expected);
    assert_eq!(alloc.const_address(&value) as usize, expected);
}

#[test]
fn construct_matches_direct_construction() {
    let alloc: SlotAlloc<String> = SlotAlloc::new();
    let slot = alloc.allocate_one();
    unsafe {
        alloc.construct_with(slot, || String::from("forwarded"));
        assert_eq!(*slot.as_ptr(), String::from("forwarded"));
        alloc.destroy(slot);

        alloc.construct_default(slot);
        assert_eq!(*slot.as_ptr(), String::new());
        alloc.destroy(slot);

        alloc.deallocate_one(slot);
    }
}
