use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};
use std::any::type_name;
use std::mem::ManuallyDrop;
use std::num::NonZero;
use std::ptr::NonNull;
use std::thread;

use new_zealand::nz;

use crate::ReserveError;

/// Capacity of the first backing region a pool allocates when it was not given
/// a larger hint at construction time. Subsequent regions double in capacity,
/// so the per-region allocation cost is amortized across many acquisitions.
#[cfg(not(miri))]
pub(crate) const FIRST_REGION_CAPACITY: NonZero<usize> = nz!(16);

// Under Miri, we use a smaller region capacity because Miri test runtime scales by memory usage.
#[cfg(miri)]
pub(crate) const FIRST_REGION_CAPACITY: NonZero<usize> = nz!(2);

/// One unit of storage carved out of a pool region, sized and aligned for one `T`.
///
/// A slot is either occupied (a live `T` written by the owning handle) or vacant,
/// in which case its bytes store the address of the next vacant slot. The pool
/// itself never constructs or destroys a `T`; it only tracks vacancy, which is
/// why the occupied variant is wrapped in `ManuallyDrop`.
#[repr(C)]
pub(crate) union Slot<T> {
    #[allow(
        dead_code,
        reason = "occupied slots are accessed through a cast to T, never through the field"
    )]
    value: ManuallyDrop<T>,
    next_free: Option<NonNull<Slot<T>>>,
}

/// One contiguous system allocation from which slots are carved.
///
/// Regions are only ever deallocated when the pool itself is dropped. This is
/// what makes slot addresses stable: recycling happens through the free list,
/// never through the system allocator.
#[derive(Debug)]
struct Region<T> {
    first_slot_ptr: NonNull<Slot<T>>,

    capacity: NonZero<usize>,
}

impl<T> Region<T> {
    fn layout(capacity: NonZero<usize>) -> Result<Layout, ReserveError> {
        // A `Slot` is never zero-sized because the vacant variant stores a pointer,
        // so this layout is always valid to allocate.
        Layout::array::<Slot<T>>(capacity.get()).map_err(|_| ReserveError::CapacityOverflow)
    }

    fn allocate(capacity: NonZero<usize>) -> Result<Self, ReserveError> {
        let layout = Self::layout(capacity)?;

        // SAFETY: The layout is non-zero-sized (a slot is at least pointer-sized).
        let first_slot_ptr = NonNull::new(unsafe { alloc(layout) }.cast::<Slot<T>>())
            .ok_or(ReserveError::OutOfMemory {
                bytes: layout.size(),
            })?;

        Ok(Self {
            first_slot_ptr,
            capacity,
        })
    }

    /// # Safety
    ///
    /// The caller must ensure `index < self.capacity`.
    unsafe fn slot_ptr(&self, index: usize) -> NonNull<Slot<T>> {
        // SAFETY: Guarded by the caller, so the pointer stays within the region.
        unsafe { self.first_slot_ptr.add(index) }
    }
}

impl<T> Drop for Region<T> {
    fn drop(&mut self) {
        let layout = Self::layout(self.capacity)
            .expect("the layout was calculable when the region was allocated");

        // SAFETY: The layout must match between alloc and dealloc. It does.
        unsafe {
            dealloc(self.first_slot_ptr.as_ptr().cast(), layout);
        }
    }
}

/// The slot allocator backing a pool handle.
///
/// Hands out fixed addresses for one `T` each and takes them back for reuse,
/// going to the system allocator only when every existing slot is occupied.
/// Vacant slots form an intrusive free list: each stores the address of the
/// next vacant slot in its own bytes, so acquisition and release are a pointer
/// swap regardless of how many regions exist.
///
/// The allocator neither constructs nor destroys `T`. Whoever acquires a slot
/// is responsible for initializing it before reading it and for destroying the
/// value before releasing the slot.
#[derive(Debug)]
pub(crate) struct RawSlotPool<T> {
    /// Every backing region we have allocated, in allocation order. Regions are
    /// never removed before the pool is dropped - we made a promise of address
    /// stability to every issued slot.
    regions: Vec<Region<T>>,

    /// Head of the free list threaded through the vacant slots of all regions.
    /// `None` means every slot is occupied and the next acquisition grows the pool.
    free_head: Option<NonNull<Slot<T>>>,

    /// The number of slots currently issued (acquired and not yet released).
    len: usize,

    /// Capacity of the next region we will allocate. Doubles on every growth.
    next_region_capacity: NonZero<usize>,
}

impl<T> RawSlotPool<T> {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            regions: Vec::new(),
            free_head: None,
            len: 0,
            next_region_capacity: FIRST_REGION_CAPACITY,
        }
    }

    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.regions
            .iter()
            .map(|region| region.capacity.get())
            .sum()
    }

    /// Hands out a vacant slot, growing the pool if every slot is occupied.
    ///
    /// The returned storage is uninitialized; the caller must write a `T` into it
    /// before reading it through the slot address.
    pub(crate) fn acquire(&mut self) -> NonNull<Slot<T>> {
        if self.free_head.is_none() {
            self.reserve(1);
        }

        let slot = self
            .free_head
            .expect("pool growth guarantees at least one vacant slot");

        // SAFETY: The slot is on the free list, so it is vacant, and vacant slots
        // always hold an initialized free-list link.
        let next = unsafe { slot.as_ref().next_free };
        self.free_head = next;

        self.len = self
            .len
            .checked_add(1)
            .expect("the pool cannot issue more slots than fit in virtual memory");

        slot
    }

    /// Returns a slot to the free list for reuse.
    ///
    /// No memory is returned to the system allocator; the slot's address may be
    /// handed out again by a later [`acquire()`](Self::acquire).
    ///
    /// # Safety
    ///
    /// The caller must ensure that the slot was issued by this pool, that it is
    /// released at most once, and that any value written into it has already
    /// been destroyed or moved out.
    pub(crate) unsafe fn release(&mut self, mut slot: NonNull<Slot<T>>) {
        // SAFETY: The slot came from one of our live regions, so the pointer is
        // valid, and the caller guarantees no live value remains in it.
        let slot_ref = unsafe { slot.as_mut() };
        slot_ref.next_free = self.free_head;

        self.free_head = Some(slot);

        self.len = self
            .len
            .checked_sub(1)
            .expect("released more slots than were ever acquired");
    }

    /// Ensures there are vacant slots for at least `additional` more acquisitions.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity overflows; aborts via
    /// [`handle_alloc_error`] if the system allocator fails.
    pub(crate) fn reserve(&mut self, additional: usize) {
        match self.try_reserve(additional) {
            Ok(()) => {}
            Err(ReserveError::OutOfMemory { bytes }) => {
                let layout = Layout::from_size_align(bytes, align_of::<Slot<T>>())
                    .expect("the layout was calculable when the allocation was attempted");
                handle_alloc_error(layout);
            }
            Err(err) => panic!(
                "failed to reserve {additional} slots in a pool of {}: {err}",
                type_name::<T>()
            ),
        }
    }

    /// Fallible form of [`reserve()`](Self::reserve). On error the pool is left
    /// exactly as it was before the call.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(ReserveError::CapacityOverflow)?;

        let capacity = self.capacity();

        if capacity >= required {
            return Ok(());
        }

        let shortfall = required
            .checked_sub(capacity)
            .expect("guarded by the capacity comparison above");

        let region_capacity = NonZero::new(shortfall)
            .expect("guarded by the capacity comparison above")
            .max(self.next_region_capacity);

        self.grow(region_capacity)
    }

    /// Allocates one new region and threads all of its slots onto the free list.
    fn grow(&mut self, region_capacity: NonZero<usize>) -> Result<(), ReserveError> {
        // Reserve the region table entry first so nothing below can fail after
        // the region exists.
        self.regions.try_reserve(1)?;

        let region = Region::allocate(region_capacity)?;

        let last_index = region_capacity
            .get()
            .checked_sub(1)
            .expect("a region capacity is non-zero");

        for index in 0..region_capacity.get() {
            let next = if index == last_index {
                self.free_head
            } else {
                // SAFETY: `index + 1 <= last_index < capacity`.
                Some(unsafe {
                    region.slot_ptr(
                        index
                            .checked_add(1)
                            .expect("guarded by the last_index comparison above"),
                    )
                })
            };

            // SAFETY: `index < capacity`.
            let slot = unsafe { region.slot_ptr(index) };

            // SAFETY: Freshly allocated storage within the region, valid for writes.
            unsafe {
                slot.as_ptr().write(Slot { next_free: next });
            }
        }

        self.free_head = Some(region.first_slot_ptr);
        self.regions.push(region);

        self.next_region_capacity = region_capacity.saturating_mul(nz!(2));

        Ok(())
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        let capacity = self.capacity();

        let expected_vacant = capacity
            .checked_sub(self.len)
            .expect("more slots issued than the regions can hold");

        let mut observed_vacant: usize = 0;
        let mut cursor = self.free_head;

        while let Some(slot) = cursor {
            observed_vacant = observed_vacant
                .checked_add(1)
                .expect("free list is longer than total capacity, must be a cycle");

            assert!(
                observed_vacant <= capacity,
                "free list of a pool of {} is longer than its capacity",
                type_name::<T>()
            );

            // SAFETY: Every slot on the free list is vacant and holds a link.
            cursor = unsafe { slot.as_ref().next_free };
        }

        assert!(
            observed_vacant == expected_vacant,
            "free list of a pool of {} has {} slots but {} were expected",
            type_name::<T>(),
            observed_vacant,
            expected_vacant
        );
    }
}

impl<T> Drop for RawSlotPool<T> {
    fn drop(&mut self) {
        // If we are already panicking, we do not want to panic again because that
        // will simply obscure whatever the original panic was.
        if !thread::panicking() {
            debug_assert!(
                self.len == 0,
                "dropped a slot pool of {} with {} slots still issued",
                type_name::<T>(),
                self.len
            );
        }
    }
}
