use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::raw_pool::{RawSlotPool, Slot};
use crate::{ReserveError, SlotBox, SlotPoolBuilder};

/// A single-threaded pooled slot allocator for values of type `T`.
///
/// The pool carves fixed-size slots out of larger backing regions and recycles
/// released slots through a free list, so repeated insertion and removal does
/// not go back to the system allocator. A slot's address never changes while
/// its value is alive, and backing regions are only released when the pool
/// itself is dropped.
///
/// This type is a cloneable handle to a shared pool instance. Every
/// [`SlotBox`] issued by the pool holds one such handle, which is what
/// guarantees that the pool outlives every slot it has issued.
///
/// # Single-threaded design
///
/// This type is designed for single-threaded use and is neither [`Send`] nor
/// [`Sync`]. Sharing a pool across threads requires external synchronization
/// by design, so the type simply does not permit it.
///
/// # Example
///
/// ```rust
/// use stable_vec::SlotPool;
///
/// let pool = SlotPool::<String>::new();
///
/// let greeting = pool.insert("hello".to_string());
/// let farewell = pool.insert("goodbye".to_string());
///
/// assert_eq!(*greeting, "hello");
/// assert_eq!(pool.len(), 2);
///
/// drop(farewell);
/// assert_eq!(pool.len(), 1);
/// ```
#[derive(Debug)]
pub struct SlotPool<T> {
    /// The shared pool instance protected by a `RefCell` for single-threaded
    /// interior mutability.
    inner: Rc<RefCell<RawSlotPool<T>>>,
}

impl<T> SlotPool<T> {
    /// Creates a new empty pool with the default configuration.
    ///
    /// The pool allocates its first backing region lazily, on the first insert.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u64>::new();
    ///
    /// assert_eq!(pool.len(), 0);
    /// assert_eq!(pool.capacity(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new pool that can hold at least `capacity` values before
    /// allocating another backing region.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u64>::with_capacity(100);
    ///
    /// assert!(pool.capacity() >= 100);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().initial_capacity(capacity).build()
    }

    /// Starts building a new pool.
    ///
    /// Use this when you want to customize the pool configuration beyond the
    /// defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u64>::builder().initial_capacity(32).build();
    ///
    /// assert!(pool.capacity() >= 32);
    /// ```
    pub fn builder() -> SlotPoolBuilder<T> {
        SlotPoolBuilder::new()
    }

    pub(crate) fn from_raw(raw: RawSlotPool<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(raw)),
        }
    }

    /// Inserts a value into the pool and returns the handle that owns it.
    ///
    /// The value is moved into a freshly acquired slot; its address is fixed
    /// from this point until the handle is dropped or the value is moved out
    /// via [`SlotBox::into_inner()`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<String>::new();
    /// let value_handle = pool.insert("hello".to_string());
    ///
    /// assert_eq!(*value_handle, "hello");
    /// ```
    pub fn insert(&self, value: T) -> SlotBox<T> {
        let slot = self.inner.borrow_mut().acquire();
        let ptr = slot.cast::<T>();

        // SAFETY: A freshly acquired slot is sized and aligned for one `T` and
        // holds no value; initializing it is the acquisition contract.
        unsafe {
            ptr.write(value);
        }

        SlotBox::new(ptr, self.clone())
    }

    /// The number of values currently stored in slots of this pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u64>::new();
    /// assert_eq!(pool.len(), 0);
    ///
    /// let _item = pool.insert(42);
    /// assert_eq!(pool.len(), 1);
    /// ```
    #[must_use]
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Whether the pool currently stores no values.
    ///
    /// An empty pool may still be holding backing regions for reuse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of values the pool can hold without allocating another
    /// backing region.
    ///
    /// Capacity only ever grows: released slots are recycled and regions are
    /// kept until the pool itself is dropped.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity()
    }

    /// Ensures there is room for at least `additional` more values without
    /// another backing region allocation.
    ///
    /// # Panics
    ///
    /// Panics if the required capacity overflows `usize`; aborts if the system
    /// allocator fails.
    pub fn reserve(&self, additional: usize) {
        self.inner.borrow_mut().reserve(additional);
    }

    /// Fallible form of [`reserve()`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns an error if the required capacity overflows or the system
    /// allocator declines the region allocation. The pool is left exactly as
    /// it was before the call.
    pub fn try_reserve(&self, additional: usize) -> Result<(), ReserveError> {
        self.inner.borrow_mut().try_reserve(additional)
    }

    /// Whether two pool handles refer to the same pool instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a slot to the pool for reuse.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the slot was issued by this pool, that it is
    /// released at most once, and that the value written into it has already
    /// been destroyed or moved out.
    pub(crate) unsafe fn release(&self, slot: NonNull<Slot<T>>) {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe {
            self.inner.borrow_mut().release(slot);
        }
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        self.inner.borrow().integrity_check();
    }
}

impl<T> Clone for SlotPool<T> {
    /// Creates another handle to the same pool instance.
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for SlotPool<T> {
    /// Creates a new empty pool with the default configuration.
    fn default() -> Self {
        Self::new()
    }
}
