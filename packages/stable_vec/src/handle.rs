use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::SlotPool;

/// The sole owner of one pool slot and the value stored in it.
///
/// A `SlotBox<T>` is similar to a `Box<T>` whose storage comes from a
/// [`SlotPool`] instead of the system allocator. The value's address is fixed
/// for the handle's entire lifetime: no operation on the pool, on any
/// container holding the handle, or on other handles can move the value.
/// Moving the *handle* transfers ownership of the slot address; the value
/// itself stays put.
///
/// Dropping the handle destroys the value and returns the slot to the pool
/// for reuse. The handle holds a pool reference internally, so the pool
/// cannot be dropped while any of its slots are still owned.
///
/// # Duplication, not aliasing
///
/// Two handles never refer to the same slot. [`Clone`] therefore does not
/// share: it acquires a fresh slot from the same pool and clones the value
/// into it, producing an equal value at a different address.
///
/// ```rust
/// use stable_vec::SlotPool;
///
/// let pool = SlotPool::<String>::new();
///
/// let original = pool.insert("hello".to_string());
/// let duplicate = original.clone();
///
/// assert_eq!(*original, *duplicate);
/// assert_ne!(original.ptr(), duplicate.ptr());
/// ```
pub struct SlotBox<T> {
    /// Address of the value inside the pool slot. Valid for the lifetime of
    /// the handle; the handle is the only owner of the slot.
    ptr: NonNull<T>,

    /// A handle to the pool that issued the slot. Keeps the pool alive and is
    /// the channel through which the slot is eventually released.
    pool: SlotPool<T>,
}

impl<T> SlotBox<T> {
    pub(crate) fn new(ptr: NonNull<T>, pool: SlotPool<T>) -> Self {
        Self { ptr, pool }
    }

    /// Returns a pointer to the stored value.
    ///
    /// The pointer stays valid until this handle is dropped or consumed,
    /// regardless of what happens to any container holding the handle. The
    /// caller must respect Rust's aliasing rules when dereferencing it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u64>::new();
    /// let value_handle = pool.insert(42);
    ///
    /// let ptr = value_handle.ptr();
    ///
    /// // SAFETY: The handle is alive, so the pointer is valid for reads.
    /// let value = unsafe { ptr.read() };
    /// assert_eq!(value, 42);
    /// ```
    #[must_use]
    #[inline]
    pub fn ptr(&self) -> NonNull<T> {
        self.ptr
    }

    /// The pool this handle's slot was issued by.
    #[must_use]
    pub fn pool(&self) -> &SlotPool<T> {
        &self.pool
    }

    /// Consumes the handle, moving the value out and releasing the slot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<String>::new();
    /// let value_handle = pool.insert("hello".to_string());
    ///
    /// let value = value_handle.into_inner();
    /// assert_eq!(value, "hello");
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn into_inner(self) -> T {
        let this = ManuallyDrop::new(self);

        // SAFETY: The slot holds an initialized value and we suppress the
        // regular drop below, so the value is read out exactly once.
        let value = unsafe { this.ptr.read() };

        // SAFETY: The slot was issued by this pool and its value was just
        // moved out.
        unsafe {
            this.pool.release(this.ptr.cast());
        }

        // SAFETY: We own `self` and `ManuallyDrop` prevents the field from
        // being dropped twice; moving the pool handle out here releases our
        // claim on the pool's lifetime.
        drop(unsafe { ptr::read(&raw const this.pool) });

        value
    }
}

impl<T: Clone> Clone for SlotBox<T> {
    /// Duplicates the value into a freshly acquired slot of the same pool.
    ///
    /// The result compares equal to the original (for well-behaved `Clone`
    /// implementations) but occupies a different address; the two handles are
    /// entirely independent afterwards.
    fn clone(&self) -> Self {
        self.pool.insert((**self).clone())
    }
}

impl<T> Deref for SlotBox<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: The slot holds an initialized value for the lifetime of the
        // handle, and we are its only owner.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for SlotBox<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: As in `deref`, plus we hold the only handle to the slot and
        // have it borrowed exclusively, so no aliasing reference can exist.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for SlotBox<T> {
    /// Destroys the value and returns the slot to the pool.
    fn drop(&mut self) {
        // SAFETY: We are the sole owner of the slot and the value in it is
        // initialized.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
        }

        // SAFETY: The slot was issued by this pool, is released exactly once,
        // and its value was destroyed above.
        unsafe {
            self.pool.release(self.ptr.cast());
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SlotBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotBox")
            .field("value", &**self)
            .field("ptr", &self.ptr)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn deref_reads_the_value() {
        let pool = SlotPool::<String>::new();

        let value_handle = pool.insert("hello".to_string());

        assert_eq!(*value_handle, "hello");
        assert_eq!(value_handle.len(), 5);
    }

    #[test]
    fn deref_mut_modifies_in_place() {
        let pool = SlotPool::<String>::new();

        let mut value_handle = pool.insert("hello".to_string());
        let address_before = value_handle.ptr();

        value_handle.push_str(", world");

        assert_eq!(*value_handle, "hello, world");
        assert_eq!(value_handle.ptr(), address_before);
    }

    #[test]
    fn clone_duplicates_into_new_slot() {
        let pool = SlotPool::<String>::new();

        let original = pool.insert("hello".to_string());
        let mut duplicate = original.clone();

        assert_eq!(*original, *duplicate);
        assert_ne!(original.ptr(), duplicate.ptr());
        assert!(original.pool().ptr_eq(duplicate.pool()));

        // The duplicate is fully independent of the original.
        duplicate.push_str(", world");
        assert_eq!(*original, "hello");
        assert_eq!(*duplicate, "hello, world");
    }

    #[test]
    fn into_inner_releases_the_slot() {
        let pool = SlotPool::<String>::new();

        let value_handle = pool.insert("hello".to_string());
        let address = value_handle.ptr();

        let value = value_handle.into_inner();
        assert_eq!(value, "hello");
        assert!(pool.is_empty());

        // The vacated slot is the first one handed out again.
        let value_handle = pool.insert("reused".to_string());
        assert_eq!(value_handle.ptr(), address);
    }

    #[test]
    fn drop_destroys_the_value() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let pool = SlotPool::<Droppable>::new();

        let value_handle = pool.insert(Droppable {
            dropped: Rc::clone(&dropped),
        });

        assert!(!dropped.get());
        drop(value_handle);
        assert!(dropped.get());
        assert!(pool.is_empty());
    }

    #[test]
    fn into_inner_does_not_destroy_the_value() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let pool = SlotPool::<Droppable>::new();

        let value_handle = pool.insert(Droppable {
            dropped: Rc::clone(&dropped),
        });

        let value = value_handle.into_inner();
        assert!(!dropped.get());

        drop(value);
        assert!(dropped.get());
    }

    #[test]
    fn address_survives_handle_moves() {
        let pool = SlotPool::<String>::new();

        let value_handle = pool.insert("anchored".to_string());
        let address = value_handle.ptr();

        // Moving the handle around moves only the slot address, not the value.
        let moved = value_handle;
        let mut relocated_handles = vec![moved];
        let value_handle = relocated_handles.pop().expect("just pushed");

        assert_eq!(value_handle.ptr(), address);
        assert_eq!(*value_handle, "anchored");
    }
}
