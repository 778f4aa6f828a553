use std::any::type_name;

use crate::sealed::Sealed;
use crate::{IntoIter, Iter, IterMut, ReserveError, SlotBox, SlotPool, Storage};

/// The pooled storage strategy: elements live in fixed slots, the sequence
/// holds handles.
///
/// Growing, shrinking or reordering the sequence moves only the handles (one
/// slot address each), never the elements, which is what makes element
/// addresses stable across every capacity change. This is the default
/// strategy of [`StableVec`][crate::StableVec].
#[derive(Debug)]
pub struct Slotted<T> {
    /// The element sequence. This is the only thing that is ever reallocated;
    /// each entry is a slot address, cheap to move regardless of `T`.
    handles: Vec<SlotBox<T>>,

    /// The pool all slots are carved from. Shared with every handle, so it
    /// lives until the last element is gone.
    pool: SlotPool<T>,
}

impl<T> Sealed for Slotted<T> {}

impl<T> Storage<T> for Slotted<T> {
    type Iter<'a>
        = Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    type IterMut<'a>
        = IterMut<'a, T>
    where
        Self: 'a,
        T: 'a;

    type IntoIter = IntoIter<T>;

    fn new() -> Self {
        Self {
            handles: Vec::new(),
            pool: SlotPool::new(),
        }
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            handles: Vec::with_capacity(capacity),
            pool: SlotPool::with_capacity(capacity),
        }
    }

    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    fn len(&self) -> usize {
        self.handles.len()
    }

    fn capacity(&self) -> usize {
        self.handles.capacity()
    }

    #[allow(
        clippy::integer_division,
        reason = "truncation toward zero is the correct rounding for a count bound"
    )]
    fn max_len() -> usize {
        // The handle sequence is the binding constraint: it is one contiguous
        // allocation and such an allocation cannot exceed isize::MAX bytes.
        usize::try_from(isize::MAX).expect("isize::MAX always fits in usize")
            / size_of::<SlotBox<T>>()
    }

    fn reserve(&mut self, additional: usize) {
        self.handles.reserve(additional);
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        self.handles
            .try_reserve(additional)
            .map_err(ReserveError::from)
    }

    fn shrink_to_fit(&mut self) {
        // Only the handle sequence shrinks. The pool keeps its regions - we
        // made an address-stability promise for the elements still in it, and
        // vacated slots are kept ready for reuse.
        self.handles.shrink_to_fit();
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.handles.get(index).map(|handle| &**handle)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.handles.get_mut(index).map(|handle| &mut **handle)
    }

    fn push(&mut self, value: T) {
        let handle = self.pool.insert(value);
        self.handles.push(handle);
    }

    fn insert(&mut self, index: usize, value: T) {
        assert!(
            index <= self.handles.len(),
            "insert index {index} is out of bounds in a sequence of {} with length {}",
            type_name::<T>(),
            self.handles.len()
        );

        let handle = self.pool.insert(value);
        self.handles.insert(index, handle);
    }

    fn insert_many<I>(&mut self, index: usize, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        assert!(
            index <= self.handles.len(),
            "insert index {index} is out of bounds in a sequence of {} with length {}",
            type_name::<T>(),
            self.handles.len()
        );

        // Materialize every element into its slot before touching the
        // sequence, so a panicking iterator leaves the sequence unchanged.
        let new_handles = values
            .into_iter()
            .map(|value| self.pool.insert(value))
            .collect::<Vec<_>>();

        self.handles.splice(index..index, new_handles);
    }

    fn pop(&mut self) -> Option<T> {
        self.handles.pop().map(SlotBox::into_inner)
    }

    fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.handles.len(),
            "remove index {index} is out of bounds in a sequence of {} with length {}",
            type_name::<T>(),
            self.handles.len()
        );

        self.handles.remove(index).into_inner()
    }

    fn truncate(&mut self, len: usize) {
        self.handles.truncate(len);
    }

    fn clear(&mut self) {
        self.handles.clear();
    }

    fn iter(&self) -> Self::Iter<'_> {
        Iter::new(&self.handles)
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        IterMut::new(&mut self.handles)
    }

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.handles)
    }
}
