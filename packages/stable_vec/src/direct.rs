use std::any::type_name;
use std::{slice, vec};

use crate::sealed::Sealed;
use crate::{ReserveError, Storage};

/// Marker for element types that do not benefit from pooled slots.
///
/// For a primitive or a pointer, copying is as cheap as copying an address
/// and nobody holds long-lived references into the container, so the
/// indirection of the slotted strategy would be pure overhead. Types carrying
/// this marker may be stored with the [`Direct`] strategy instead, which is a
/// plain dynamic array without any address-stability guarantee.
///
/// The marker is implemented for the primitive numeric types, `bool`, `char`
/// and raw pointers. It is open for opting in other types that are equally
/// trivial to copy:
///
/// ```rust
/// use stable_vec::{DirectElement, DirectVec};
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// struct Millimeters(u32);
///
/// impl DirectElement for Millimeters {}
///
/// let mut lengths: DirectVec<Millimeters> = DirectVec::new();
/// lengths.push(Millimeters(250));
/// ```
pub trait DirectElement: Copy {}

macro_rules! impl_direct_element {
    ($($name:ty),* $(,)?) => {
        $(
            impl DirectElement for $name {}
        )*
    };
}

impl_direct_element!(
    bool, char, f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

impl<T: ?Sized> DirectElement for *const T {}
impl<T: ?Sized> DirectElement for *mut T {}

/// The pass-through storage strategy: elements live directly in a dynamic
/// array.
///
/// Only available for [`DirectElement`] types. Offers the same surface
/// semantics as the slotted strategy but no address stability - growing the
/// sequence relocates the elements, exactly like a plain `Vec<T>`.
#[derive(Debug)]
pub struct Direct<T> {
    items: Vec<T>,
}

impl<T> Sealed for Direct<T> {}

impl<T: DirectElement> Storage<T> for Direct<T> {
    type Iter<'a>
        = slice::Iter<'a, T>
    where
        Self: 'a,
        T: 'a;

    type IterMut<'a>
        = slice::IterMut<'a, T>
    where
        Self: 'a,
        T: 'a;

    type IntoIter = vec::IntoIter<T>;

    fn new() -> Self {
        Self { items: Vec::new() }
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    fn len(&self) -> usize {
        self.items.len()
    }

    fn capacity(&self) -> usize {
        self.items.capacity()
    }

    #[allow(
        clippy::integer_division,
        reason = "truncation toward zero is the correct rounding for a count bound"
    )]
    fn max_len() -> usize {
        if size_of::<T>() == 0 {
            usize::MAX
        } else {
            usize::try_from(isize::MAX).expect("isize::MAX always fits in usize") / size_of::<T>()
        }
    }

    fn reserve(&mut self, additional: usize) {
        self.items.reserve(additional);
    }

    fn try_reserve(&mut self, additional: usize) -> Result<(), ReserveError> {
        self.items
            .try_reserve(additional)
            .map_err(ReserveError::from)
    }

    fn shrink_to_fit(&mut self) {
        self.items.shrink_to_fit();
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    fn push(&mut self, value: T) {
        self.items.push(value);
    }

    fn insert(&mut self, index: usize, value: T) {
        assert!(
            index <= self.items.len(),
            "insert index {index} is out of bounds in a sequence of {} with length {}",
            type_name::<T>(),
            self.items.len()
        );

        self.items.insert(index, value);
    }

    fn insert_many<I>(&mut self, index: usize, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        assert!(
            index <= self.items.len(),
            "insert index {index} is out of bounds in a sequence of {} with length {}",
            type_name::<T>(),
            self.items.len()
        );

        self.items.splice(index..index, values);
    }

    fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.items.len(),
            "remove index {index} is out of bounds in a sequence of {} with length {}",
            type_name::<T>(),
            self.items.len()
        );

        self.items.remove(index)
    }

    fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.items.iter()
    }

    fn iter_mut(&mut self) -> Self::IterMut<'_> {
        self.items.iter_mut()
    }

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_a_plain_vec() {
        let mut storage = Direct::<u32>::new();

        storage.push(1);
        storage.push(2);
        storage.push(3);

        assert_eq!(storage.remove(1), 2);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get(0), Some(&1));
        assert_eq!(storage.get(1), Some(&3));
        assert_eq!(storage.get(2), None);
    }

    #[test]
    fn pointers_are_direct_elements() {
        let value = 42_u32;

        let mut storage = Direct::<*const u32>::new();
        storage.push(&raw const value);

        // SAFETY: The pointee is alive on this stack frame.
        let read_back = unsafe { **storage.get(0).unwrap() };
        assert_eq!(read_back, 42);
    }

    #[test]
    fn insert_many_splices_in_order() {
        let mut storage = Direct::<u32>::new();

        storage.push(1);
        storage.push(4);

        storage.insert_many(1, [2, 3]);

        let collected: Vec<u32> = storage.iter().copied().collect();
        assert_eq!(collected, [1, 2, 3, 4]);
    }
}
