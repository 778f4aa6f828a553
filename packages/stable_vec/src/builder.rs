use std::marker::PhantomData;

use crate::SlotPool;
use crate::raw_pool::RawSlotPool;

/// Builder for creating an instance of [`SlotPool`].
///
/// You only need to use this builder if you want to customize the pool
/// configuration. The default configuration used by [`SlotPool::new()`][1] is
/// sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use stable_vec::SlotPool;
///
/// let pool = SlotPool::<u32>::builder().initial_capacity(64).build();
///
/// assert!(pool.capacity() >= 64);
/// ```
///
/// [1]: SlotPool::new
#[must_use]
pub struct SlotPoolBuilder<T> {
    initial_capacity: usize,

    _items: PhantomData<T>,
}

impl<T> std::fmt::Debug for SlotPoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotPoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("initial_capacity", &self.initial_capacity)
            .finish()
    }
}

impl<T> SlotPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            initial_capacity: 0,
            _items: PhantomData,
        }
    }

    /// Sets the number of values the pool can hold before it has to allocate
    /// another backing region. The first region is sized to cover this count.
    ///
    /// Zero (the default) means the first region is allocated lazily with the
    /// default region size.
    ///
    /// # Examples
    ///
    /// ```
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u32>::builder().initial_capacity(1000).build();
    ///
    /// assert!(pool.capacity() >= 1000);
    /// ```
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use stable_vec::SlotPool;
    ///
    /// let pool = SlotPool::<u32>::builder().build();
    /// ```
    #[must_use]
    pub fn build(self) -> SlotPool<T> {
        let pool = SlotPool::from_raw(RawSlotPool::new());

        if self.initial_capacity > 0 {
            pool.reserve(self.initial_capacity);
        }

        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_lazy() {
        let pool = SlotPoolBuilder::<u32>::new().build();

        assert_eq!(pool.capacity(), 0);
    }

    #[test]
    fn initial_capacity_is_honored() {
        let pool = SlotPoolBuilder::<u32>::new().initial_capacity(77).build();

        assert!(pool.capacity() >= 77);
    }

    #[test]
    fn debug_output_names_item_type() {
        let builder = SlotPool::<u32>::builder();

        let output = format!("{builder:?}");
        assert!(output.contains("u32"));
    }
}
