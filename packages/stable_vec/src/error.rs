use thiserror::Error;

/// Errors that can occur when reserving capacity through the fallible APIs.
///
/// The infallible growth paths (`push()`, `insert()`, `reserve()`, ...) follow
/// the standard library convention of treating allocation failure as a fatal
/// condition. The `try_reserve()` family reports the failure instead, leaving
/// the container or pool exactly as it was before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReserveError {
    /// The requested capacity cannot be represented in a single backing region.
    #[error("capacity overflow: the requested capacity cannot be represented in a single region")]
    CapacityOverflow,

    /// The system allocator declined to provide a new backing region.
    #[error("allocation of a {bytes} byte backing region failed")]
    OutOfMemory {
        /// Size of the backing region that could not be allocated.
        bytes: usize,
    },

    /// Growing an internal sequence (the handle sequence or the region table) failed.
    #[error("failed to grow an internal sequence: {0}")]
    Sequence(#[from] std::collections::TryReserveError),
}
