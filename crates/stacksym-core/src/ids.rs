//! Identity of code-generation sessions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one code-generation context.
///
/// Every symbol and label records the context that created it; combining
/// pieces from two contexts is rejected. Ids are unique for the lifetime of
/// the process and are never reused.
///
/// # Example
///
/// ```
/// use stacksym_core::ContextId;
///
/// let a = ContextId::fresh();
/// let b = ContextId::fresh();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate a new, never before seen id.
    #[inline]
    pub fn fresh() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx_{}", self.0)
    }
}
