//! Newtype wrappers for domain values that would otherwise be bare integers.

use std::fmt;

/// Presentation order index assigned by the presented-scene registry.
///
/// Strictly increasing across the process lifetime; never reused, even after
/// the scene it was assigned to is dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderIndex(pub u64);

impl fmt::Display for OrderIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
