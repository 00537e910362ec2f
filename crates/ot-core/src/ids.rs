use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable index used by the solver arrays.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Idx>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Idx(NonZeroU32);

impl Idx {
    /// Create an index from a 0-based position by storing position+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Create from a `usize` position (as produced by `enumerate`).
    pub fn from_usize(index: usize) -> Self {
        Self::from_index(index as u32)
    }

    /// Recover the 0-based position.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Idx({})", self.index())
    }
}

impl fmt::Display for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific aliases for clarity (no runtime cost).
pub type NodeIdx = Idx;
pub type ConductorIdx = Idx;
pub type LoadIdx = Idx;
