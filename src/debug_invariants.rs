//! Invariant checking for derived mesh caches.
//!
//! Derived caches implement [`DebugInvariants`] so the lifecycle controller can
//! re-verify the side/wedge/corner lattice after each build in debug builds
//! (or with the `strict-invariants` / `check-invariants` features).

use crate::mesh_error::MeshSubcellError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Panic on the first broken invariant when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshSubcellError>;
}

/// Turn a failed structural check into a [`MeshSubcellError::TopologyInconsistency`].
///
/// The message closure only runs on failure.
#[inline]
pub fn ensure_invariant(
    holds: bool,
    message: impl FnOnce() -> String,
) -> Result<(), MeshSubcellError> {
    if holds {
        Ok(())
    } else {
        Err(MeshSubcellError::TopologyInconsistency(message()))
    }
}

/// Run a fallible check and panic with context when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
