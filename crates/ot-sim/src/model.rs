//! TransientModel trait for pluggable dynamic systems.

use crate::error::SimResult;

/// A system of ODEs `x_dot = f(t, x)` the integrators can advance.
///
/// The state type carries its own vector-space arithmetic through `add` and `scale`
/// so integrators stay generic over the representation.
pub trait TransientModel {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    /// State derivative at `(t, x)`.
    ///
    /// Takes `&mut self` so models can cache algebraic sub-solutions between calls.
    fn rhs(&mut self, t: f64, x: &Self::State) -> SimResult<Self::State>;

    /// `a + b`
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// `scale · a`
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;

    /// Largest componentwise difference of the error-controlled part of two states.
    fn error_norm(&self, a: &Self::State, b: &Self::State) -> f64;

    fn is_finite(&self, x: &Self::State) -> bool;
}
