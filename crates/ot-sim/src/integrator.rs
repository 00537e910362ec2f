//! RK4 stepping and Richardson local-error estimation.

use crate::error::SimResult;
use crate::model::TransientModel;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance `x` from `t` by `dt`.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State>;

    /// Convergence order of the method.
    fn order(&self) -> i32;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Debug, Default)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> SimResult<M::State> {
        let k1 = model.rhs(t, x)?;

        let x2 = model.add(x, &model.scale(&k1, 0.5 * dt));
        let k2 = model.rhs(t + 0.5 * dt, &x2)?;

        let x3 = model.add(x, &model.scale(&k2, 0.5 * dt));
        let k3 = model.rhs(t + 0.5 * dt, &x3)?;

        let x4 = model.add(x, &model.scale(&k3, dt));
        let k4 = model.rhs(t + dt, &x4)?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(model.add(x, &model.scale(&k_sum, dt / 6.0)))
    }

    fn order(&self) -> i32 {
        4
    }
}

/// One error-estimated step.
#[derive(Clone, Debug)]
pub struct StepAttempt<S> {
    /// Result of two half steps.
    pub state: S,
    /// Estimated local error of `state`.
    pub error: f64,
}

/// Take one full step and two half steps from `(t, x)`.
///
/// The local error of the half-step result is `max|y_half − y_full| / (2^p − 1)`,
/// which is `/ 15` for RK4.
pub fn richardson_step<M, I>(
    integrator: &I,
    model: &mut M,
    t: f64,
    x: &M::State,
    dt: f64,
) -> SimResult<StepAttempt<M::State>>
where
    M: TransientModel,
    I: Integrator,
{
    let full = integrator.step(model, t, x, dt)?;
    let half = 0.5 * dt;
    let mid = integrator.step(model, t, x, half)?;
    let state = integrator.step(model, t + half, &mid, half)?;
    let denom = f64::from(2_i32.pow(integrator.order() as u32) - 1);
    let error = model.error_norm(&state, &full) / denom;
    Ok(StepAttempt { state, error })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Decay;

    impl TransientModel for Decay {
        type State = f64;

        fn initial_state(&self) -> f64 {
            1.0
        }

        fn rhs(&mut self, _t: f64, x: &f64) -> SimResult<f64> {
            Ok(-x)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }

        fn error_norm(&self, a: &f64, b: &f64) -> f64 {
            (a - b).abs()
        }

        fn is_finite(&self, x: &f64) -> bool {
            x.is_finite()
        }
    }

    #[test]
    fn rk4_matches_exponential() {
        let x = RK4.step(&mut Decay, 0.0, &1.0, 0.1).unwrap();
        assert!((x - (-0.1_f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn richardson_estimate_is_small_and_positive() {
        let attempt = richardson_step(&RK4, &mut Decay, 0.0, &1.0, 0.1).unwrap();
        let actual = (attempt.state - (-0.1_f64).exp()).abs();
        assert!(attempt.error > 0.0);
        assert!(attempt.error < 1e-8);
        assert!(actual < 1e-8);
    }

    #[test]
    fn error_shrinks_with_step() {
        let coarse = richardson_step(&RK4, &mut Decay, 0.0, &1.0, 0.4).unwrap();
        let fine = richardson_step(&RK4, &mut Decay, 0.0, &1.0, 0.2).unwrap();
        // Local error of a 4th-order method scales with dt^5.
        assert!(fine.error < coarse.error / 16.0);
    }
}
