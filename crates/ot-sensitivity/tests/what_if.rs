use approx::assert_relative_eq;
use ot_network::{NetworkBuilder, NetworkSnapshot, ParamRef, SimulationConfig};
use ot_sensitivity::*;

/// `T_a = 200 + Q/(G_ab + G_spare)` at steady state.
fn network(load: f64) -> NetworkSnapshot {
    NetworkBuilder::new()
        .diffusion("a", 250.0, 100.0)
        .boundary("sink", 200.0)
        .linear("ab", "a", "sink", 2.0)
        .linear("spare", "a", "sink", 0.0)
        .constant_load("q", "a", load)
        .build()
        .unwrap()
}

fn config() -> SimulationConfig {
    SimulationConfig::steady(50, 1e-10)
}

fn baseline() -> CurrentBaseline {
    let mut b = CurrentBaseline::new(network(20.0), config());
    b.compute().unwrap();
    b
}

fn options() -> SensitivityOptions {
    SensitivityOptions {
        max_threads: Some(2),
        ..SensitivityOptions::default()
    }
}

#[test]
fn derivatives_match_closed_form() {
    let b = baseline();
    assert_relative_eq!(b.result().unwrap().final_temperature("a").unwrap(), 210.0, epsilon = 1e-8);

    let load = ParamRef::heat_load("q", "value");
    let g = ParamRef::conductor("ab", "conductance");
    let model = b.analyze(&[load.clone(), g.clone()], &options()).unwrap();

    assert_eq!(model.node_ids, ["a", "sink"]);
    assert_relative_eq!(model.derivative(&load, "a").unwrap(), 0.5, epsilon = 1e-6);
    assert_eq!(model.derivative(&load, "sink"), Some(0.0));
    // Forward difference of 20/G at G = 2 with Δ = 0.02.
    let expected = (20.0 / 2.02 - 10.0) / 0.02;
    assert_relative_eq!(model.derivative(&g, "a").unwrap(), expected, epsilon = 1e-5);
    // d²T/dG² = 2Q/G³ = 5.
    assert_relative_eq!(model.entry(&g).unwrap().second_order[0], 5.0, max_relative = 1e-2);
}

#[test]
fn zero_delta_reconstruction_is_the_baseline() {
    let b = baseline();
    let load = ParamRef::heat_load("q", "value");
    let model = b.analyze(std::slice::from_ref(&load), &options()).unwrap();

    let w = b.what_if(&model, &[(load, 0.0)]).unwrap();
    assert_eq!(w.temperatures, b.result().unwrap().final_temperatures());
    assert_eq!(w.overall, Confidence::High);
}

#[test]
fn linear_reconstruction_matches_a_rerun() {
    let b = baseline();
    let load = ParamRef::heat_load("q", "value");
    let model = b.analyze(std::slice::from_ref(&load), &options()).unwrap();

    let w = b.what_if(&model, &[(load, 4.0)]).unwrap();
    let rerun = ot_engine::run(&network(24.0), &config()).unwrap();
    assert_relative_eq!(w.temperatures[0], rerun.final_temperature("a").unwrap(), epsilon = 1e-6);
    assert_relative_eq!(w.temperatures[0], 212.0, epsilon = 1e-6);
    // 4 W on 20 W is a 20 % change.
    assert_eq!(w.overall, Confidence::Medium);
}

#[test]
fn zero_conductance_uses_forward_difference() {
    let b = baseline();
    let spare = ParamRef::conductor("spare", "conductance");
    let model = b.analyze(std::slice::from_ref(&spare), &options()).unwrap();

    let entry = model.entry(&spare).unwrap();
    assert!(entry.is_ok(), "{:?}", entry.error);
    assert_eq!(entry.stencil, Stencil::Forward);
    // dT/dG = −Q/G² = −5 at G_total = 2.
    assert_relative_eq!(model.derivative(&spare, "a").unwrap(), -5.0, epsilon = 1e-3);
}

#[test]
fn black_radiator_uses_backward_difference() {
    // T = (Q / σεAF)^¼ against a 0 K sink.
    let snapshot = NetworkBuilder::new()
        .diffusion("plate", 250.0, 100.0)
        .boundary("space", 0.0)
        .radiation("r", "plate", "space", 1.0, 1.0, 1.0)
        .constant_load("q", "plate", 500.0)
        .build()
        .unwrap();
    let mut b = CurrentBaseline::new(snapshot, SimulationConfig::steady(100, 1e-10));
    b.compute().unwrap();
    let t0 = b.result().unwrap().final_temperature("plate").unwrap();

    let emissivity = ParamRef::conductor("r", "emissivity");
    let view_factor = ParamRef::conductor("r", "view_factor");
    let model = b
        .analyze(&[emissivity.clone(), view_factor.clone()], &options())
        .unwrap();
    assert_eq!(model.failed().count(), 0);

    let expected = (t0 - t0 * 0.99f64.powf(-0.25)) / 0.01;
    for param in [&emissivity, &view_factor] {
        let entry = model.entry(param).unwrap();
        assert_eq!(entry.stencil, Stencil::Backward);
        assert_eq!(entry.step, 0.01);
        assert_relative_eq!(model.derivative(param, "plate").unwrap(), expected, max_relative = 1e-6);
        // d²T/dε² = 5T₀/16 at ε = 1; one-sided stencil is first-order accurate.
        assert_relative_eq!(entry.second_order[0], 5.0 * t0 / 16.0, max_relative = 0.05);
    }

    let w = b.what_if(&model, &[(emissivity, -0.1)]).unwrap();
    assert!(w.temperatures[0] > t0);
}

#[test]
fn failed_parameter_is_isolated() {
    let b = baseline();
    let load = ParamRef::heat_load("q", "value");
    // A constant load has no schedule to scale.
    let scale = ParamRef::heat_load("q", "scale");
    let missing = ParamRef::node("nope", "temperature");
    let model = b
        .analyze(&[load.clone(), scale.clone(), missing.clone()], &options())
        .unwrap();

    assert!(model.entry(&load).unwrap().is_ok());
    assert_eq!(model.failed().count(), 2);
    assert!(model.entry(&scale).unwrap().error.is_some());
    assert!(model.entry(&missing).unwrap().error.is_some());

    assert!(b.what_if(&model, &[(load, 1.0)]).is_ok());
    assert!(matches!(
        b.what_if(&model, &[(scale, 1.0)]),
        Err(SensitivityError::FailedParameter { .. })
    ));
}

#[test]
fn stale_model_is_refused() {
    let mut b = baseline();
    let load = ParamRef::heat_load("q", "value");
    let model = b.analyze(std::slice::from_ref(&load), &options()).unwrap();

    b.replace_snapshot(network(30.0));
    assert!(b.result().is_none());
    assert!(matches!(
        b.analyze(std::slice::from_ref(&load), &options()),
        Err(SensitivityError::NoBaseline)
    ));
    assert!(matches!(
        b.what_if(&model, &[(load, 1.0)]),
        Err(SensitivityError::StaleBaseline { .. })
    ));
}
