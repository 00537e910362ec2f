use approx::assert_relative_eq;
use ot_explore::*;
use ot_network::{NetworkBuilder, NetworkSnapshot, ParamRef, SimulationConfig};

fn network() -> NetworkSnapshot {
    NetworkBuilder::new()
        .diffusion("a", 250.0, 100.0)
        .boundary("sink", 200.0)
        .linear("g", "a", "sink", 2.0)
        .constant_load("q", "a", 20.0)
        .build()
        .unwrap()
}

fn config() -> SimulationConfig {
    SimulationConfig::steady(50, 1e-9)
}

fn ranges() -> Vec<ParamRange> {
    vec![
        ParamRange::new(ParamRef::heat_load("q", "value"), 10.0, 50.0),
        ParamRange::new(ParamRef::conductor("g", "conductance"), 1.0, 4.0),
    ]
}

fn options(method: SamplingMethod) -> ExploreOptions {
    ExploreOptions {
        samples: 12,
        method,
        seed: 11,
        max_threads: Some(3),
        constraints: vec![TemperatureLimit::max(230.0)],
    }
}

#[test]
fn feasibility_follows_closed_form() {
    let ex = explore(&network(), &config(), &ranges(), &options(SamplingMethod::Random)).unwrap();
    assert_eq!(ex.samples.len(), 12);
    assert_eq!(ex.node_ids, ["a", "sink"]);

    for (i, s) in ex.samples.iter().enumerate() {
        assert_eq!(s.index, i);
        assert!(s.error.is_none());
        let expected = 200.0 + s.values[0] / s.values[1];
        assert_relative_eq!(s.node_max_temperatures[0], expected, epsilon = 1e-6);
        assert_relative_eq!(s.max_temperature.unwrap(), expected, epsilon = 1e-6);
        assert_eq!(s.feasible, expected <= 230.0);
    }

    let feasible = ex.samples.iter().filter(|s| s.feasible).count();
    assert_eq!(ex.summary.feasible, feasible);
    assert_eq!(ex.summary.failed, 0);
    if let Some(best) = ex.best() {
        assert!(ex
            .samples
            .iter()
            .filter(|s| s.feasible)
            .all(|s| s.max_temperature >= best.max_temperature));
    }
}

#[test]
fn sample_alone_equals_batch_sample() {
    let opts = options(SamplingMethod::Random);
    let ex = explore(&network(), &config(), &ranges(), &opts).unwrap();

    let values = random_point(&ranges(), opts.seed, 7);
    let alone = evaluate_point(&network(), &config(), &ranges(), &opts.constraints, 7, values);
    assert_eq!(alone, ex.samples[7]);
}

#[test]
fn latin_hypercube_batch() {
    let ex = explore(
        &network(),
        &config(),
        &ranges(),
        &options(SamplingMethod::LatinHypercube),
    )
    .unwrap();
    assert_eq!(ex.summary.total, 12);
    for s in &ex.samples {
        assert!((10.0..=50.0).contains(&s.values[0]));
        assert!((1.0..=4.0).contains(&s.values[1]));
    }
}

#[test]
fn failed_runs_are_infeasible_and_do_not_abort() {
    // Negative conductances fail validation in every sample.
    let ranges = vec![ParamRange::new(ParamRef::conductor("g", "conductance"), -2.0, -1.0)];
    let ex = explore(&network(), &config(), &ranges, &options(SamplingMethod::Random)).unwrap();
    assert_eq!(ex.summary.failed, 12);
    assert_eq!(ex.summary.feasible_fraction, 0.0);
    assert!(ex.best().is_none());
    assert!(ex.samples.iter().all(|s| !s.feasible && s.error.is_some()));
}

#[test]
fn unknown_parameter_is_rejected_up_front() {
    let ranges = vec![ParamRange::new(ParamRef::node("ghost", "temperature"), 1.0, 2.0)];
    assert!(matches!(
        explore(&network(), &config(), &ranges, &ExploreOptions::default()),
        Err(ExploreError::Network(_))
    ));
}
