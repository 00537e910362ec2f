use approx::assert_relative_eq;
use ot_core::{Deadline, SIGMA};
use ot_network::{NetworkBuilder, SimulationConfig};
use ot_solver::{SolverError, ThermalProblem, solve_steady};

fn solve(builder: NetworkBuilder, config: SimulationConfig) -> Result<ot_solver::SteadySolution, SolverError> {
    let snap = builder.build().unwrap();
    let problem = ThermalProblem::compile(&snap).unwrap();
    solve_steady(&problem, &config, &Deadline::unlimited())
}

#[test]
fn two_node_linear_benchmark() {
    let sol = solve(
        NetworkBuilder::new()
            .diffusion("n1", 300.0, 100.0)
            .boundary("n2", 200.0)
            .linear("g", "n1", "n2", 10.0)
            .constant_load("q", "n1", 100.0),
        SimulationConfig::steady(50, 1e-6),
    )
    .unwrap();

    assert_relative_eq!(sol.temperatures[0], 210.0, max_relative = 1e-3);
    assert_eq!(sol.temperatures[1], 200.0);
    assert_relative_eq!(sol.conductor_flows[0], 100.0, max_relative = 1e-6);
    assert_eq!(sol.node_loads, vec![100.0, 0.0]);
    assert!(sol.iterations >= 1);
    assert!(sol.max_delta < 1e-6);
}

#[test]
fn radiating_plate_equilibrium() {
    let sol = solve(
        NetworkBuilder::new()
            .diffusion("plate", 300.0, 500.0)
            .boundary("space", 0.0)
            .radiation("r", "plate", "space", 1.0, 1.0, 1.0)
            .constant_load("q", "plate", 500.0),
        SimulationConfig::steady(100, 1e-8),
    )
    .unwrap();

    let expected = (500.0 / SIGMA).powf(0.25);
    assert_relative_eq!(sol.temperatures[0], expected, max_relative = 1e-9);
    assert_relative_eq!(sol.conductor_flows[0], 500.0, max_relative = 1e-6);
}

#[test]
fn heat_pipe_feeds_arithmetic_node() {
    // Hot end 350 K: G = 1 + 3·(100/150) = 3 W/K. 3·(350 − T) = 2·(T − 250).
    let sol = solve(
        NetworkBuilder::new()
            .boundary("evap", 350.0)
            .arithmetic("mid", 300.0)
            .boundary("cond", 250.0)
            .heat_pipe("hp", "evap", "mid", vec![(250.0, 1.0), (400.0, 4.0)])
            .linear("g", "mid", "cond", 2.0),
        SimulationConfig::steady(50, 1e-9),
    )
    .unwrap();

    assert_relative_eq!(sol.temperatures[1], 310.0, max_relative = 1e-9);
    assert_relative_eq!(sol.conductor_flows[0], sol.conductor_flows[1], max_relative = 1e-9);
}

#[test]
fn iteration_budget_exhaustion_is_convergence_error() {
    let err = solve(
        NetworkBuilder::new()
            .diffusion("n1", 300.0, 100.0)
            .boundary("n2", 200.0)
            .linear("g", "n1", "n2", 10.0)
            .constant_load("q", "n1", 100.0),
        SimulationConfig::steady(1, 1e-6),
    )
    .unwrap_err();

    match err {
        SolverError::Convergence {
            iterations,
            tolerance,
            ..
        } => {
            assert_eq!(iterations, 1);
            assert_eq!(tolerance, 1e-6);
        }
        other => panic!("expected convergence error, got {other}"),
    }
}

#[test]
fn floating_network_is_singular() {
    // No boundary: temperatures are defined only up to a constant.
    let err = solve(
        NetworkBuilder::new()
            .diffusion("a", 300.0, 10.0)
            .diffusion("b", 280.0, 10.0)
            .linear("g", "a", "b", 1.0),
        SimulationConfig::steady(20, 1e-6),
    )
    .unwrap_err();
    assert!(matches!(err, SolverError::NumericalInstability { .. }));
}

#[test]
fn expired_deadline_aborts() {
    let snap = NetworkBuilder::new()
        .diffusion("n1", 300.0, 100.0)
        .boundary("n2", 200.0)
        .linear("g", "n1", "n2", 10.0)
        .build()
        .unwrap();
    let problem = ThermalProblem::compile(&snap).unwrap();
    let deadline = Deadline::after_secs(1e-9);
    std::thread::sleep(std::time::Duration::from_millis(5));
    let err = solve_steady(&problem, &SimulationConfig::steady(20, 1e-6), &deadline).unwrap_err();
    assert!(matches!(err, SolverError::Core(ot_core::OtError::WallClock { .. })));
}
