use ot_network::*;

const CASE_YAML: &str = r#"
name: Radiator panel
network:
  nodes:
    - id: panel
      name: Radiator panel
      kind: diffusion
      temperature: 290.0
      capacitance: 900.0
    - id: bracket
      kind: arithmetic
      temperature: 280.0
    - id: space
      kind: boundary
      boundary_temp: 3.0
  conductors:
    - id: g_pb
      kind: linear
      from: panel
      to: bracket
      conductance: 2.5
    - id: r_bs
      kind: radiation
      from: bracket
      to: space
      area: 0.5
      view_factor: 1.0
      emissivity: 0.85
  heat_loads:
    - id: electronics
      node_id: panel
      kind: time_varying
      time_values: [[0.0, 40.0], [600.0, 80.0]]
simulation:
  kind: transient
  time_start: 0.0
  time_end: 1200.0
  time_step: 5.0
  min_step: 0.001
  max_step: 60.0
  output_interval: 60.0
  max_iterations: 500
  tolerance: 0.01
"#;

#[test]
fn yaml_case_loads_and_round_trips() {
    let dir = std::env::temp_dir().join(format!("ot_network_case_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let yaml_path = dir.join("panel.yaml");
    std::fs::write(&yaml_path, CASE_YAML).unwrap();
    let case = load_case(&yaml_path).unwrap();

    assert_eq!(case.name, "Radiator panel");
    assert_eq!(case.network.nodes.len(), 3);
    assert_eq!(case.simulation.wall_clock_limit_s, 300.0);
    assert_eq!(
        case.network.node("space").unwrap().boundary_temp,
        Some(BoundaryTemp::Fixed(3.0))
    );

    let json_path = dir.join("panel.json");
    save_case(&json_path, &case).unwrap();
    let reloaded = load_case(&json_path).unwrap();
    assert_eq!(reloaded, case);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_case_is_rejected_before_use() {
    let broken = CASE_YAML.replace("to: space", "to: nowhere");
    let dir = std::env::temp_dir().join(format!("ot_network_broken_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.yaml");
    std::fs::write(&path, broken).unwrap();

    let err = load_case(&path).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Validation(ValidationError::MissingReference { .. })
    ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn perturbed_copy_leaves_baseline_alone() {
    let case: CaseFile = serde_yaml::from_str(CASE_YAML).unwrap();
    let baseline = case.network.clone();
    let emissivity = ParamRef::conductor("r_bs", "emissivity");

    let perturbed = emissivity.with_delta(&baseline, 0.05).unwrap();
    validate_snapshot(&perturbed).unwrap();

    assert_eq!(baseline, case.network);
    assert!((emissivity.get(&perturbed).unwrap() - 0.90).abs() < 1e-12);
}
