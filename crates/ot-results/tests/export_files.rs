use ot_network::SimulationKind;
use ot_results::{NodeSeries, ResultSnapshot, RunStatus, summarize, write_summary_csv};

#[test]
fn summary_csv_written_to_disk() {
    let mut result = ResultSnapshot::pending("abc".into(), SimulationKind::Transient);
    result.status = RunStatus::Completed;
    for (id, temps) in [("a", vec![300.0, 310.0]), ("b", vec![250.0, 240.0])] {
        result.nodes.push(NodeSeries {
            id: id.into(),
            name: id.to_uppercase(),
            times: vec![0.0, 10.0],
            temperatures: temps,
        });
    }

    let path = std::env::temp_dir().join("ot_results_summary_test.csv");
    let file = std::fs::File::create(&path).unwrap();
    write_summary_csv(&summarize(&result).unwrap(), file).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("\nB,240.0,250.0,250.0,240.0,-10.0"));

    // The result snapshot itself round-trips through JSON unchanged.
    let json = serde_json::to_string(&result).unwrap();
    let back: ResultSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    let _ = std::fs::remove_file(path);
}
