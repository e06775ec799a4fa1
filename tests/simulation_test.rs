//! Integration tests for full simulation runs.
//!
//! These tests verify:
//! 1. A run from TOML + Gmsh files end to end
//! 2. Frame schedule, `.pvd` collection and diagnostics CSV
//! 3. Run folder numbering across repeated runs
//! 4. Source and sink effects on the oil budget

use std::fs;
use std::path::Path;

use oilspill::config::{ConfigError, load_configs};
use oilspill::mesh::{RawMesh, write_gmsh_mesh};
use oilspill::simulation::{Simulation, SimulationError, format_duration};
use tempfile::TempDir;

const TOL: f64 = 1e-12;

/// Write a 10 × 10 unit-square mesh and a config using it.
fn write_case(dir: &Path, name: &str, extra_geometry: &str, write_frequency: usize) {
    let raw = RawMesh::uniform_rectangle(0.0, 1.0, 0.0, 1.0, 10, 10);
    write_gmsh_mesh(&raw, &dir.join("square.msh")).unwrap();

    let output = dir.join("Output");
    let text = format!(
        r#"[settings]
tStart = 0.0
tEnd = 0.2
nSteps = 20

[geometry]
meshName = "square.msh"
borders = [[0.0, 0.45], [0.0, 0.2]]
{extra_geometry}

[IO]
writeFrequency = {write_frequency}
outputDir = {output:?}
"#,
        output = output.display().to_string()
    );
    fs::write(dir.join(format!("{name}.toml")), text).unwrap();
}

fn run(dir: &Path, name: &str) -> oilspill::SimulationResult {
    let configs = load_configs(&dir.join(format!("{name}.toml"))).unwrap();
    assert_eq!(configs.len(), 1);
    let config = configs.into_iter().next().unwrap();
    Simulation::from_config(config).unwrap().run().unwrap()
}

// ============================================================================
// End-to-end Runs
// ============================================================================

#[test]
fn test_run_writes_frames_and_diagnostics() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "bay", "", 5);
    let result = run(dir.path(), "bay");

    assert_eq!(result.name, "bay");
    assert_eq!(result.n_steps, 20);
    assert!((result.final_time - 0.2).abs() < TOL);
    assert_eq!(result.records.len(), 21);
    assert_eq!(result.triangle_ids.len(), 200);

    let folder = result.output_folder.clone().unwrap();
    assert_eq!(result.run, Some(0));
    assert_eq!(folder, dir.path().join("Output").join("bay").join("run0"));

    let names: Vec<String> = result
        .frames
        .iter()
        .map(|(_, p)| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "oil_0001.vtu",
            "oil_0005.vtu",
            "oil_0010.vtu",
            "oil_0015.vtu",
            "oil_0020.vtu"
        ]
    );
    for (_, frame) in &result.frames {
        let content = fs::read_to_string(frame).unwrap();
        assert!(content.contains("Name=\"oil\""));
        assert!(content.contains("Name=\"fishing\""));
    }
    assert!((result.frames[0].0 - 0.01).abs() < TOL);

    let pvd = fs::read_to_string(folder.join("oil.pvd")).unwrap();
    assert_eq!(pvd.matches("<DataSet").count(), 5);

    let csv = fs::read_to_string(folder.join("diagnostics.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("time,total_oil,fishing_oil"));
    assert_eq!(lines.count(), 21);
}

#[test]
fn test_wall_time_formats() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "timed", "", 0);
    let result = run(dir.path(), "timed");
    assert!(format_duration(result.wall_time).ends_with('s'));
    assert_eq!(format_duration(125.0), "2m5s");
}

#[test]
fn test_oil_stays_bounded_during_run() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "bounded", "", 0);
    let result = run(dir.path(), "bounded");

    assert!(result.output_folder.is_none());
    assert!(!dir.path().join("Output").exists());
    for record in &result.records {
        assert!(record.oil.iter().all(|&u| (0.0..=1.0).contains(&u)));
        assert!(record.diagnostics.fishing_oil <= record.diagnostics.total_oil + TOL);
    }
}

#[test]
fn test_oil_moves_with_flow() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "moving", "", 0);
    let result = run(dir.path(), "moving");

    let first = &result.records[0].oil;
    let last = &result.last().unwrap().oil;
    let changed = first
        .iter()
        .zip(last)
        .filter(|(a, b)| (*a - *b).abs() > 1e-9)
        .count();
    assert!(changed > 0);
}

#[test]
fn test_run_numbers_continue() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "repeat", "", 10);

    let first = run(dir.path(), "repeat");
    let second = run(dir.path(), "repeat");
    assert_eq!(first.run, Some(0));
    assert_eq!(second.run, Some(1));
    assert!(dir.path().join("Output/repeat/run1/oil.pvd").exists());
}

#[test]
fn test_foreign_output_folder_refused() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "taken", "", 10);
    let foreign = dir.path().join("Output").join("taken");
    fs::create_dir_all(&foreign).unwrap();
    fs::write(foreign.join("notes.txt"), "keep").unwrap();

    let config = load_configs(&dir.path().join("taken.toml"))
        .unwrap()
        .remove(0);
    let err = Simulation::from_config(config).unwrap().run().unwrap_err();
    assert!(matches!(err, SimulationError::Io(_)));
    assert!(foreign.join("notes.txt").exists());
}

// ============================================================================
// Sources and Sinks
// ============================================================================

#[test]
fn test_sink_at_spill_removes_oil() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "plain", "", 0);
    write_case(
        dir.path(),
        "sink",
        "sink = [{ position = [0.35, 0.45], radius = 0.15, strength = 200.0 }]",
        0,
    );

    let plain = run(dir.path(), "plain");
    let sink = run(dir.path(), "sink");
    let oil_plain = plain.last().unwrap().diagnostics.total_oil;
    let oil_sink = sink.last().unwrap().diagnostics.total_oil;
    assert!(oil_sink < oil_plain);
}

#[test]
fn test_source_adds_oil() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "plain", "", 0);
    write_case(
        dir.path(),
        "source",
        "source = [[0.5, 0.5]]",
        0,
    );

    let plain = run(dir.path(), "plain");
    let source = run(dir.path(), "source");
    let oil_plain = plain.last().unwrap().diagnostics.total_oil;
    let oil_source = source.last().unwrap().diagnostics.total_oil;
    assert!(oil_source > oil_plain);
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[test]
fn test_missing_mesh_reported() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "nomesh", "", 0);
    fs::remove_file(dir.path().join("square.msh")).unwrap();

    let config = load_configs(&dir.path().join("nomesh.toml"))
        .unwrap()
        .remove(0);
    assert!(matches!(
        Simulation::from_config(config),
        Err(SimulationError::MeshFile { .. })
    ));
}

#[test]
fn test_missing_key_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("broken.toml"),
        "[settings]\ntStart = 0.0\ntEnd = 1.0\n",
    )
    .unwrap();
    let err = load_configs(&dir.path().join("broken.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("settings.nSteps")));
}

#[test]
fn test_find_all_runs_every_config() {
    let dir = TempDir::new().unwrap();
    write_case(dir.path(), "a", "", 0);
    write_case(dir.path(), "b", "", 0);

    let configs = load_configs(dir.path()).unwrap();
    let names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}
