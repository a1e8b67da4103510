//! CLI round trips through real files.

use clap::Parser;
use rover_blockgen_core::cli::Args;
use rover_blockgen_core::run_cli;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const MOVE_JSON: &str = r#"{
  "blocks": {
    "languageVersion": 0,
    "blocks": [
      {
        "type": "rover_move",
        "fields": { "direction": "turn_right" },
        "inputs": {
          "speed": { "shadow": { "type": "math_number", "fields": { "NUM": 70 } } }
        },
        "next": { "block": { "type": "rover_stop" } }
      }
    ]
  }
}"#;

const SERVO_XML: &str = r#"<xml xmlns="https://developers.google.com/blockly/xml">
  <block type="rover_servo_write_angle">
    <field name="pin">2</field>
    <value name="angle">
      <shadow type="math_number"><field name="NUM">45</field></shadow>
    </value>
  </block>
</xml>"#;

fn args(argv: &[&str]) -> Args {
    Args::parse_from(std::iter::once("rover-blockgen").chain(argv.iter().copied()))
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

#[test]
fn writes_program_to_output_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.json");
    let output = dir.path().join("main.py");
    fs::write(&input, MOVE_JSON).unwrap();

    run_cli(&args(&[path_str(&input), path_str(&output)])).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "from rover import *\n\n\nrover.turn_right(70)\nrover.stop()\n"
    );
}

#[test]
fn reads_xml_and_honours_indent_and_catalog() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.xml");
    let output = dir.path().join("main.py");
    let catalog = dir.path().join("blocks.json");
    fs::write(&input, SERVO_XML).unwrap();

    run_cli(&args(&[
        path_str(&input),
        path_str(&output),
        "--indent",
        "4",
        "--emit-catalog",
        path_str(&catalog),
    ]))
    .unwrap();

    assert!(fs::read_to_string(&output)
        .unwrap()
        .ends_with("rover.servo_write(2, 45)\n"));
    let catalog: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&catalog).unwrap()).unwrap();
    assert!(catalog["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["type"] == "rover_servo_write_angle"));
}

#[test]
fn explicit_format_overrides_extension() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.txt");
    let output = dir.path().join("main.py");
    fs::write(&input, SERVO_XML).unwrap();

    run_cli(&args(&[
        path_str(&input),
        path_str(&output),
        "--format",
        "xml",
    ]))
    .unwrap();
    assert!(output.exists());
}

#[test]
fn missing_inputs_can_be_filled_with_marker() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.json");
    let output = dir.path().join("main.py");
    fs::write(
        &input,
        r#"{"blocks": {"blocks": [{"type": "rover_servo360_write"}]}}"#,
    )
    .unwrap();

    let err = run_cli(&args(&[path_str(&input), path_str(&output)])).unwrap_err();
    assert!(format!("{:#}", err).contains("speed"));

    run_cli(&args(&[
        path_str(&input),
        path_str(&output),
        "--allow-missing-inputs",
        "--missing-marker",
        "0",
    ]))
    .unwrap();
    assert!(fs::read_to_string(&output)
        .unwrap()
        .ends_with("rover.servo360_write(1, 0)\n"));
}

#[test]
fn default_marker_is_not_valid_python() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("program.json");
    let output = dir.path().join("main.py");
    fs::write(
        &input,
        r#"{"blocks": {"blocks": [{"type": "rover_servo360_write"}]}}"#,
    )
    .unwrap();

    run_cli(&args(&[
        path_str(&input),
        path_str(&output),
        "--allow-missing-inputs",
    ]))
    .unwrap();
    let code = fs::read_to_string(&output).unwrap();
    assert!(code.ends_with("rover.servo360_write(1, <missing>)\n"));
    assert!(!code.contains("None"));
}

#[test]
fn marker_without_placeholders_is_rejected() {
    let err = run_cli(&args(&["x.json", "--missing-marker", "0"])).unwrap_err();
    assert!(err.to_string().contains("--allow-missing-inputs"));
}

#[test]
fn nonexistent_input_is_reported() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("absent.json");
    let err = run_cli(&args(&[path_str(&input)])).unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn catalog_alone_needs_no_input() {
    let dir = tempdir().unwrap();
    let catalog = dir.path().join("blocks.json");
    run_cli(&args(&["--emit-catalog", path_str(&catalog)])).unwrap();
    assert!(fs::read_to_string(&catalog).unwrap().contains("\"rover_move\""));
}

#[test]
fn no_input_and_no_catalog_is_an_error() {
    assert!(run_cli(&args(&[])).is_err());
}
