use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn cli() -> Command {
    Command::cargo_bin("servo-track").expect("binary built")
}

#[test]
fn decode_prints_signed_error() {
    cli()
        .args(["decode", "66 66 CE FF F6 F6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("error=-50"));
}

#[test]
fn decode_resyncs_over_noise() {
    cli()
        .args(["decode", "00 6666320 0F6F6 6666 9CFF F6F6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("error=50"))
        .stdout(predicate::str::contains("error=-100"));
}

#[test]
fn decode_rejects_bad_trailer() {
    cli()
        .args(["decode", "66 66 CE FF 00 00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Trailer"));
}

#[test]
fn config_applies_preset() {
    let out = cli()
        .args(["config", "--preset", "high-speed"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["filter"]["alpha"], 0.5);
    assert_eq!(json["selection"]["min_area"], 1000);
    assert_eq!(json["detection"]["canny_thresh1"], 70);
    assert_eq!(json["display_mode"], "LCD");
}

#[test]
fn config_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "filter": { "alpha": 2.0 } }"#).unwrap();

    cli()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidAlpha"));
}

#[test]
fn replay_writes_telemetry_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let detections = dir.path().join("detections.json");
    let serial = dir.path().join("uart.bin");
    let report = dir.path().join("report.json");
    fs::write(
        &detections,
        r#"{ "frames": [[10, 10, 50, 50], null, [], [200, 100, 60, 60, 0, 0, 5, 5]] }"#,
    )
    .unwrap();

    cli()
        .arg("replay")
        .arg("--detections")
        .arg(&detections)
        .arg("--serial")
        .arg(&serial)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("frames=4"))
        .stdout(predicate::str::contains("sent=2"))
        .stdout(predicate::str::contains("recovered=1"));

    // 35 - 160 clamps to -100; 230 - 160 = 70
    assert_eq!(
        fs::read(&serial).unwrap(),
        vec![0x66, 0x66, 0x9C, 0xFF, 0xF6, 0xF6, 0x66, 0x66, 0x46, 0x00, 0xF6, 0xF6]
    );

    let json: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["reason"]["reason"], "source_exhausted");
    assert_eq!(json["frames"].as_array().unwrap().len(), 3);
    assert_eq!(json["frames"][2]["telemetry"]["status"], "sent");
    assert_eq!(json["frames"][2]["telemetry"]["error"], 70);
}

#[test]
fn replay_requires_detections() {
    cli()
        .arg("replay")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--detections"));
}
