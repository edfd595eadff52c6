use std::{io::Write, process::Command};

fn padring() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_padring"));
    let _ = command.env("RUST_LOG", "off");
    command
}

#[test]
fn prints_report_as_json() {
    let output = padring()
        .args([
            "--domain-size",
            "100",
            "--parties",
            "2",
            "--min-gap",
            "5",
            "--active",
            "2",
            "--seed",
            "1",
        ])
        .output()
        .expect("padring runs");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is json");
    assert_eq!(report["waste"], 10);
    assert_eq!(report["burned"], 90);
    assert_eq!(report["termination"]["kind"], "saturated");
    assert_eq!(report["active"], serde_json::json!([1, 2]));
}

#[test]
fn reads_scenario_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "domain_size = 100\nparties = 2\nmin_gap = 5\nactive_parties = 0\ntopology = \"ring\""
    )
    .expect("write config");

    let output = padring()
        .arg("--config")
        .arg(file.path())
        .output()
        .expect("padring runs");
    assert!(output.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is json");
    assert_eq!(report["waste"], 100);
    assert_eq!(report["termination"]["kind"], "non-convergence");
    assert_eq!(report["termination"]["cap"], 1000);
}

#[test]
fn invalid_scenario_exits_with_error() {
    let output = padring()
        .args(["--domain-size", "10", "--parties", "4", "--min-gap", "5"])
        .output()
        .expect("padring runs");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("scenario aborted"));
    assert!(stderr.contains("cannot fit 4 parties"));
}
